use std::sync::Arc;

use edtechbackend::config::Config;
use edtechbackend::connection::Store;
use edtechbackend::graphql::{build_schema, CourseSchema};
use edtechbackend::initialization::provision;
use edtechbackend::routes::AppState;

/// A provisioned database in a temp directory, removed on drop.
pub struct TestDb {
    pub store: Store,
    pub dir: tempfile::TempDir,
}

pub fn provisioned_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.db");
    let store = Store::establish(path.to_str().unwrap(), 4).unwrap();
    provision(&store, None).unwrap();
    TestDb { store, dir }
}

#[allow(dead_code)]
pub fn schema(db: &TestDb) -> CourseSchema {
    build_schema(db.store.clone())
}

#[allow(dead_code)]
pub fn app_state(db: &TestDb, pairs: &[(&str, &str)]) -> AppState {
    let vars: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    config.database_url = db.dir.path().join("api.db").display().to_string();
    AppState { schema: schema(db), config: Arc::new(config) }
}
