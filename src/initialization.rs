use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use diesel::prelude::*;
use diesel::SqliteConnection;
use serde::Deserialize;
use serde_json::from_reader;
use uuid::Uuid;

use crate::connection::Store;
use crate::error::{StoreError, StoreResult};
use crate::models::{Course, Enrollment, Level, Role, User};
use crate::queries::count_users_in_db;
use crate::schema::{courses, enrollments, users};

const DEFAULT_SEED: &str = include_str!("data/Seed.json");

#[derive(Deserialize, Debug)]
struct SeedJson {
    users: Vec<SeedUser>,
    courses: Vec<SeedCourse>,
    #[serde(default)]
    enrollments: Vec<SeedEnrollment>
}

// `key` only links enrollments to users and courses inside the seed file.
#[derive(Deserialize, Debug)]
struct SeedUser {
    key: String,
    name: String,
    email: String
}

#[derive(Deserialize, Debug)]
struct SeedCourse {
    key: String,
    title: String,
    description: String,
    level: Level
}

#[derive(Deserialize, Debug)]
struct SeedEnrollment {
    user: String,
    course: String,
    role: Role
}

/// What a provisioning run changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionReport {
    pub migrations_applied: usize,
    pub seeded: bool
}

/// Brings the database schema up to date and loads the sample data when the
/// store has no users yet. Safe to run repeatedly.
pub fn provision(store: &Store, seed_path: Option<&Path>) -> StoreResult<ProvisionReport> {
    let migrations_applied = store.run_pending_migrations()?;
    let seed = load_seed(seed_path)?;
    let seeded = store.with_connection(|conn| seed_if_empty(conn, &seed))?;

    Ok(ProvisionReport { migrations_applied, seeded })
}

fn load_seed(seed_path: Option<&Path>) -> StoreResult<SeedJson> {
    match seed_path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| StoreError::Seed(format!("cannot open {}: {}", path.display(), e)))?;
            from_reader(BufReader::new(file)).map_err(|e| StoreError::Seed(e.to_string()))
        }
        None => serde_json::from_str(DEFAULT_SEED).map_err(|e| StoreError::Seed(e.to_string())),
    }
}

fn seed_if_empty(conn: &mut SqliteConnection, seed: &SeedJson) -> StoreResult<bool> {
    conn.transaction::<_, StoreError, _>(|conn| {
        let count = count_users_in_db(conn)?;
        if count != 0 {
            tracing::info!(users = count, "Database already contains data, skipping seed");
            return Ok(false);
        }

        let mut user_ids = HashMap::new();
        for seed_user in &seed.users {
            let user = User {
                id: Uuid::new_v4().to_string(),
                name: seed_user.name.clone(),
                email: seed_user.email.clone(),
            };
            diesel::insert_into(users::table).values(&user).execute(conn)?;
            user_ids.insert(seed_user.key.as_str(), user.id);
        }

        let mut course_ids = HashMap::new();
        for seed_course in &seed.courses {
            let course = Course {
                id: Uuid::new_v4().to_string(),
                title: seed_course.title.clone(),
                description: seed_course.description.clone(),
                level: seed_course.level.as_str().to_string(),
            };
            diesel::insert_into(courses::table).values(&course).execute(conn)?;
            course_ids.insert(seed_course.key.as_str(), course.id);
        }

        for seed_enrollment in &seed.enrollments {
            let user_id = user_ids.get(seed_enrollment.user.as_str()).ok_or_else(|| {
                StoreError::Seed(format!("enrollment references unknown user `{}`", seed_enrollment.user))
            })?;
            let course_id = course_ids.get(seed_enrollment.course.as_str()).ok_or_else(|| {
                StoreError::Seed(format!("enrollment references unknown course `{}`", seed_enrollment.course))
            })?;

            let enrollment = Enrollment {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.clone(),
                course_id: course_id.clone(),
                role: seed_enrollment.role.as_str().to_string(),
            };
            diesel::insert_into(enrollments::table).values(&enrollment).execute(conn)?;
        }

        tracing::info!(
            users = seed.users.len(),
            courses = seed.courses.len(),
            enrollments = seed.enrollments.len(),
            "Database initialized with sample data"
        );
        Ok(true)
    })
}
