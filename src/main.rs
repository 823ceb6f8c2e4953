use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use edtechbackend::config::Config;
use edtechbackend::connection::Store;
use edtechbackend::graphql::build_schema;
use edtechbackend::initialization::provision;
use edtechbackend::routes::{create_app, AppState};
use edtechbackend::init_tracing;

#[derive(Parser)]
#[command(name = "edtechbackend", about = "Course enrollment GraphQL API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the GraphQL API (default)
    Serve,
    /// Apply migrations and load sample data into an empty database
    Provision,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    let store = Store::establish(&config.database_url, config.pool_size)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Provision => {
            let report = provision(&store, config.seed_json_path.as_deref())?;
            tracing::info!(
                migrations_applied = report.migrations_applied,
                seeded = report.seeded,
                database_url = %config.database_url,
                "Provisioning complete"
            );
            Ok(())
        }
        Command::Serve => serve(config, store).await,
    }
}

async fn serve(config: Config, store: Store) -> anyhow::Result<()> {
    if store.has_pending_migrations()? {
        anyhow::bail!(
            "database at `{}` is not provisioned; run `edtechbackend provision` first",
            config.database_url
        );
    }

    let addr: SocketAddr = config.server_addr().parse()?;
    let config = Arc::new(config);
    let state = AppState { schema: build_schema(store), config: config.clone() };
    let app = create_app(state)?;

    tracing::info!(%addr, environment = %config.environment, "Starting server");
    tracing::info!(path = %config.graphql_path, "GraphQL endpoint");
    if config.enable_playground {
        tracing::info!(path = %config.graphql_path, "GraphQL Playground enabled");
    }

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
