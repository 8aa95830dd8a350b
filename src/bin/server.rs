use screening_bot::configuration::get_configuration;
use screening_bot::db;
use screening_bot::server::app::run_server;
use screening_bot::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let settings = get_configuration()?;
    let pool = db::establish_connection(&settings.database.path).await?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    run_server(pool, &settings).await
}
