use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oddplate_cloud::S3ArtifactStore;
use oddplate_pipeline::PipelineConfig;
use oddplate_worker::{sweep_once, SweepConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oddplate_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let bucket = std::env::var("ODDPLATE_S3_BUCKET")?;

    let pool = oddplate_db::create_pool(&database_url).await?;
    let pipeline_config = PipelineConfig::from_env();
    let artifacts = S3ArtifactStore::from_env(bucket, pipeline_config.url_ttl()).await;
    let config = SweepConfig::from_env();

    tracing::info!(
        interval_secs = config.interval.as_secs(),
        batch_size = config.batch_size,
        "Expiry sweep worker starting"
    );

    let mut ticker = tokio::time::interval(config.interval);
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_once(&pool, &artifacts, config.batch_size).await {
            tracing::error!(error = %e, "Sweep pass failed");
        }
    }
}
