mod application;
mod domain;
mod infrastructure;
mod presentation;

use tracing::info;

use crate::infrastructure::{AppConfig, AppContainer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let container = AppContainer::new(&config).await?;

    info!("docrag starting on port {}", config.port);
    container.http_server(&config).run().await
}
