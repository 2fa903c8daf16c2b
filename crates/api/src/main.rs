use keyward_api::app::{self, dto::LinkBuilder};
use keyward_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    keyward_observability::init();

    let config = ApiConfig::from_env();
    if config.seed_users.is_empty() {
        tracing::warn!("KEYWARD_SEED_USERS not set; every create will be rejected");
    }

    let services = app::services::in_memory(
        config.seed_users.clone(),
        LinkBuilder::new(config.path_prefix.clone()),
    );
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, prefix = %config.path_prefix, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
