use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    project_management_server::config::load_dotenv();
    let config = project_management_server::config::Config::from_env()?;
    if let Err(err) = project_management_server::web::start_web_server(config).await {
        tracing::error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
