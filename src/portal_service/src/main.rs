use color_eyre::eyre::Result;
use portal_service::{PortalService, PortalSettings, build_state, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let settings = PortalSettings::load()?;
    let state = build_state(&settings).await?;

    let listener = tokio::net::TcpListener::bind(&settings.server.address).await?;
    tracing::info!("Starting portal service...");

    PortalService::new(state)
        .run_standalone(listener, &settings.server.allowed_origins)
        .await?;

    Ok(())
}
