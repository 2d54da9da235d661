use lobbyforge::{Config, LobbyforgeError, build_server, logging};

#[tokio::main]
async fn main() -> Result<(), LobbyforgeError> {
    let config = Config::load()?;
    logging::init(&config)?;

    let server = build_server(&config).await?;
    server.run_until(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(error) => tracing::error!(%error, "failed to listen for ctrl-c; shutting down"),
    }
}
