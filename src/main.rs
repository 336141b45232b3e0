use safechat_server::{
    config::Config,
    server::{Server, ServerConfig},
    setup, telemetry,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    // The JWT secret stays redacted in this line thanks to secrecy.
    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    let state = setup::setup(&config)?;

    let server_config = ServerConfig {
        host: &config.server.host,
        port: config.server.port,
    };
    let server = Server::new(state, server_config).await?;
    server.run().await
}
