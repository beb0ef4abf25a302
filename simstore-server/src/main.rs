use clap::Parser;
use simstore_server::{ServerSettings, run_server};
use simstore_telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = ServerSettings::parse();
    init_telemetry(&settings.telemetry_config())?;

    let state = settings.build_state()?;
    run_server(settings.server_config(), state).await
}
