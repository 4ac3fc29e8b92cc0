//! Start a standalone Oxia container, write a key and read it back.
//!
//! Run with: `cargo run -p oxia-testcontainers --example standalone`

use oxia_testcontainers::{StandaloneBuilder, StandaloneOption};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("oxia_testcontainers=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut builder = StandaloneBuilder::new();
    for option in StandaloneOption::from_env() {
        builder = builder.option(option);
    }

    let container = builder.log_level("debug").start().await?;
    tracing::info!(address = %container.public_address().await?, "Oxia is ready");

    let put = container.client(["put", "test_key", "test_payload"]).await?;
    tracing::info!(exit_code = put.exit_code, output = %put.output_lossy(), "put result");

    let get = container.client(["get", "test_key"]).await?;
    tracing::info!(exit_code = get.exit_code, output = %get.output_lossy(), "get result");

    container.stop().await?;
    Ok(())
}
