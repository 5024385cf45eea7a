//! `image-layers` binary: merge images or split one into layers.

use tracing_subscriber::EnvFilter;

use image_layers_lib::args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let invocation = match args::parse_args(std::env::args().skip(1)) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("{}", args::usage());
            return Err(e);
        }
    };

    tracing::info!(command = ?invocation.command, "Starting image-layers");
    image_layers_lib::run(invocation).await
}
