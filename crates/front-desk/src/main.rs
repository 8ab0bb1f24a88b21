use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use front_desk::{Args, FrontDesk};
use infrastructure::FrontDeskConfig;

async fn run() -> Result<()> {
    dotenv().ok();

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,front_desk=debug,application=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    info!("🎠 Front desk starting...");
    info!("📂 Config directory: {}", args.config_dir);

    let mut config = FrontDeskConfig::load(&args.config_dir)?;
    args.apply_overrides(&mut config);

    let desk = FrontDesk::connect(config).await?;
    desk.run(args.command).await?;

    info!("👋 Good bye!");
    Ok(())
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run()) {
        eprintln!("\n❌ ERROR: {:?}", e);
        std::process::exit(1);
    }
}
