use anyhow::{Context, Result};
use calc_web::{run_http_server, WebSettings};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "calc_web", about = "Beltworks conveyor calculators web server")]
struct Cli {
    /// Address to listen on (overrides BELTWORKS_BIND)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let mut settings = WebSettings::from_env().context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        settings = settings.with_bind(bind);
    }

    run_http_server(settings).await
}

fn init_tracing() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,calc_web=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
