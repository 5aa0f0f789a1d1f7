use pod_restarter::{cli::Cli, config::Config, errors::AppResult};

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = <Cli as clap::Parser>::parse();
    pod_restarter::logging::init(cli.log_format.into());

    let result = match Config::try_from(cli) {
        Ok(config) => pod_restarter::run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "pod restarter cannot start");
    }
    result
}
