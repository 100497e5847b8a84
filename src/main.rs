//! Stepline - CLI entry point.
//!
//! Runs a single goal through the agent loop and prints the final output.

use std::sync::Arc;

use stepline::agent::Runner;
use stepline::config::Config;
use stepline::llm::OpenRouterGateway;
use stepline::tools::ToolRegistry;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model);

    let goal = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if goal.trim().is_empty() {
        anyhow::bail!("usage: stepline <goal text>");
    }

    let gateway = Arc::new(OpenRouterGateway::new(
        config.api_key.clone(),
        config.model.clone(),
    ));
    let tools = Arc::new(ToolRegistry::with_defaults(&config.workspace_path));
    let runner = Runner::new(config, gateway, tools);

    // Ctrl-C cancels the run at the next step boundary.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Cancellation requested");
            signal_cancel.cancel();
        }
    });

    let report = runner.run_with_cancel(&goal, cancel).await?;
    info!("Run {} finished after {} steps", report.id, report.steps);
    println!("{}", report.output);

    Ok(())
}
