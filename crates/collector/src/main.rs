use anyhow::Result;
use collector::run;
use common::{config::AppConfig, logging};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;
    info!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        "dashboard run started"
    );
    let summary = run(&config).await?;
    info!(
        rows = summary.rows,
        complete = summary.stopped.is_none(),
        "dashboard run finished"
    );
    Ok(())
}
