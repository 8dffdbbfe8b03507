use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use iamledger::config::LedgerSettings;
use iamledger::{Auditor, BatchResult, QueueDelivery, SpoolQueue};
use tracing::{info, warn};

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Delivery file (`{"Records": [...]}`). Defaults to the next visible
    /// spool delivery, which is acknowledged on success and set aside on a
    /// failure that cannot succeed on retry.
    #[arg(long)]
    pub delivery: Option<PathBuf>,
}

pub async fn execute(args: AuditArgs, settings: &LedgerSettings) -> Result<()> {
    let auditor = Auditor::from_settings(settings)?;

    if let Some(path) = args.delivery {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read delivery {}", path.display()))?;
        let delivery = QueueDelivery::parse(&bytes)?;
        let result = auditor.audit(&delivery).await?;
        return print_result(&result);
    }

    let spool = SpoolQueue::new(&settings.queue.spool_directory);
    let Some(spooled) = spool.receive().await? else {
        info!(spool = %spool.dir().display(), "No delivery ready");
        return Ok(());
    };

    let result = match auditor.audit(&spooled.delivery).await {
        Ok(result) => result,
        Err(e) => {
            let retryable = e.is_retryable();
            warn!(
                path = %spooled.path.display(),
                retryable,
                "Delivery not acknowledged"
            );
            // Retryable failures stay spooled for the next run.
            if !retryable {
                spool.reject(&spooled).await?;
            }
            return Err(e).with_context(|| format!("Failed to audit {}", spooled.path.display()));
        }
    };
    spool.acknowledge(&spooled).await?;
    print_result(&result)
}

fn print_result(result: &BatchResult) -> Result<()> {
    println!("{}", serde_json::to_string(result)?);
    Ok(())
}
