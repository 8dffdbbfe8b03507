use anyhow::{Context, Result};
use clap::Args;
use iamledger::config::LedgerSettings;
use iamledger::{ExportLocation, TailError, Tailer};

#[derive(Debug, Args)]
pub struct TailArgs {
    /// Bucket holding the export (a directory under export.root).
    #[arg(long)]
    pub bucket: String,

    /// Object key of the export inside the bucket.
    #[arg(long)]
    pub key: String,
}

/// Prints the dispatch summary. A partial delivery still prints the summary
/// before failing.
pub async fn execute(args: TailArgs, settings: &LedgerSettings) -> Result<()> {
    let location = ExportLocation::new(args.bucket, args.key);
    let tailer = Tailer::from_settings(settings);

    match tailer.tail(&location).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string(&summary)?);
            Ok(())
        }
        Err(TailError::Dispatch(e)) if e.summary().is_some() => {
            println!("{}", e);
            Err(e).with_context(|| format!("Partial delivery of {}", location))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to tail {}", location)),
    }
}
