use anyhow::Result;
use clap::Parser;

use iamledger_cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.log_format)?;
    let settings = cli.settings()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Tail(args) => commands::tail::execute(args, &settings).await,
            Commands::Audit(args) => commands::audit::execute(args, &settings).await,
        }
    })
}
