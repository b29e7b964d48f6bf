use crate::{pkg::server::listen, prelude::Result};
use clap::{Parser, Subcommand};

mod inspect;

#[derive(Parser)]
#[command(about = "serves the job tracker frontend")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    Listen,
    /// print how a timestamp or calendar date is normalized in the local zone
    Inspect {
        #[arg(long)]
        ts: Option<i64>,
        #[arg(long)]
        date: Option<String>,
    },
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    match args.command {
        Some(SubCommandType::Listen) => {
            listen().await?;
        }
        Some(SubCommandType::Inspect { ts, date }) => {
            inspect::print(ts, date.as_deref());
        }
        None => {
            tracing::error!("no subcommand passed");
        }
    }
    Ok(())
}
