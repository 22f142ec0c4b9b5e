use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod analysis;
mod feed;
mod llm;
mod notify;
mod output;
mod render;
mod run;
mod telemetry;
mod util;

#[derive(Parser)]
#[command(name = "ai-daily", about = "Daily AI news digest from an RSS feed")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run(run::RunCmd),
    Feed(feed::FeedCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // stderr logging; honors RUST_LOG and AI_DAILY_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Run(args) => run::run(args).await?,
        Commands::Feed(args) => feed::run(args).await?,
    }

    Ok(())
}
