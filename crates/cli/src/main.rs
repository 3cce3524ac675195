mod cmd;
mod util;

use anyhow::Result;
use argp::FromArgs;
use reqwatch_core::config::Config;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(FromArgs, PartialEq, Debug)]
/// Watch pull requests for requirements.txt changes.
struct TopLevel {
    #[argp(subcommand)]
    command: SubCommand,
    #[argp(option, short = 'c', default = "String::from(\"config.yml\")")]
    /// configuration file (defaults and environment apply when missing)
    config: String,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argp(subcommand)]
enum SubCommand {
    Tick(cmd::tick::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let args: TopLevel = argp::parse_args_or_exit(argp::DEFAULT);
    let config = Config::load(&args.config)?;
    match args.command {
        SubCommand::Tick(args) => cmd::tick::run(args, &config).await,
    }
}
