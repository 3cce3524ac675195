use anyhow::{Context, Result};
use argp::FromArgs;
use reqwatch_core::{config::Config, models::RepositoryRef};
use reqwatch_github::GitHub;
use reqwatch_jobs::{TickJob, process_tick_job};

use crate::util::repository;

#[derive(FromArgs, PartialEq, Debug)]
/// Check a repository's most recently updated pull request once and print the report.
#[argp(subcommand, name = "tick")]
pub struct Args {
    #[argp(positional, from_str_fn(repository))]
    /// GitHub repository URL (or owner/name)
    repository: RepositoryRef,
    #[argp(option, short = 'w')]
    /// webhook to notify when requirements.txt changed (omit to only compare)
    webhook: Option<String>,
}

pub async fn run(args: Args, config: &Config) -> Result<()> {
    let github = GitHub::new(&config.github).context("Failed to create GitHub client")?;
    let job = TickJob { repository: args.repository, target: args.webhook };
    let report = process_tick_job(&github, &job)
        .await
        .with_context(|| format!("Failed to check {}", job.repository))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
