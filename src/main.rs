mod comment;
mod config;
mod github;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use comment::types::{DEFAULT_PR_NUMBER_PATH, DEFAULT_REPORT_PATH};
use comment::InputPaths;
use config::ConfigError;
use github::{CommentSink, GitHubClient, GitHubError};

/// Post a stubs clippy lint report as a comment on the pull request it was
/// produced for. Prints the PR number on stdout for later workflow steps.
#[derive(Parser, Debug)]
#[command(name = "stubs-clippy-comment", version, about)]
struct Cli {
    /// Lint report written by the clippy job
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    report: PathBuf,

    /// File containing the pull request number
    #[arg(long, default_value = DEFAULT_PR_NUMBER_PATH)]
    pr_number_file: PathBuf,

    /// Target repository as owner/repo (defaults to config, then GITHUB_REPOSITORY)
    #[arg(long)]
    repo: Option<String>,

    /// Config file (defaults to .stubs-clippy.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the comment instead of posting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;

    let inputs = InputPaths {
        report: cli.report,
        pr_number: cli.pr_number_file,
    };

    let issue_number = if cli.dry_run {
        info!("dry run, not posting");
        let repo = match config.resolve_repository(cli.repo.as_deref()) {
            Ok(repo) => Some(repo),
            Err(ConfigError::MissingRepository) => None,
            Err(e) => return Err(e.into()),
        };
        let prepared = comment::load(&inputs)?;
        comment::print_preview(repo.as_ref(), &prepared);
        prepared.issue_number
    } else {
        let repo = config.resolve_repository(cli.repo.as_deref())?;
        let _main_span = info_span!("stubs_clippy_comment", repo = %repo).entered();

        let token = config.github_token().ok_or(GitHubError::MissingToken)?;
        let api_url = config.api_url();
        debug!(%api_url, "using GitHub API");

        let client = GitHubClient::new(token, &api_url);
        let sink: &dyn CommentSink = &client;
        let number = comment::post(sink, &repo, &inputs).await?;
        eprintln!("{} {}#{}", "Commented on".green().bold(), repo, number);
        number
    };

    info!(issue_number, "done");
    println!("{issue_number}");

    Ok(())
}
