//! Command-line surface.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};

use scanroll_client::{FetchClient, FetchConfig};
use scanroll_core::{AppConfig, FeedConfig};

use crate::pipeline::run_feed;

#[derive(Debug, Parser)]
#[command(name = "scanroll", version, about = "Roll archived scanner transcripts into a trailing-window feed")]
pub struct Cli {
    /// TOML config file (overrides SCANROLL_CONFIG_FILE).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest new snapshots and rewrite the window outputs.
    Run(RunArgs),
    /// List configured feeds and where their files live.
    Feeds,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Only run the named feed; repeatable. Runs every feed when omitted.
    #[arg(long = "feed", value_name = "NAME")]
    pub feeds: Vec<String>,
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Run(args) => run_feeds(&config, &args.feeds).await,
        Command::Feeds => {
            print_feeds(&config);
            Ok(())
        }
    }
}

fn select_feeds<'a>(config: &'a AppConfig, names: &[String]) -> Result<Vec<&'a FeedConfig>> {
    if names.is_empty() {
        return Ok(config.feeds.iter().collect());
    }
    names.iter().map(|name| config.feed(name).map_err(Into::into)).collect()
}

async fn run_feeds(config: &AppConfig, names: &[String]) -> Result<()> {
    let feeds = select_feeds(config, names)?;
    let client = FetchClient::new(FetchConfig::from(config))?;

    let mut failed = Vec::new();
    for feed in feeds {
        if let Err(err) = run_feed(config, feed, &client, Utc::now()).await {
            tracing::error!(feed = %feed.name, "run failed: {err:#}");
            failed.push(feed.name.as_str());
        }
    }

    if !failed.is_empty() {
        bail!("run failed for feed(s): {}", failed.join(", "));
    }
    Ok(())
}

fn print_feeds(config: &AppConfig) {
    for feed in &config.feeds {
        let paths = config.paths_for(feed);
        println!("{}", feed.name);
        println!("  archive: {}", feed.archive_base);
        println!("  window:  {}h", feed.window_hours);
        println!("  cache:   {}", paths.db.display());
        println!("  output:  {}", paths.output.display());
        println!("  meta:    {}", paths.meta.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_feeds() {
        let cli = Cli::try_parse_from(["scanroll", "run", "--feed", "fire", "--feed", "law1"]).unwrap();
        match cli.command {
            Command::Run(args) => assert_eq!(args.feeds, vec!["fire", "law1"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scanroll", "feeds", "--config", "/etc/scanroll.toml", "--json-logs"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/scanroll.toml")));
        assert!(cli.json_logs);
    }

    #[test]
    fn test_select_feeds() {
        let config = AppConfig::default();
        assert_eq!(select_feeds(&config, &[]).unwrap().len(), 2);

        let only = select_feeds(&config, &["law1".to_string()]).unwrap();
        assert_eq!(only[0].name, "law1");

        assert!(select_feeds(&config, &["law9".to_string()]).is_err());
    }
}
