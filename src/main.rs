mod cli;
mod config;
mod error;
mod layout;
mod logging;
mod lookup;
mod model;
mod sheet;
mod source;
mod sync;
mod util;

use std::time::Duration;

use anyhow::{Context, Result};

use cli::Command;
use error::SyncError;
use layout::Profile;
use lookup::Lookups;
use sync::SyncJob;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<()> {
    let cli = cli::parse_args(args)?;

    let (profile_name, watch) = match cli.command {
        Command::Help => {
            cli::print_help();
            return Ok(());
        }
        Command::Profiles => {
            cli::print_profiles();
            return Ok(());
        }
        Command::Sync { profile } => (profile, false),
        Command::Watch { profile } => (profile, true),
    };

    logging::init_logging(cli.verbose)?;

    let profile = Profile::find(&profile_name)
        .ok_or_else(|| SyncError::UnknownProfile(profile_name.clone()))?;
    let config = config::load_config()?;
    let job = build_job(&config, profile)?;

    if watch {
        job.watch(Duration::from_secs(config.poll_interval_secs()))
            .await
    } else {
        let report = job.run().await?;
        println!("{}: {report}", profile.display_name);
        Ok(())
    }
}

fn build_job(config: &config::AppConfig, profile: &'static Profile) -> Result<SyncJob> {
    let freshdesk = config
        .freshdesk
        .as_ref()
        .ok_or(SyncError::NotConfigured("[freshdesk]"))?;
    let source = source::create_source(config).ok_or(SyncError::NotConfigured("[freshdesk]"))?;
    let store = sheet::create_store(config, profile)
        .with_context(|| format!("Failed to set up the sheet for {}", profile.name))?;
    tracing::debug!(source = source.name(), sheet = %store.describe(), "sync job ready");

    Ok(SyncJob {
        profile,
        source,
        store,
        lookups: Lookups::new(profile.status_overrides, config.agents.as_ref()),
        since: freshdesk.start_date().to_string(),
        lock_path: config::data_dir()
            .join("locks")
            .join(format!("{}.lock", profile.name)),
    })
}
