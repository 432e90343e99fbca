use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tracks release feeds, announces new stable versions and publishes the current release tracks
///
/// A full pass is meant to be scheduled periodically, never running two at the same time:
/// - fetches the release feed of every tracked application, learning new releases
/// - announces the newest stable release not yet announced, at most one per run
/// - publishes the current stable, beta and alpha versions for the website
#[derive(Parser)]
#[cfg_attr(debug_assertions, derive(Debug))]
#[command(author, version, verbatim_doc_comment, infer_subcommands = true, subcommand_required = true)]
pub struct Cli {
    /// Path of the config file to use, defaults to the user's config directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to be executed
    #[command(name = "command", subcommand)]
    pub process: CliProcess,
}

#[derive(Subcommand)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum CliProcess {
    /// Runs a full pass: sync feeds, announce and publish
    Run(RunProcess),

    /// Fetches the release feeds, learning new releases
    Sync(SyncProcess),

    /// Announces the newest stable release not yet announced, without fetching feeds
    Announce(AnnounceProcess),

    /// Publishes the current release tracks for the website, without fetching feeds
    Publish(PublishProcess),

    /// Prints the current release tracks, without fetching feeds
    Status(StatusProcess),
}

/// Runs a full pass: sync feeds, announce and publish
#[derive(Args, Debug)]
pub struct RunProcess {
    /// Skip the announcement step
    #[arg(long)]
    pub skip_announce: bool,
}

/// Fetches the release feeds, learning new releases
#[derive(Args, Debug)]
pub struct SyncProcess;

/// Announces the newest stable release not yet announced
#[derive(Args, Debug)]
pub struct AnnounceProcess;

/// Publishes the current release tracks for the website
#[derive(Args, Debug)]
pub struct PublishProcess;

/// Prints the current release tracks
#[derive(Args, Debug)]
pub struct StatusProcess {
    /// Print the summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
