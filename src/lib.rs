//! Keeps track of the releases of a set of applications, announcing new stable versions and publishing the
//! current stable, beta and alpha tracks of each one.
//!
//! Every run is a batch pass:
//! - fetches the Atom release feed of each tracked application and learns the releases not seen before
//! - announces the newest stable release not yet announced on Mastodon, at most one per run
//! - classifies the known releases into tracks and writes them to a JSON file consumed by the website

#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod process;
pub mod service;
pub mod storage;
pub mod utils;
