use anyhow::Result;
use clap::{Parser, Subcommand};
use cms::build::{build_blog, build_site};
use cms::config::Config;
use cms::write::Output;
use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;

/// Builds the blog or the site rooted at the current directory.
#[derive(Parser)]
#[command(name = "cms")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Render posts, the front page, the archive and the feed.
    Blog,

    /// Render every markdown file in the tree next to its source.
    Site,
}

#[derive(Debug, Error)]
#[error("usage: cms {{blog|site}}")]
struct UsageError;

/// Parses the command line. Anything but exactly one of the two modes,
/// including a request for help, is a usage error.
fn parse_mode<I, T>(args: I) -> std::result::Result<Mode, UsageError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
        .map(|cli| cli.mode)
        .map_err(|err| {
            log::debug!("{}", err);
            UsageError
        })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        println!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mode = parse_mode(std::env::args_os())?;
    let config = Config::from_directory(Path::new("."))?;

    let written = match mode {
        Mode::Blog => build_blog(&config, &mut Output::new(&config.output_directory))?,
        Mode::Site => build_site(&config, &mut Output::new(&config.site_directory))?,
    };
    log::info!("{} files written", written.len());
    Ok(())
}
