use std::path::Path;
use std::process::exit;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use log::{
    debug,
    LevelFilter,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help_heading = "GENERAL",
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)."
    )]
    pub verbose:  u8,
    #[arg(
        short = 't',
        long,
        help_heading = "GENERAL",
        help = "Number of threads. Defaults to all available cores."
    )]
    pub threads:  Option<usize>,
    #[arg(
        long,
        default_value_t = false,
        help_heading = "GENERAL",
        help = "Display a progress spinner."
    )]
    pub progress: bool,
}

impl UtilsArgs {
    /// Configures threads and logging. Must run before the library is used.
    pub fn setup(&self) -> anyhow::Result<()> {
        if let Some(threads) = self.threads {
            anyhow::ensure!(threads > 0, "Number of threads must be positive");
            std::env::set_var(scprep::utils::NUM_THREADS_ENV, threads.to_string());
            std::env::set_var("POLARS_MAX_THREADS", threads.to_string());
        }

        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .parse_default_env()
            .try_init()?;
        debug!("Using {} threads", scprep::utils::n_threads());
        Ok(())
    }

    pub fn spinner(
        &self,
        message: &str,
    ) -> anyhow::Result<ProgressBar> {
        if !self.progress {
            return Ok(ProgressBar::hidden());
        }
        init_spinner(message)
    }
}

pub fn init_spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Exits with an error message when `path` is not an existing file.
pub fn check_input(path: &Path) {
    if !path.exists() {
        eprintln!("Path {} does not exist.", style(path.display()).red());
        exit(-1);
    }
    if !path.is_file() {
        eprintln!("Path {} is not a file.", style(path.display()).red());
        exit(-1);
    }
}

/// Exits with an error message when `path` is a directory.
pub fn check_output(path: &Path) {
    if path.is_dir() {
        eprintln!(
            "Output path {} is a directory.",
            style(path.display()).red()
        );
        exit(-1);
    }
}

pub fn separator(sep: char) -> anyhow::Result<u8> {
    anyhow::ensure!(sep.is_ascii(), "Separator must be a single ASCII character");
    Ok(sep as u8)
}
