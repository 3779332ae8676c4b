use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod config;
mod controller;
mod error;
mod game;
mod library;
mod mpris;
mod playback;
mod runtime;
mod ui;

#[derive(Parser)]
#[command(name = "buzzquiz", version, about = "Terminal music quiz with team buzzers")]
struct Cli {
    /// Override settings file; session changes are saved here
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base settings file used instead of the built-in defaults
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// Songs directory for this session
    #[arg(long)]
    songs: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log to a file: the terminal belongs to the board. Without a writable log
/// file logging stays off.
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let Some(path) = config::default_log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    runtime::run(runtime::Options {
        config: cli.config,
        defaults: cli.defaults,
        songs: cli.songs,
    })
}
