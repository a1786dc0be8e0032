use clap::Parser;
use std::io;
use std::process::ExitCode;
use swiftstatus::collectors::LinuxMetrics;
use swiftstatus::config::{default_config_path, load_config, write_config, Configuration};
use swiftstatus::modules::ModuleRegistry;
use swiftstatus::poller::Poller;
use swiftstatus::Result;
use tracing::{debug, error, info};

mod cli;

use cli::Args;

fn run(args: &Args, config: Configuration) -> Result<()> {
    if args.dump_config {
        print!("{}", write_config(&config));
        return Ok(());
    }

    let registry = ModuleRegistry::with_defaults();
    let mut poller = Poller::new(&config, &registry, Box::new(LinuxMetrics::new()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    poller.run(&mut out, args.once.then_some(1))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    // stdout carries the status line
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let path = match args.config.clone().or_else(default_config_path) {
        Some(path) => path,
        None => {
            error!("No configuration file found, pass one with --config");
            return ExitCode::from(2);
        }
    };
    info!(path = %path.display(), "Loading configuration");

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(err) => {
            error!(path = %path.display(), error = %err, "Failed to load configuration");
            return ExitCode::from(1);
        }
    };

    match run(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "swiftstatus stopped");
            ExitCode::from(1)
        }
    }
}
