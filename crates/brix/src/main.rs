use brix::{
    commands::{
        config::{self, ConfigAction},
        plugins::{self, PluginsAction},
    },
    logger, GlobalOpts,
};
use brix_config::Config;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "brix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Plugin-based build automation",
    long_about = "Brix assembles build task graphs from builtin and third-party plugins."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure brix
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Resolve, install and check plugins
    Plugins {
        #[command(subcommand)]
        action: PluginsAction,
    },
}

fn init_tracing(opts: &GlobalOpts) {
    if opts.no_stdout {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(opts.tracing_directive()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.no_stdout)
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(&cli.global);

    if let Err(e) = Config::load().and_then(|mut cfg| cfg.ensure_installer_path()) {
        logger::warn(&format!("Failed to setup CLI: {}", e));
    }

    let result = match cli.command {
        Commands::Config { action } => config::handle_config(action, &cli.global),
        Commands::Plugins { action } => plugins::handle_plugins(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&e);
        logger::show_log_path();
        std::process::exit(1);
    }
}
