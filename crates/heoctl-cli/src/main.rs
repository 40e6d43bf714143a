//! heoctl - install and uninstall Kubernetes, Helm and Terraform extensions

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;
mod runners;
mod staging;

use commands::DeployArgs;

#[derive(Parser)]
#[command(name = "heoctl")]
#[command(version)]
#[command(about = "Install and uninstall Kubernetes, Helm and Terraform extensions", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install an extension
    Install(DeployArgs),

    /// Uninstall an extension
    #[command(alias = "delete")]
    Uninstall(DeployArgs),
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("heoctl=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("heoctl=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    // A missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match &cli.command {
        Commands::Install(args) => commands::install::run(args).await,
        Commands::Uninstall(args) => commands::uninstall::run(args).await,
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
