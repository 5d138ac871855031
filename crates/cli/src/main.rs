mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "areakit")]
#[command(version, about = "Static site generator for local service-area marketing sites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize a new site directory with sample data
    Init {
        /// Path to create the site directory
        path: PathBuf,

        /// Business name
        #[arg(long)]
        name: Option<String>,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Site origin, e.g. https://example.com.au
        #[arg(long)]
        origin: Option<String>,
    },

    /// Validate site.toml and the datasets
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Preview site locally with hot reload
    Preview {
        /// Path to site directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Build the static site
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated site
        #[arg(short, long)]
        output: PathBuf,

        /// Override the site origin (takes precedence over SITE)
        #[arg(long)]
        origin: Option<String>,
    },

    /// Show how a URL path is redirected and resolved
    Resolve {
        /// Path to site directory
        path: PathBuf,

        /// URL path, optionally with a query string (e.g. /bond-cleaners/goodna/?utm=x)
        url: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("areakit=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init {
            path,
            name,
            email,
            origin,
        } => commands::init::run(path, name, email, origin).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Preview { path, port } => commands::preview::run(path, port).await,
        Command::Build {
            path,
            output,
            origin,
        } => commands::build::run(path, output, origin).await,
        Command::Resolve { path, url } => commands::resolve::run(path, url).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "areakit", &mut io::stdout());
            Ok(())
        }
    }
}
