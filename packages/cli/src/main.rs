mod commands;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(about = "Operator tooling for the Stagehand backend", long_about = None)]
struct Cli {
    /// Database URL. Falls back to the server configuration.
    #[arg(long, global = true, env = "STAGEHAND__DATABASE__URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the schema, create indexes and seed roles
    Migrate,
    /// Seed roles and permissions
    Seed {
        /// Also insert sample users, artists, venues and events
        #[arg(long)]
        demo: bool,
    },
    /// Drop every table, then migrate
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Create a user account. Prompts for the password.
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "member")]
        role: String,
    },
    /// Check connectivity and report row counts
    CheckDb,
    /// Validate and sanitize embed markup from the argument or stdin
    CheckEmbed {
        /// Markup to check. Read from stdin when omitted.
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let url = cli.database_url;
    match cli.command {
        Commands::Migrate => commands::db::migrate(url).await,
        Commands::Seed { demo } => commands::db::seed(url, demo).await,
        Commands::Reset { yes } => commands::db::reset(url, yes).await,
        Commands::CreateUser {
            email,
            first_name,
            last_name,
            role,
        } => commands::user::create_user(url, email, first_name, last_name, role).await,
        Commands::CheckDb => commands::db::check_db(url).await,
        Commands::CheckEmbed { code } => commands::embed::check_embed(code),
    }
}
