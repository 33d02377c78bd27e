//! Identity Store - schema management and inspection CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use identity_store::MigrateAction;

#[derive(Parser)]
#[command(name = "identity-store")]
#[command(about = "Relational identity store tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Role commands
    Role {
        #[command(subcommand)]
        action: RoleCommands,
    },
    /// User commands
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum RoleCommands {
    /// Create a role
    Create { name: String },
    /// List the members of a role
    Members { name: String },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Show a user by user name
    Show { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            identity_store::run_migrations(migrate_action).await?;
        }
        Commands::Role { action } => match action {
            RoleCommands::Create { name } => identity_store::create_role(&name).await?,
            RoleCommands::Members { name } => identity_store::list_role_members(&name).await?,
        },
        Commands::User { action } => match action {
            UserCommands::Show { name } => identity_store::show_user(&name).await?,
        },
    }

    Ok(())
}
