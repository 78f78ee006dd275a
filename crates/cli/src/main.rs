mod check_cmd;
mod migrate_cmd;
mod runtime;
mod seed_cmd;
mod user_cmd;

use clap::{Parser, Subcommand};
use schoolbase_core::UserRole;
use schoolbase_schema::Dialect;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "schoolbase",
    version,
    about = "schoolbase CLI - migrate, seed and inspect a school management database"
)]
struct Cli {
    /// Config file (default: $SCHOOLBASE_CONFIG, then the per-user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config and $SCHOOLBASE_DATABASE
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply all pending migrations
    Migrate,

    /// List migrations and whether each is applied
    Status,

    /// Revert the most recently applied migrations
    Rollback {
        /// How many migrations to revert
        #[arg(long, default_value_t = 1)]
        steps: usize,
    },

    /// Print the migration SQL without touching a database
    Schema {
        /// SQL dialect: sqlite or postgres
        #[arg(long, default_value = "sqlite")]
        dialect: Dialect,

        /// Print the down scripts, newest migration first
        #[arg(long)]
        down: bool,
    },

    /// Seed subscription plans and the super-admin account
    Seed {
        /// Also create the demo school
        #[arg(long)]
        demo: bool,
    },

    /// Delete every school and user in the demo email domain
    CleanupDemo {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Verify the database is reachable and report its state
    Check,

    /// Create a user account; the password comes from a secret source
    CreateUser {
        #[arg(long)]
        email: String,

        /// super_admin, school_admin, teacher, student or parent
        #[arg(long)]
        role: UserRole,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Email of the school the user belongs to (all roles except super_admin)
        #[arg(long)]
        school_email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Environment variable holding the password
        #[arg(long, default_value = "SCHOOLBASE_USER_PASSWORD")]
        password_env: String,

        /// File holding the password
        #[arg(long)]
        password_file: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema { dialect, down } => {
            migrate_cmd::print_schema(dialect, down);
            Ok(())
        }
        command => runtime::Runtime::load(cli.config.as_deref(), cli.database.as_deref())
            .and_then(|rt| run(&rt, command)),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(rt: &runtime::Runtime, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => migrate_cmd::run_migrate(rt),
        Commands::Status => migrate_cmd::run_status(rt),
        Commands::Rollback { steps } => migrate_cmd::run_rollback(rt, steps),
        Commands::Schema { dialect, down } => {
            migrate_cmd::print_schema(dialect, down);
            Ok(())
        }
        Commands::Seed { demo } => seed_cmd::run_seed(rt, demo),
        Commands::CleanupDemo { yes } => seed_cmd::run_cleanup_demo(rt, yes),
        Commands::Check => check_cmd::run_check(rt),
        Commands::CreateUser {
            email,
            role,
            first_name,
            last_name,
            school_email,
            phone,
            password_env,
            password_file,
        } => user_cmd::run_create_user(
            rt,
            user_cmd::CreateUser {
                email,
                role,
                first_name,
                last_name,
                school_email,
                phone,
                password_env,
                password_file,
            },
        ),
    }
}
