use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use user_profiles::capabilities::Authenticatable;
use user_profiles::client::UserProfilesApi;
use user_profiles::config::UserProfilesConfig;
use user_profiles::domain::service::UserProfileManager;
use user_profiles::error::UserProfilesError;
use user_profiles::gateways::local::UserProfilesLocalClient;
use user_profiles::infra::storage::{
    migrations::Migrator, sea_orm_repo::SeaOrmUserProfileRepository,
};
use user_profiles::model::{FlagsPatch, UserProfile};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Name of the module section in the `modules` config bag.
const MODULE_NAME: &str = "user_profiles";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Adds `mode=rwc` so a missing database file is created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        bail!("Empty SQLite path in DSN");
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

/// Detect DB backend from URL scheme.
fn detect_backend(url: &str) -> Result<&'static str> {
    let raw = url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }
    let parsed = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN: {}", e))?;
    match parsed.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => bail!("Unsupported database type: {}", other),
    }
}

/// Administrative CLI for email-authenticated user profiles
#[derive(Parser)]
#[command(name = "profiles-admin")]
#[command(about = "Administrative CLI for email-authenticated user profiles")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL (overrides config)
    #[arg(long, env = "PROFILES_DATABASE_URL")]
    database_url: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a user; without --password the account gets an unusable password
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a user with staff and superuser flags
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "PROFILES_SUPERUSER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Change a password; without --password the password becomes unusable
    SetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Grant staff and/or superuser flags (both when neither is given)
    Promote {
        #[arg(long)]
        email: String,
        #[arg(long)]
        staff: bool,
        #[arg(long)]
        superuser: bool,
    },
    /// Allow the account to log in again
    Activate {
        #[arg(long)]
        email: String,
    },
    /// Block the account from logging in
    Deactivate {
        #[arg(long)]
        email: String,
    },
    /// Verify credentials; exits with status 1 when they are rejected
    CheckPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show a profile
    Show {
        #[arg(long)]
        email: String,
    },
    /// Delete a profile
    Delete {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        database_url: cli.database_url.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::debug!(home_dir = %config.home_dir, "profiles-admin starting");

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        bail!("No command given; run with --help to list commands");
    };

    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("No database configured; set `database.url` or --database-url"))?;
    let db = connect(&db_config, Path::new(&config.home_dir)).await?;

    if let Commands::Migrate = command {
        tracing::info!("Running user_profiles migrations");
        Migrator::up(&db, None)
            .await
            .context("Failed to apply migrations")?;
        println!("Migrations applied");
        return Ok(ExitCode::SUCCESS);
    }

    let module_cfg: UserProfilesConfig = config.module_config(MODULE_NAME)?;
    let repo = SeaOrmUserProfileRepository::new(db);
    let manager = UserProfileManager::from_config(Arc::new(repo), &module_cfg)?;
    let api: Arc<dyn UserProfilesApi> = Arc::new(UserProfilesLocalClient::new(Arc::new(manager)));

    execute(api.as_ref(), command).await
}

async fn connect(db_config: &DatabaseConfig, base_dir: &Path) -> Result<DatabaseConnection> {
    let backend = detect_backend(&db_config.url)?;

    let mut dsn = db_config.url.trim().to_owned();
    if backend == "sqlite" {
        dsn = absolutize_sqlite_dsn(&dsn, base_dir, true)?;
    }

    let timeout = Duration::from_secs(db_config.connect_timeout_sec.unwrap_or(5));
    let mut opts = ConnectOptions::new(dsn);
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(false);

    tracing::info!(backend, "Connecting to database");
    Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {backend} database"))
}

async fn execute(api: &dyn UserProfilesApi, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Migrate => bail!("migrate does not run through the profiles API"),
        Commands::CreateUser {
            email,
            name,
            password,
        } => {
            let user = api.create_user(&email, &name, password.as_deref()).await?;
            println!("Created user {user}");
        }
        Commands::CreateSuperuser {
            email,
            name,
            password,
        } => {
            let password = password.ok_or_else(|| {
                anyhow!("Superusers need a password: pass --password or set PROFILES_SUPERUSER_PASSWORD")
            })?;
            let user = api.create_superuser(&email, &name, &password).await?;
            println!("Created superuser {user}");
        }
        Commands::SetPassword { email, password } => {
            let user = api.get_by_email(&email).await?;
            let user = api.set_password(user.id, password.as_deref()).await?;
            println!("Password updated for {user}");
        }
        Commands::Promote {
            email,
            staff,
            superuser,
        } => {
            let both = !staff && !superuser;
            let patch = FlagsPatch {
                is_staff: (staff || both).then_some(true),
                is_superuser: (superuser || both).then_some(true),
                ..Default::default()
            };
            let user = update_flags_by_email(api, &email, patch).await?;
            println!("Promoted {user}");
        }
        Commands::Activate { email } => {
            let patch = FlagsPatch {
                is_active: Some(true),
                ..Default::default()
            };
            let user = update_flags_by_email(api, &email, patch).await?;
            println!("Activated {user}");
        }
        Commands::Deactivate { email } => {
            let patch = FlagsPatch {
                is_active: Some(false),
                ..Default::default()
            };
            let user = update_flags_by_email(api, &email, patch).await?;
            println!("Deactivated {user}");
        }
        Commands::CheckPassword { email, password } => {
            match api.authenticate(&email, &password).await {
                Ok(user) => println!("Credentials accepted for {user}"),
                Err(e)
                    if matches!(
                        e.downcast_ref::<UserProfilesError>(),
                        Some(UserProfilesError::InvalidCredentials)
                    ) =>
                {
                    eprintln!("Invalid credentials");
                    return Ok(ExitCode::from(1));
                }
                Err(e) => return Err(e),
            }
        }
        Commands::Show { email } => {
            let user = api.get_by_email(&email).await?;
            print!("{}", render_profile(&user));
        }
        Commands::Delete { email } => {
            let user = api.get_by_email(&email).await?;
            api.delete_user(user.id).await?;
            println!("Deleted {user}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn update_flags_by_email(
    api: &dyn UserProfilesApi,
    email: &str,
    patch: FlagsPatch,
) -> Result<UserProfile> {
    let user = api.get_by_email(email).await?;
    api.update_flags(user.id, patch).await
}

fn render_profile(user: &UserProfile) -> String {
    let last_login = user
        .last_login
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    format!(
        "id: {}\nemail: {}\nname: {}\nis_active: {}\nis_staff: {}\nis_superuser: {}\nusable_password: {}\nlast_login: {}\ncreated_at: {}\nupdated_at: {}\n",
        user.id,
        user.email,
        user.name,
        user.is_active,
        user.is_staff,
        user.is_superuser,
        user.has_usable_password(),
        last_login,
        user.created_at.to_rfc3339(),
        user.updated_at.to_rfc3339(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_memory_is_kept() {
        let out = absolutize_sqlite_dsn("sqlite::memory:", Path::new("/base"), false).unwrap();
        assert_eq!(out, "sqlite::memory:");
        let out = absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/base"), false).unwrap();
        assert_eq!(out, "sqlite::memory:");
    }

    #[test]
    fn relative_sqlite_path_is_joined_with_base() {
        let base = std::env::temp_dir().join("profiles-admin-dsn");
        let out = absolutize_sqlite_dsn("sqlite://db/profiles.db", &base, false).unwrap();
        let expected = base
            .join("db/profiles.db")
            .to_string_lossy()
            .replace('\\', "/");
        assert_eq!(out, format!("sqlite://{expected}?mode=rwc"));
    }

    #[test]
    fn explicit_query_is_preserved() {
        let base = std::env::temp_dir();
        let out = absolutize_sqlite_dsn("sqlite://p.db?mode=ro", &base, false).unwrap();
        assert!(out.ends_with("p.db?mode=ro"));
    }

    #[test]
    fn bad_sqlite_dsns_are_rejected() {
        assert!(absolutize_sqlite_dsn("sqlite://", Path::new("/b"), false).is_err());
        assert!(absolutize_sqlite_dsn("postgres://x", Path::new("/b"), false).is_err());
    }

    #[test]
    fn backend_detection() {
        assert_eq!(detect_backend("sqlite://a.db").unwrap(), "sqlite");
        assert_eq!(detect_backend("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(detect_backend("postgres://u:p@h/db").unwrap(), "postgres");
        assert!(detect_backend("mysql://u@h/db").is_err());
        assert!(detect_backend("  ").is_err());
        assert!(detect_backend("not a url").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "profiles-admin",
            "create-user",
            "--email",
            "a@example.com",
            "--name",
            "A",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::CreateUser {
                email,
                name,
                password,
            }) => {
                assert_eq!(email, "a@example.com");
                assert_eq!(name, "A");
                assert!(password.is_none());
            }
            _ => panic!("Expected create-user"),
        }
    }
}
