//! Operator commands for the salon database.
//!
//! Every command opens the database from `DATABASE_URL` (or `--database-url`),
//! prints its result on stdout and exits non-zero on error.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use sea_orm::DatabaseConnection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salon_backend::{
    config::Config,
    db,
    entities::{empleado::Especialidad, user::UserRole},
    error::{AppError, AppResult},
    services::{
        accounts::{self, NewUser, PasswordInput},
        migraciones::{self, MigrateOutcome},
        notificaciones, probe, reports, tokens,
    },
};

#[derive(Parser, Debug)]
#[command(name = "salon-admin")]
#[command(about = "Maintenance commands for the salon backend", long_about = None)]
struct Cli {
    /// Database connection string, overrides DATABASE_URL
    #[arg(long, global = true, value_name = "DATABASE")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations
    Migrate {
        /// Mark this migration applied if the run fails
        #[arg(long, value_name = "VERSION")]
        fallback: Option<String>,
    },
    /// Inspect or repair the migration tracking table
    Migrations {
        #[command(subcommand)]
        action: MigrationsCommand,
    },
    /// Read-only reports
    List {
        #[command(subcommand)]
        report: ListCommand,
    },
    /// Print (creating if needed) an API token
    Token {
        #[command(subcommand)]
        target: TokenCommand,
    },
    /// Replace the password of the user with this email
    ResetPassword(ResetPasswordArgs),
    /// Create a user, with its cliente or empleado profile
    CreateUser(CreateUserArgs),
    /// Notify clients of turnos starting soon
    SendReminders {
        #[arg(long, default_value_t = 24)]
        hours: i64,
    },
    /// Log in against a running server and list clients
    ProbeApi {
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        base_url: String,
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
enum MigrationsCommand {
    /// Applied and pending migrations, plus orphaned tracking rows
    Status,
    /// Move tracking rows from one app label to another
    RenameApp {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Mark a migration applied without running it
    Fake { version: String },
    /// Mark initial migrations applied when their tables already exist
    FakeInitial,
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    Turnos,
    Empleados,
    Propietarios,
    Categorias,
    /// Turnos with client notes, and the short ones
    Notas {
        #[arg(long, default_value_t = reports::SHORT_NOTE_MAX_LEN)]
        max_len: usize,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    Email { email: String },
    /// First active user with this role
    Role { role: UserRole },
    /// Show who a token belongs to
    Check { key: String },
}

#[derive(Args, Debug)]
struct ResetPasswordArgs {
    #[arg(long)]
    email: String,
    #[arg(long, conflicts_with = "hash", required_unless_present = "hash")]
    password: Option<String>,
    /// Precomputed argon2 PHC string
    #[arg(long)]
    hash: Option<String>,
}

#[derive(Args, Debug)]
struct CreateUserArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long, default_value = "cliente")]
    role: UserRole,
    /// Full name, required for clients
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    telefono: Option<String>,
    /// Required for employees
    #[arg(long)]
    especialidad: Option<Especialidad>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salon_backend=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let url = cli.database_url;
    match cli.command {
        Command::Migrate { fallback } => migrate(&open(url).await?, fallback.as_deref()).await,
        Command::Migrations { action } => migrations(&open(url).await?, action).await,
        Command::List { report } => list(&open(url).await?, report).await,
        Command::Token { target } => token(&open(url).await?, target).await,
        Command::ResetPassword(args) => reset_password(&open(url).await?, args).await,
        Command::CreateUser(args) => create_user(&open(url).await?, args).await,
        Command::SendReminders { hours } => {
            let window = notificaciones::reminder_window(hours)?;
            let sent =
                notificaciones::send_reminders(&open(url).await?, chrono::Utc::now(), window)
                    .await?;
            println!("{} reminder(s) sent", sent);
            Ok(())
        }
        Command::ProbeApi {
            base_url,
            login,
            password,
        } => probe_api(&base_url, &login, &password).await,
    }
}

async fn open(database_url: Option<String>) -> AppResult<DatabaseConnection> {
    let config = match database_url {
        Some(url) => Config::with_database_url(url),
        None => Config::from_env(),
    };
    db::connect(&config).await
}

async fn probe_api(base_url: &str, login: &str, password: &str) -> AppResult<()> {
    let report = probe::probe_api(base_url, login, password).await?;
    println!("login: HTTP {}", report.login_status);
    match (&report.token, report.clientes_status) {
        (Some(token), Some(status)) => {
            println!("token: {}", token);
            println!("clientes: HTTP {}", status);
            if let Some(count) = report.clientes_count {
                println!("clientes count: {}", count);
            }
        }
        _ => println!("login failed, clientes not requested"),
    }
    Ok(())
}

async fn migrate(db: &DatabaseConnection, fallback: Option<&str>) -> AppResult<()> {
    match migraciones::apply_with_fallback(db, fallback).await? {
        MigrateOutcome::Applied => println!("Migrations applied"),
        MigrateOutcome::FakedAfterError {
            error,
            version,
            inserted,
        } => {
            eprintln!("migration failed: {}", error);
            println!("{} marked applied ({} row inserted)", version, inserted);
        }
    }
    Ok(())
}

async fn migrations(db: &DatabaseConnection, action: MigrationsCommand) -> AppResult<()> {
    match action {
        MigrationsCommand::Status => {
            let report = migraciones::status(db).await?;
            for m in &report.migrations {
                let mark = if m.applied { "X" } else { " " };
                println!("[{}] {}", mark, m.version);
            }
            for orphan in &report.orphans {
                println!("[?] {} (no such migration)", orphan);
            }
        }
        MigrationsCommand::RenameApp { from, to } => {
            let outcome = migraciones::rename_app(db, &from, &to).await?;
            println!("{} row(s) under '{}' before", outcome.before, from);
            println!("{} row(s) renamed to '{}'", outcome.renamed, to);
            if outcome.merged > 0 {
                println!("{} of them already tracked under '{}', duplicate dropped", outcome.merged, to);
            }
        }
        MigrationsCommand::Fake { version } => {
            let inserted = migraciones::fake_apply(db, &version).await?;
            if inserted == 0 {
                println!("{} was already recorded", version);
            } else {
                println!("{} marked applied", version);
            }
        }
        MigrationsCommand::FakeInitial => {
            let faked = migraciones::fake_initial(db).await?;
            if faked.is_empty() {
                println!("Nothing to fake");
            }
            for version in faked {
                println!("{} marked applied", version);
            }
        }
    }
    Ok(())
}

async fn list(db: &DatabaseConnection, report: ListCommand) -> AppResult<()> {
    match report {
        ListCommand::Turnos => {
            let rows = reports::turnos(db).await?;
            println!("{} turno(s)", rows.len());
            for t in rows {
                println!(
                    "#{} {} [{}] {} / {} / {} ${}",
                    t.id,
                    t.fecha_hora.format("%Y-%m-%d %H:%M"),
                    t.estado,
                    t.cliente,
                    t.empleado,
                    t.servicio,
                    t.precio_final
                );
            }
        }
        ListCommand::Empleados => {
            let rows = reports::empleados(db).await?;
            println!("{} empleado(s)", rows.len());
            for e in rows {
                let activo = if e.activo { "activo" } else { "inactivo" };
                println!(
                    "#{} {} <{}> {} ({})",
                    e.id,
                    e.username,
                    e.email,
                    e.especialidad.as_str(),
                    activo
                );
            }
        }
        ListCommand::Propietarios => {
            let rows = reports::propietarios(db).await?;
            println!("{} propietario(s)", rows.len());
            for u in rows {
                println!("#{} {} <{}>", u.id, u.username, u.email);
            }
        }
        ListCommand::Categorias => {
            let rows = reports::categorias(db).await?;
            println!("{} categoria(s)", rows.len());
            for c in rows {
                println!("#{} {} ({} servicio(s))", c.id, c.nombre, c.servicios);
            }
        }
        ListCommand::Notas { max_len } => {
            let report = reports::notas(db, max_len).await?;
            println!("{} turno(s) with notes", report.con_notas.len());
            for n in &report.con_notas {
                println!("#{} {:?}", n.turno_id, n.notas);
            }
            println!("{} short note(s) (<= {} chars)", report.cortas.len(), max_len);
            for n in &report.cortas {
                println!("#{} {:?}", n.turno_id, n.notas);
            }
        }
    }
    Ok(())
}

async fn token(db: &DatabaseConnection, target: TokenCommand) -> AppResult<()> {
    let (user, token, created) = match target {
        TokenCommand::Email { email } => tokens::for_email(db, &email).await?,
        TokenCommand::Role { role } => tokens::for_role(db, role).await?,
        TokenCommand::Check { key } => {
            let user = tokens::lookup(db, &key).await?;
            println!("{} <{}> ({})", user.username, user.email, user.role);
            return Ok(());
        }
    };

    let label = if created { "created" } else { "existing" };
    println!("{} <{}> ({})", user.username, user.email, user.role);
    println!("{} token: {}", label, token.key);
    Ok(())
}

async fn reset_password(db: &DatabaseConnection, args: ResetPasswordArgs) -> AppResult<()> {
    let input = match (args.password, args.hash) {
        (Some(password), _) => PasswordInput::Plain(password),
        (None, Some(hash)) => PasswordInput::Hash(hash),
        (None, None) => {
            return Err(AppError::BadRequest("--password or --hash is required".to_string()));
        }
    };

    let rows = accounts::reset_password(db, &args.email, input).await?;
    if rows == 0 {
        println!("No user with email {}, nothing updated", args.email);
    } else {
        println!("Password updated for {} ({} row)", args.email, rows);
    }
    Ok(())
}

async fn create_user(db: &DatabaseConnection, args: CreateUserArgs) -> AppResult<()> {
    let new = NewUser {
        username: args.username,
        email: args.email,
        password: args.password,
        role: args.role,
    };

    let user = match args.role {
        UserRole::Cliente => {
            let nombre = args.nombre.ok_or_else(|| {
                AppError::BadRequest("--nombre is required for clients".to_string())
            })?;
            accounts::register_cliente(db, new, &nombre, args.telefono).await?.0
        }
        UserRole::Empleado => {
            let especialidad = args.especialidad.ok_or_else(|| {
                AppError::BadRequest(
                    "--especialidad is required for employees".to_string(),
                )
            })?;
            accounts::register_empleado(db, new, especialidad).await?.0
        }
        UserRole::Propietario => accounts::create_user(db, new).await?,
    };

    println!("Created #{} {} <{}> ({})", user.id, user.username, user.email, user.role);
    Ok(())
}
