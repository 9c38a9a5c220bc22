mod auth;
mod catalog;
mod config;
mod course;
mod profile;
#[cfg(test)]
mod testing;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dialoguer::{Input, Password};
use serde::Serialize;
use tracing::{debug, info};

use ctd_client::{PortalClient, Session, SessionStore, SignupForm};
use ctd_logging::LogFormat;

use crate::auth::{AuthMode, AuthOutcome, AuthRequest, SessionCheck};
use crate::catalog::{Catalog, CatalogTab};
use crate::config::{ProjectConfig, Settings, BACKEND_URL_ENV};
use crate::course::CourseView;

#[derive(Parser, Debug)]
#[command(name = "ctd", about = "Terminal client for the CTD course portal", version)]
struct Cli {
    /// Portal backend URL (overrides CTD_BACKEND_URL and ctd.toml)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a student account
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        roll: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Request a password reset link
    ForgotPassword {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Browse the course catalog
    Courses {
        #[arg(long, value_enum, default_value = "all")]
        tab: CatalogTab,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one course and your attendance in it
    Course {
        id: String,
        /// Reconcile as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Show only the attendance grid of one course
    Attendance {
        id: String,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Show your profile
    Profile,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let file_config = ProjectConfig::load(&working_dir)?;
    let settings = Settings::resolve(
        file_config.as_ref(),
        std::env::var(BACKEND_URL_ENV).ok(),
        cli.backend_url.clone(),
        cli.log_format.map(Into::into),
    )?;

    ctd_logging::init_tracing(&settings.log_level, settings.log_format);
    debug!(backend_url = %settings.backend_url, "Resolved settings");

    let store = SessionStore::new()?;
    let anonymous = PortalClient::new(&settings.backend_url, settings.timeout)
        .with_context(|| format!("Invalid backend URL {}", settings.backend_url))?;
    let client = restore_session(&store, anonymous).await?;

    match cli.command {
        Command::Login { email, password } => {
            if client.session().is_some() {
                println!("Already signed in");
                return Ok(());
            }
            print_mode(AuthMode::Login);
            let request = AuthRequest::Login {
                email: prompt_text("Email", email)?,
                password: prompt_password(password)?,
            };
            run_auth(&client, &store, request).await?;
        }
        Command::Signup {
            name,
            roll,
            branch,
            year,
            mobile,
            email,
            password,
        } => {
            print_mode(AuthMode::Signup);
            let form = SignupForm {
                display_name: prompt_text("Name", name)?,
                roll: prompt_text("Roll Number", roll)?,
                branch: prompt_text("Branch", branch)?,
                year: prompt_text("Year of Study", year)?,
                mobile: prompt_text("Mobile Number", mobile)?,
                email: prompt_text("Email", email)?,
                password: prompt_password(password)?,
            };
            run_auth(&client, &store, AuthRequest::Signup(form)).await?;
        }
        Command::ForgotPassword { email } => {
            print_mode(AuthMode::ForgotPassword);
            let request = AuthRequest::ForgotPassword {
                email: prompt_text("Email", email)?,
            };
            run_auth(&client, &store, request).await?;
        }
        Command::Logout => {
            store.clear()?;
            println!("Signed out.");
        }
        Command::Courses { tab, search, page } => {
            require_session(&client)?;
            let catalog = Catalog::load(&client).await;
            let page = catalog.page(tab, &search, page);
            output(cli.json, &page, || page.render())?;
        }
        Command::Course { id, today } => {
            require_session(&client)?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let view: CourseView = course::load_course_view(&client, &id, today, &Local).await?;
            debug!(course = %view.course().name, %today, "Loaded course");
            output(cli.json, &view, || view.render())?;
        }
        Command::Attendance { id, today } => {
            require_session(&client)?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let view = course::load_attendance(&client, &id, today, &Local).await?;
            output(cli.json, &view, || view.render())?;
        }
        Command::Profile => {
            let session = require_session(&client)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&session.profile)?);
            } else {
                print!("{}", profile::render(&session.profile));
            }
        }
    }

    Ok(())
}

async fn run_auth(client: &PortalClient, store: &SessionStore, request: AuthRequest) -> Result<()> {
    eprintln!("{}...", request.mode().submit_label());
    let outcome = auth::submit(client, request).await?;
    if let AuthOutcome::SignedIn(session) = &outcome {
        store.save(session)?;
        info!(path = %store.path().display(), "Session saved");
    }
    println!("{}", outcome.message().green());
    Ok(())
}

/// Attach the stored session if the backend still accepts it. A rejected
/// session is removed from disk; an unreachable backend keeps it.
async fn restore_session(store: &SessionStore, anonymous: PortalClient) -> Result<PortalClient> {
    let Some(session) = store.load() else {
        return Ok(anonymous);
    };

    let candidate = anonymous.clone().with_session(session);
    match auth::check_session(&candidate).await {
        SessionCheck::Valid | SessionCheck::Unreachable => Ok(candidate),
        SessionCheck::Rejected => {
            store.clear()?;
            info!("Cleared rejected session");
            Ok(anonymous)
        }
    }
}

fn require_session(client: &PortalClient) -> Result<&Session> {
    match client.session() {
        Some(session) => Ok(session),
        None => bail!("Not signed in. Run `ctd login` first."),
    }
}

fn output<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn print_mode(mode: AuthMode) {
    eprintln!("{}", mode.title().bold());
    eprintln!("{}", mode.switch_hint().dimmed());
}

fn prompt_text(label: &str, given: Option<String>) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Input::<String>::new()
            .with_prompt(label)
            .interact_text()
            .with_context(|| format!("Failed to read {}", label)),
    }
}

fn prompt_password(given: Option<String>) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password"),
    }
}
