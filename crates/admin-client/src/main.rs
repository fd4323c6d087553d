//! `admin-client`: drive the admin backend from a terminal.
//!
//! # Examples
//! ```sh
//! admin-client login --email ada@example.com --password secret
//! admin-client users list
//! admin-client users delete 65f1c0ffee00000000000001
//! ```

use std::io::{self, Write};
use std::pin::pin;

use admin_client::app::AppState;
use admin_client::config::ClientSettings;
use admin_client::dashboard::{DashboardStats, price_distribution, recent_activity};
use admin_client::{
    DeleteOutcome, DeletePrompt, NotificationId, User, UserFields, UserId, UserPatch,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `admin-client` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "admin-client",
    about = "Manage admin dashboard users, notifications, and carts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage users.
    #[command(subcommand)]
    Users(UsersCommand),
    /// Inspect the notification feed (requires persisted notifications).
    #[command(subcommand)]
    Notifications(NotificationsCommand),
    /// List flattened cart line items.
    Carts,
    /// Show dashboard figures.
    Stats,
    /// Open an operator session.
    Login {
        /// Sign-in email.
        #[arg(long)]
        email: String,
        /// Sign-in password.
        #[arg(long)]
        password: String,
    },
    /// End the operator session.
    Logout,
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// List users.
    List,
    /// Create a user.
    Add(UserArgs),
    /// Change fields of a user.
    Update {
        /// User id.
        id: String,
        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Delete a user after confirmation; type `y` to confirm, `u` to undo.
    Delete {
        /// User id.
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum NotificationsCommand {
    /// List notifications, newest first.
    List,
    /// Mark one notification, or all of them, as read.
    Read {
        /// Notification id; omit with `--all`.
        id: Option<String>,
        /// Mark every notification.
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
    /// Remove every notification.
    Clear,
}

#[derive(Debug, Args)]
struct UserArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    gender: String,
    #[arg(long)]
    department: String,
    #[arg(long)]
    phone: String,
    /// Start date as `YYYY-MM-DD`.
    #[arg(long, value_name = "date")]
    start_date: NaiveDate,
    /// Create the user as inactive.
    #[arg(long)]
    inactive: bool,
}

impl From<UserArgs> for UserFields {
    fn from(args: UserArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            gender: args.gender,
            department: args.department,
            phone: args.phone,
            is_active: !args.inactive,
            start_date: args.start_date,
        }
    }
}

#[derive(Debug, Args)]
struct PatchArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    active: Option<bool>,
    #[arg(long, value_name = "date")]
    start_date: Option<NaiveDate>,
}

impl From<PatchArgs> for UserPatch {
    fn from(args: PatchArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            gender: args.gender,
            department: args.department,
            phone: args.phone,
            is_active: args.active,
            start_date: args.start_date,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli.command))
}

async fn run(command: Command) -> Result<()> {
    let settings = ClientSettings::load_from_env()?;
    let app = AppState::from_settings(&settings)?;

    match command {
        Command::Login { email, password } => {
            if !app.auth.login(&email, &password)? {
                return Err(eyre!("email and password are required"));
            }
            let session = app.auth.session();
            emit(&session)
        }
        Command::Logout => {
            app.auth.logout()?;
            Ok(())
        }
        Command::Users(users) => {
            app.auth.require_authenticated()?;
            run_users(&app, users).await
        }
        Command::Notifications(notifications) => {
            app.auth.require_authenticated()?;
            run_notifications(&app, notifications).await
        }
        Command::Carts => {
            app.auth.require_authenticated()?;
            emit(&app.cart_items().await?)
        }
        Command::Stats => {
            app.auth.require_authenticated()?;
            app.users.load().await?;
            let items = app.cart_items().await?;
            let users = app.users.users();
            emit(&serde_json::json!({
                "stats": DashboardStats::compute(&items, &users),
                "priceDistribution": price_distribution(&items),
                "recentActivity": recent_activity(&items, &users),
            }))
        }
    }
}

async fn run_users(app: &AppState, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List => {
            app.users.load().await?;
            emit(&app.users.users())
        }
        UsersCommand::Add(args) => {
            let fields = UserFields::from(args);
            fields.validate()?;
            let created = app.users.create(User::candidate(fields)).await?;
            emit(&created)
        }
        UsersCommand::Update { id, patch } => {
            let patch = UserPatch::from(patch);
            patch.validate()?;
            let updated = app.users.update(&UserId::new(id), &patch).await?;
            emit(&updated)
        }
        UsersCommand::Delete { id } => {
            app.users.load().await?;
            run_delete(app, &UserId::new(id)).await
        }
    }
}

/// Drive one delete flow interactively until it ends.
async fn run_delete(app: &AppState, id: &UserId) -> Result<()> {
    let ticket = app.users.delete(id)?;
    let mut prompts = app.users.subscribe_prompt();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut outcome = pin!(ticket.outcome());
    show_prompt(&app.users.prompt())?;

    let finished = loop {
        tokio::select! {
            finished = &mut outcome => break finished,
            Ok(()) = prompts.changed() => {
                let prompt = prompts.borrow_and_update().clone();
                show_prompt(&prompt)?;
            }
            line = lines.next_line(), if stdin_open => {
                match line.wrap_err("read stdin")? {
                    Some(answer) => answer_prompt(app, answer.trim()).await,
                    None => stdin_open = false,
                }
            }
        }
    };

    match finished {
        DeleteOutcome::Deleted => emit(&serde_json::json!({ "deleted": id })),
        DeleteOutcome::Restored => emit(&serde_json::json!({ "restored": id })),
        DeleteOutcome::Expired => Err(eyre!("delete not confirmed in time")),
        DeleteOutcome::Failed(error) => Err(error).wrap_err("delete failed"),
        DeleteOutcome::Abandoned => Err(eyre!("delete abandoned")),
    }
}

async fn answer_prompt(app: &AppState, answer: &str) {
    let result = match answer {
        "y" | "yes" => app.users.confirm_delete().await.map(drop),
        "u" | "undo" => app.users.undo_delete().await.map(drop),
        _ => Ok(()),
    };
    // Failures also resolve the ticket; the caller reports them from there.
    if let Err(error) = result {
        warn!(%error, "delete flow step failed");
    }
}

fn show_prompt(prompt: &DeletePrompt) -> Result<()> {
    let mut stderr = io::stderr().lock();
    match prompt {
        DeletePrompt::Hidden => Ok(()),
        DeletePrompt::Confirm { label, remaining } => {
            writeln!(stderr, "Delete {label}? [y] ({remaining}s)").wrap_err("write prompt")
        }
        DeletePrompt::Undo { message, remaining } => {
            writeln!(stderr, "{message}. [u]ndo ({remaining}s)").wrap_err("write prompt")
        }
    }
}

async fn run_notifications(app: &AppState, command: NotificationsCommand) -> Result<()> {
    if !app.notifications.is_persisted() {
        warn!("notifications are kept in memory; set ADMIN_CLIENT_PERSIST_NOTIFICATIONS=true");
    }
    app.notifications.load().await?;
    match command {
        NotificationsCommand::List => emit(&app.notifications.notifications()),
        NotificationsCommand::Read { id: Some(id), .. } => {
            app.notifications
                .mark_as_read(&NotificationId::new(id))
                .await?;
            Ok(())
        }
        NotificationsCommand::Read { id: None, all: true } => {
            app.notifications.mark_all_as_read().await?;
            Ok(())
        }
        NotificationsCommand::Read { id: None, all: false } => {
            Err(eyre!("pass a notification id or --all"))
        }
        NotificationsCommand::Clear => {
            app.notifications.clear().await?;
            Ok(())
        }
    }
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).wrap_err("encode output")?;
    writeln!(io::stdout().lock(), "{rendered}").wrap_err("write output")
}
