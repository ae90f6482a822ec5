//! Command dispatch.
//!
//! Every command returns the text to print. The [`Context`] carries the
//! configuration and the session explicitly; nothing here reads global state
//! apart from the clock in [`execute`].

use crate::cli::{Cli, Command, CreateUserArgs, DashboardArgs, UsersCommand};
use crate::render;
use anyhow::Context as _;
use chrono::{DateTime, Datelike, Local, TimeZone};
use labdash_api::{run_import, ApiClient, AuthGateway, LogSource, UserDirectory};
use labdash_core::config::Config;
use labdash_core::import::ImportResolver;
use labdash_core::session::SessionError;
use labdash_core::stats::{available_years, monthly_statistics, window_statistics};
use labdash_core::table::{filter_users, paginate};
use labdash_core::{CreateUserInput, LoginInput, Session, SessionStore};
use std::fmt::Display;
use std::path::Path;

pub struct Context {
    pub config: Config,
    pub store: SessionStore,
    pub session: Option<Session>,
}

impl Context {
    /// Build a context around `config`, loading any stored session.
    pub fn new(config: Config, store: SessionStore) -> anyhow::Result<Self> {
        let session = store
            .load()
            .with_context(|| format!("reading session from {}", store.path().display()))?;
        Ok(Self { config, store, session })
    }

    /// Load config.toml and apply the command-line overrides.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Config::load().context("loading config")?;
        if let Some(url) = &cli.api_url {
            config.api.base_url = url.clone();
        }
        let path = cli.session_file.clone().unwrap_or_else(|| config.session_path());
        Self::new(config, SessionStore::new(path))
    }

    fn client(&self) -> ApiClient {
        let client = ApiClient::from_config(&self.config.api);
        match &self.session {
            Some(session) => client.with_token(session.token.clone()),
            None => client,
        }
    }

    fn logged_in(&self) -> Result<&Session, SessionError> {
        self.session.as_ref().ok_or(SessionError::NotLoggedIn)
    }

    fn admin(&self) -> Result<&Session, SessionError> {
        self.logged_in()?.require_admin()
    }
}

/// Run `command` against the local clock.
pub async fn execute(ctx: &mut Context, command: Command) -> anyhow::Result<String> {
    execute_at(ctx, command, &Local::now()).await
}

/// Run `command` as if the current instant were `now`. Dates are shown and
/// bucketed in `now`'s time zone.
pub async fn execute_at<Tz: TimeZone>(
    ctx: &mut Context,
    command: Command,
    now: &DateTime<Tz>,
) -> anyhow::Result<String>
where
    Tz::Offset: Display,
{
    match command {
        Command::Login { username, password } => login(ctx, LoginInput { username, password }).await,
        Command::Logout => {
            ctx.store.clear().context("removing session file")?;
            ctx.session = None;
            Ok("Sesión cerrada.\n".to_string())
        }
        Command::Whoami => Ok(render::session(ctx.logged_in()?)),
        Command::Users(users) => {
            ctx.admin()?;
            run_users(ctx, users, &now.timezone()).await
        }
        Command::Logs { page } => {
            ctx.admin()?;
            let logs = ctx.client().fetch_logs().await?;
            let page = paginate(&logs, page.saturating_sub(1), ctx.config.tables.logs_page_size);
            Ok(render::logs(&page, &now.timezone()))
        }
        Command::Dashboard(args) => {
            ctx.logged_in()?;
            dashboard(ctx, args, now).await
        }
    }
}

async fn login(ctx: &mut Context, input: LoginInput) -> anyhow::Result<String> {
    // A stale token must not ride along on the login request.
    let client = ApiClient::from_config(&ctx.config.api);
    let session = client.login(&input).await?;
    ctx.store
        .save(&session)
        .with_context(|| format!("saving session to {}", ctx.store.path().display()))?;
    tracing::info!(user = %session.user.username, admin = session.user.is_admin, "logged in");
    let out = format!("Sesión iniciada: {}", render::session(&session));
    ctx.session = Some(session);
    Ok(out)
}

async fn run_users<Tz: TimeZone>(
    ctx: &Context,
    command: UsersCommand,
    tz: &Tz,
) -> anyhow::Result<String>
where
    Tz::Offset: Display,
{
    let client = ctx.client();
    match command {
        UsersCommand::List { page, search } => {
            let users = client.list_users().await?;
            let matching = filter_users(&users, search.as_deref().unwrap_or_default());
            let page = paginate(&matching, page.saturating_sub(1), ctx.config.tables.users_page_size);
            Ok(render::users(&page, users.len(), tz))
        }
        UsersCommand::Create(args) => {
            let user = client.create_user(&create_input(args)).await?;
            Ok(format!("Usuario creado: {}", render::user_line(&user)))
        }
        UsersCommand::Activate { id } => {
            let user = client.set_activation(id, true).await?;
            Ok(render::user_line(&user))
        }
        UsersCommand::Deactivate { id } => {
            let user = client.set_activation(id, false).await?;
            Ok(render::user_line(&user))
        }
        UsersCommand::Import { file } => import(&client, &file).await,
    }
}

fn create_input(args: CreateUserArgs) -> CreateUserInput {
    CreateUserInput {
        user_name: args.user_name.trim().to_string(),
        password: args.password,
        email: args.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
        name: args.name.trim().to_string(),
        apellido_paterno: args.apellido_paterno.trim().to_string(),
        apellido_materno: args.apellido_materno.trim().to_string(),
    }
}

async fn import(client: &ApiClient, file: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let resolution = ImportResolver::default().resolve_file(&bytes, &file_name)?;
    let summary = run_import(client, &resolution).await;
    let users = client.list_users().await?;
    Ok(render::import_summary(&summary, users.len()))
}

async fn dashboard<Tz: TimeZone>(
    ctx: &Context,
    args: DashboardArgs,
    now: &DateTime<Tz>,
) -> anyhow::Result<String>
where
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let logs = ctx.client().fetch_logs().await?;

    let period = args.period.unwrap_or(ctx.config.dashboard.default_period);
    let window = period.window_at(now);
    let stats = window_statistics(&logs, &window);
    let years = available_years(&logs, &tz);
    let year = args.year.or_else(|| years.first().copied()).unwrap_or_else(|| now.year());
    let monthly = monthly_statistics(&logs, year, &tz);

    if args.json {
        let body = serde_json::json!({
            "period": period,
            "window": window,
            "statistics": stats,
            "year": year,
            "availableYears": years,
            "monthly": monthly,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&body)?));
    }

    Ok(render::dashboard(
        &render::DashboardView {
            period,
            window,
            stats: &stats,
            year,
            years: &years,
            monthly: &monthly,
        },
        &tz,
    ))
}
