use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use home_shared::{EditEffect, EditKey, InlineEditor};
use tracing::{debug, info};

use crate::cli::{Command, DayArgs};
use crate::config::Config;
use crate::day::{DATE_FORMAT, DayView, Role, local_today};
use crate::dispatch::{Dispatcher, EditResolution};
use crate::transport::{HttpTransport, Transport};

/// Who the client acts as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    /// User whose tasks are changed when a command names none.
    pub default_user: Option<String>,
    /// Account logged in before the first mutation.
    pub login_user: Option<String>,
    pub passcode: Option<String>,
}

impl SessionSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            default_user: cfg.get("user.id"),
            login_user: cfg.get("login.user"),
            passcode: cfg.get("login.passcode"),
        }
    }
}

/// Executes commands against one server session.
#[derive(Debug)]
pub struct Client<T> {
    dispatcher: Dispatcher<T>,
    settings: SessionSettings,
    authenticated: bool,
    today: NaiveDate,
}

impl Client<HttpTransport> {
    #[tracing::instrument(skip(cfg))]
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let base_url = cfg.server_url()?;
        let transport = HttpTransport::new(base_url, cfg.http_timeout()?)?;
        info!(server = %transport.base_url(), "using home app server");

        Ok(Self::new(
            transport,
            SessionSettings::from_config(cfg),
            local_today(),
        ))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, settings: SessionSettings, today: NaiveDate) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            settings,
            authenticated: false,
            today,
        }
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Runs one command and returns the line to show the user.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<String> {
        match command {
            Command::Mark {
                task_id,
                day,
                undo,
            } => {
                let (date, user) = self.resolve_day(&day)?;
                self.ensure_session().await?;
                self.dispatcher.mark(&task_id, &date, &user, !undo).await?;
                let state = if undo { "not done" } else { "done" };
                Ok(format!("task {task_id} marked {state} for {date}"))
            }
            Command::Star {
                task_id,
                day,
                starred,
            } => {
                let (date, user) = self.resolve_day(&day)?;
                self.ensure_session().await?;
                self.dispatcher.star(&task_id, &date, &user, starred).await?;
                let state = if starred { "unstarred" } else { "starred" };
                Ok(format!("task {task_id} {state} for {date}"))
            }
            Command::StarAll { day } => {
                let (date, user) = self.resolve_day(&day)?;
                self.ensure_session().await?;
                self.dispatcher.star_all(&date, &user).await?;
                Ok(format!("starred every done task for {date}"))
            }
            Command::Rename {
                task_id,
                original,
                new_name,
            } => self.rename(&task_id, &original, &new_name.join(" ")).await,
            Command::Login { user_id } => {
                let passcode = self
                    .settings
                    .passcode
                    .clone()
                    .context("no passcode: pass --passcode or set login.passcode")?;
                self.dispatcher.login(&user_id, &passcode).await?;
                self.settings.login_user = Some(user_id);
                self.authenticated = true;
                Ok("logged in".to_string())
            }
            Command::Logout => {
                self.dispatcher.logout().await?;
                self.authenticated = false;
                Ok("logged out".to_string())
            }
            Command::Day { date, kid } => {
                let view = DayView::parse_or_today(date.as_deref(), self.today);
                let role = if kid { Role::Kid } else { Role::Parent };
                let editable = if view.is_editable(role) {
                    "editable"
                } else {
                    "read-only"
                };
                Ok(format!("{}  [{editable}]", view.header()))
            }
            Command::Shell => Err(anyhow!("already running an interactive shell")),
        }
    }

    /// Replays a rename through the inline editor: the label enters editing
    /// with its current text, takes the new value, and commits on Enter.
    async fn rename(
        &mut self,
        task_id: &str,
        original: &str,
        new_name: &str,
    ) -> anyhow::Result<String> {
        let mut editor = InlineEditor::new(task_id);
        editor.begin(original);
        editor.input(new_name);
        let effect = editor.press(EditKey::Enter);

        if matches!(effect, EditEffect::Commit { .. }) {
            self.ensure_session().await?;
        }

        match self.dispatcher.settle_edit(effect).await {
            EditResolution::Unchanged { label } => {
                Ok(format!("task {task_id} unchanged ({label})"))
            }
            EditResolution::Renamed { label, .. } => {
                Ok(format!("task {task_id} renamed to {label}"))
            }
            EditResolution::Reverted { label, error } => Err(anyhow!(
                "rename of task {task_id} failed; keeping {label:?}: {error}"
            )),
            EditResolution::Pending => Err(anyhow!("rename of task {task_id} did not settle")),
        }
    }

    fn resolve_day(&self, day: &DayArgs) -> anyhow::Result<(String, String)> {
        // Passed through verbatim; the server validates dates.
        let date = day
            .date
            .clone()
            .unwrap_or_else(|| self.today.format(DATE_FORMAT).to_string());
        let user = day
            .user
            .clone()
            .or_else(|| self.settings.default_user.clone())
            .context("no user: pass --user or set user.id")?;
        Ok((date, user))
    }

    async fn ensure_session(&mut self) -> anyhow::Result<()> {
        if self.authenticated {
            return Ok(());
        }
        let (Some(user_id), Some(passcode)) = (
            self.settings.login_user.clone(),
            self.settings.passcode.clone(),
        ) else {
            debug!("no login configured; relying on server session");
            return Ok(());
        };
        self.dispatcher
            .login(&user_id, &passcode)
            .await
            .context("login before mutation failed")?;
        self.authenticated = true;
        Ok(())
    }
}
