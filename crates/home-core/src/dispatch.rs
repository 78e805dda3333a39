use anyhow::{Context, anyhow};
use home_shared::mutation::LOGOUT_PATH;
use home_shared::{
    EditEffect, Modifiers, Mutation, NavigationFeedback, NavigationIntent, OverlayFlag,
};
use tracing::{debug, info, warn};

use crate::transport::{DispatchOutcome, Transport};

/// How an inline edit settled once its final effect was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditResolution {
    /// The edit is still open.
    Pending,
    /// Nothing changed; the label keeps its text.
    Unchanged { label: String },
    Renamed {
        label: String,
        outcome: DispatchOutcome,
    },
    /// The rename failed and the label went back to its original text.
    Reverted { label: String, error: String },
}

/// Sends mutations through a [`Transport`], raising the loading overlay for
/// the duration of each round trip.
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: T,
    feedback: NavigationFeedback<OverlayFlag>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            feedback: NavigationFeedback::new(Some(OverlayFlag::default())),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn overlay_visible(&self) -> bool {
        self.feedback.is_visible()
    }

    #[tracing::instrument(skip(self, mutation), fields(action = mutation.name()))]
    pub async fn dispatch(&mut self, mutation: &Mutation) -> anyhow::Result<DispatchOutcome> {
        let form = mutation.to_form();
        self.feedback
            .on_intent(&NavigationIntent::submit(form.action.clone()));

        let result = self.transport.submit(&form).await;
        self.feedback.settle();

        let outcome = result.with_context(|| format!("failed submitting {}", form.action))?;
        if !outcome.is_success() {
            return Err(anyhow!(
                "{} rejected with HTTP {}",
                outcome.endpoint,
                outcome.status
            ));
        }

        info!(
            endpoint = %outcome.endpoint,
            status = outcome.status,
            location = ?outcome.location,
            "mutation accepted"
        );
        Ok(outcome)
    }

    pub async fn mark(
        &mut self,
        task_id: &str,
        date: &str,
        user_id: &str,
        completed: bool,
    ) -> anyhow::Result<DispatchOutcome> {
        self.dispatch(&Mutation::mark(task_id, date, user_id, completed))
            .await
    }

    pub async fn star(
        &mut self,
        task_id: &str,
        date: &str,
        user_id: &str,
        currently_starred: bool,
    ) -> anyhow::Result<DispatchOutcome> {
        self.dispatch(&Mutation::star(task_id, date, user_id, currently_starred))
            .await
    }

    pub async fn star_all(&mut self, date: &str, user_id: &str) -> anyhow::Result<DispatchOutcome> {
        self.dispatch(&Mutation::star_all(date, user_id)).await
    }

    pub async fn edit_task(
        &mut self,
        task_id: &str,
        new_name: &str,
    ) -> anyhow::Result<DispatchOutcome> {
        self.dispatch(&Mutation::edit_task(task_id, new_name)).await
    }

    /// A correct passcode is answered with a redirect; a wrong one re-renders
    /// the login page.
    #[tracing::instrument(skip(self, passcode))]
    pub async fn login(&mut self, user_id: &str, passcode: &str) -> anyhow::Result<DispatchOutcome> {
        let outcome = self.dispatch(&Mutation::login(user_id, passcode)).await?;
        if !outcome.is_redirect() {
            return Err(anyhow!("passcode rejected for user {user_id}"));
        }
        Ok(outcome)
    }

    #[tracing::instrument(skip(self))]
    pub async fn logout(&mut self) -> anyhow::Result<DispatchOutcome> {
        self.feedback
            .on_intent(&NavigationIntent::link(LOGOUT_PATH, Modifiers::none()));
        let result = self.transport.navigate(LOGOUT_PATH).await;
        self.feedback.settle();

        let outcome = result.context("failed navigating to logout")?;
        info!(status = outcome.status, "logged out");
        Ok(outcome)
    }

    /// Carries out the terminal effects of an inline edit. A failed rename
    /// restores the original label.
    pub async fn settle_edit(&mut self, effect: EditEffect) -> EditResolution {
        match effect {
            EditEffect::None | EditEffect::Focus | EditEffect::Blur => EditResolution::Pending,
            EditEffect::Restore { text } => {
                debug!(label = %text, "edit left unchanged");
                EditResolution::Unchanged { label: text }
            }
            EditEffect::Commit { mutation, original } => {
                let label = match &mutation {
                    Mutation::EditTask { new_name, .. } => new_name.clone(),
                    _ => original.clone(),
                };
                match self.dispatch(&mutation).await {
                    Ok(outcome) => EditResolution::Renamed { label, outcome },
                    Err(err) => {
                        warn!(error = %err, "rename failed; restoring original label");
                        EditResolution::Reverted {
                            label: original,
                            error: format!("{err:#}"),
                        }
                    }
                }
            }
        }
    }
}
