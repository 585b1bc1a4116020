//! One admin screen: store, search, edit session and gateway composed behind
//! a small state machine.
//!
//! Every action moves the screen `Idle -> Loading` and back to either `Idle`
//! with a fresh snapshot or `Failed` with the previous snapshot retained.
//! Successful mutations always end in [`ResourceScreen::relist`], which
//! re-reads the collection with the current search term instead of patching
//! the store locally.

use shared::resource::Resource;
use tracing::{info, warn};

use crate::{
    error::GatewayError,
    gateway::CrudGateway,
    search::SearchController,
    session::{EditMode, EditSession, Submitted},
    store::ResourceStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    Idle,
    Loading(Action),
    /// The last action failed; the store still holds the previous snapshot.
    Failed(Action),
}

/// Message for the operator after an action, like the alerts of a web form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

pub struct ResourceScreen<R: Resource, G> {
    gateway: G,
    store: ResourceStore<R>,
    search: SearchController<R>,
    session: EditSession<R>,
    status: ScreenStatus,
    notices: Vec<Notice>,
}

impl<R, G> ResourceScreen<R, G>
where
    R: Resource,
    G: CrudGateway<R>,
{
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            store: ResourceStore::new(),
            search: SearchController::new(),
            session: EditSession::new(),
            status: ScreenStatus::Idle,
            notices: Vec::new(),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn items(&self) -> &[R::Item] {
        self.store.items()
    }

    pub fn store(&self) -> &ResourceStore<R> {
        &self.store
    }

    pub fn status(&self) -> &ScreenStatus {
        &self.status
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn mode(&self) -> EditMode<'_, R::Item> {
        self.session.mode()
    }

    pub fn working(&self) -> &R::Draft {
        self.session.working()
    }

    /// Form fields. Edits here never reach the server until [`Self::submit`].
    pub fn working_mut(&mut self) -> &mut R::Draft {
        self.session.working_mut()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Initial population when the screen is first shown.
    pub async fn mount(&mut self) -> Result<(), GatewayError> {
        self.relist().await
    }

    /// Re-reads the collection with the current search term and replaces the
    /// snapshot. This is the only path that changes the store after a
    /// mutation.
    pub async fn relist(&mut self) -> Result<(), GatewayError> {
        self.status = ScreenStatus::Loading(Action::List);
        let result = self.store.refresh(&self.gateway, self.search.filter()).await;
        self.finish_list(result)
    }

    pub async fn search(&mut self, query: impl Into<String>) -> Result<(), GatewayError> {
        self.status = ScreenStatus::Loading(Action::List);
        let result = self
            .search
            .search(query, &self.gateway, &mut self.store)
            .await;
        self.finish_list(result)
    }

    pub async fn clear_search(&mut self) -> Result<(), GatewayError> {
        self.status = ScreenStatus::Loading(Action::List);
        let result = self.search.clear(&self.gateway, &mut self.store).await;
        self.finish_list(result)
    }

    /// Binds the listed record `id` to the form. `false` if it is not in the
    /// current snapshot.
    pub fn begin_edit(&mut self, id: R::Id) -> bool {
        let Some(item) = self.store.find(id).cloned() else {
            return false;
        };
        self.session.begin_edit(item);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    /// Creates or updates from the working values, then re-lists.
    ///
    /// Once the server has accepted the change this returns `Ok`, even when
    /// the re-list fails; that failure is left in [`Self::status`] and the
    /// notices.
    pub async fn submit(&mut self) -> Result<Submitted<R::Item>, GatewayError> {
        let action = if self.session.is_editing() {
            Action::Update
        } else {
            Action::Create
        };
        self.status = ScreenStatus::Loading(action);

        let submitted = match self.session.submit(&self.gateway).await {
            Ok(submitted) => submitted,
            Err(err) => {
                self.fail(action, &err);
                return Err(err);
            }
        };

        info!(resource = R::SINGULAR, id = %R::id(submitted.item()), ?action, "saved");
        let verb = match submitted {
            Submitted::Created(_) => "added",
            Submitted::Updated(_) => "updated",
        };
        self.notices.push(Notice::Success(success_message::<R>(verb)));
        let _ = self.relist().await;
        Ok(submitted)
    }

    /// Deletes `id` once `confirm` accepts the prompt, then re-lists.
    ///
    /// Returns `Ok(false)` without any request when the prompt is declined,
    /// and `Ok(true)` once the server has deleted the record, whether or not
    /// the re-list succeeds.
    pub async fn delete<F>(&mut self, id: R::Id, confirm: F) -> Result<bool, GatewayError>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(&confirm_prompt::<R>()) {
            return Ok(false);
        }

        self.status = ScreenStatus::Loading(Action::Delete);
        if let Err(err) = self.gateway.delete(id).await {
            self.fail(Action::Delete, &err);
            return Err(err);
        }

        info!(resource = R::SINGULAR, %id, "deleted");
        self.notices
            .push(Notice::Success(success_message::<R>("deleted")));
        let _ = self.relist().await;
        Ok(true)
    }

    fn finish_list(&mut self, result: Result<(), GatewayError>) -> Result<(), GatewayError> {
        match result {
            Ok(()) => {
                self.status = ScreenStatus::Idle;
                Ok(())
            }
            Err(err) => {
                self.fail(Action::List, &err);
                Err(err)
            }
        }
    }

    fn fail(&mut self, action: Action, err: &GatewayError) {
        warn!(resource = R::SINGULAR, ?action, error = %err, "action failed");
        self.status = ScreenStatus::Failed(action);
        self.notices.push(Notice::Failure(failure_message::<R>(action, err)));
    }
}

pub fn confirm_prompt<R: Resource>() -> String {
    format!("Are you sure you want to delete this {}?", R::SINGULAR)
}

fn success_message<R: Resource>(verb: &str) -> String {
    format!("{} {verb} successfully!", R::LABEL)
}

fn failure_message<R: Resource>(action: Action, err: &GatewayError) -> String {
    if let GatewayError::Validation(validation) = err {
        return validation.to_string();
    }

    match action {
        Action::List => {
            let detail = err.server_message().map(str::to_string).unwrap_or_else(|| {
                format!("Failed to fetch {}. Is the backend running?", R::COLLECTION)
            });
            format!("Error: {detail}")
        }
        Action::Create | Action::Update | Action::Delete => {
            if let Some(message) = err.server_message() {
                return message.to_string();
            }
            let verb = match action {
                Action::Create => "add",
                Action::Update => "update",
                _ => "delete",
            };
            format!("Failed to {verb} {}. Please try again.", R::SINGULAR)
        }
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
