use shared::resource::Resource;
use tracing::debug;

use crate::{error::GatewayError, gateway::CrudGateway};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode<'a, T> {
    Creating,
    Editing(&'a T),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted<T> {
    Created(T),
    Updated(T),
}

impl<T> Submitted<T> {
    pub fn item(&self) -> &T {
        match self {
            Self::Created(item) | Self::Updated(item) => item,
        }
    }
}

/// Form state of one screen: which record, if any, is being edited, and the
/// working values typed so far.
///
/// `Creating` is the initial state. A failed submit changes nothing, so the
/// operator can correct the form and retry.
pub struct EditSession<R: Resource> {
    editing: Option<R::Item>,
    working: R::Draft,
}

impl<R: Resource> EditSession<R> {
    pub fn new() -> Self {
        Self {
            editing: None,
            working: R::Draft::default(),
        }
    }

    pub fn mode(&self) -> EditMode<'_, R::Item> {
        match &self.editing {
            Some(item) => EditMode::Editing(item),
            None => EditMode::Creating,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn working(&self) -> &R::Draft {
        &self.working
    }

    pub fn working_mut(&mut self) -> &mut R::Draft {
        &mut self.working
    }

    pub fn begin_edit(&mut self, item: R::Item) {
        debug!(resource = R::SINGULAR, id = %R::id(&item), "begin edit");
        self.working = R::draft_of(&item);
        self.editing = Some(item);
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Updates the bound record when editing, creates otherwise, and returns
    /// to `Creating` with empty working values on success.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<Submitted<R::Item>, GatewayError>
    where
        G: CrudGateway<R> + ?Sized,
    {
        R::validate(&self.working)?;
        let payload = R::prepare(self.working.clone());
        let submitted = match &self.editing {
            Some(item) => Submitted::Updated(gateway.update(R::id(item), &payload).await?),
            None => Submitted::Created(gateway.create(&payload).await?),
        };
        self.reset();
        Ok(submitted)
    }

    fn reset(&mut self) {
        self.editing = None;
        self.working = R::Draft::default();
    }
}

impl<R: Resource> Default for EditSession<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
