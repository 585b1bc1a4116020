//! In-memory gateway for view-model tests.

use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::{Book, BookId, User, UserId},
    resource::{Books, Resource, Users},
};

use crate::{error::GatewayError, gateway::CrudGateway};

pub(crate) trait FakeResource: Resource {
    fn make_id(n: i64) -> Self::Id;
    fn matches(item: &Self::Item, term: &str) -> bool;
}

impl FakeResource for Users {
    fn make_id(n: i64) -> UserId {
        UserId(n)
    }

    fn matches(item: &User, term: &str) -> bool {
        let term = term.to_lowercase();
        item.name.to_lowercase().contains(&term) || item.email.to_lowercase().contains(&term)
    }
}

impl FakeResource for Books {
    fn make_id(n: i64) -> BookId {
        BookId(n)
    }

    fn matches(item: &Book, term: &str) -> bool {
        let term = term.to_lowercase();
        [&item.title, &item.author, &item.isbn]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List(Option<String>),
    Get,
    Create,
    Update,
    Delete,
}

struct FakeState<R: Resource> {
    items: Vec<R::Item>,
    next_id: i64,
    calls: Vec<Call>,
    failure: Option<Option<String>>,
    lists_fail: bool,
}

pub(crate) struct FakeGateway<R: Resource> {
    state: Mutex<FakeState<R>>,
}

impl<R: FakeResource> FakeGateway<R> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                items: Vec::new(),
                next_id: 1,
                calls: Vec::new(),
                failure: None,
                lists_fail: false,
            }),
        }
    }

    pub(crate) fn seeded(drafts: Vec<R::Draft>) -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.state.lock().expect("lock");
            for draft in drafts {
                let id = R::make_id(state.next_id);
                state.next_id += 1;
                state.items.push(R::with_id(id, draft));
            }
        }
        gateway
    }

    /// Every later call fails as a 500 carrying `server_message`.
    pub(crate) fn fail_calls(&self, server_message: Option<&str>) {
        self.state.lock().expect("lock").failure = Some(server_message.map(str::to_string));
    }

    /// Only `list` fails from now on; mutations still succeed.
    pub(crate) fn fail_lists(&self) {
        self.state.lock().expect("lock").lists_fail = true;
    }

    pub(crate) fn recover(&self) {
        let mut state = self.state.lock().expect("lock");
        state.failure = None;
        state.lists_fail = false;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().expect("lock").calls.clone()
    }

    pub(crate) fn server_items(&self) -> Vec<R::Item> {
        self.state.lock().expect("lock").items.clone()
    }

    fn record(&self, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState<R>>, GatewayError> {
        let mut state = self.state.lock().expect("lock");
        let list_down = state.lists_fail && matches!(call, Call::List(_));
        state.calls.push(call);
        if list_down {
            return Err(GatewayError::transport(Some(500), None, "fake list failure"));
        }
        if let Some(message) = state.failure.clone() {
            return Err(GatewayError::transport(
                Some(500),
                message,
                "fake gateway failure",
            ));
        }
        Ok(state)
    }
}

fn not_found() -> GatewayError {
    GatewayError::transport(Some(404), Some("Not found".into()), "missing")
}

#[async_trait]
impl<R: FakeResource> CrudGateway<R> for FakeGateway<R> {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<R::Item>, GatewayError> {
        let state = self.record(Call::List(filter.map(str::to_string)))?;
        Ok(state
            .items
            .iter()
            .filter(|item| filter.map_or(true, |term| R::matches(item, term)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: R::Id) -> Result<R::Item, GatewayError> {
        let state = self.record(Call::Get)?;
        state
            .items
            .iter()
            .find(|item| R::id(item) == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Item, GatewayError> {
        R::validate(draft)?;
        let mut state = self.record(Call::Create)?;
        let id = R::make_id(state.next_id);
        state.next_id += 1;
        let item = R::with_id(id, draft.clone());
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<R::Item, GatewayError> {
        R::validate(draft)?;
        let mut state = self.record(Call::Update)?;
        let slot = state
            .items
            .iter_mut()
            .find(|item| R::id(item) == id)
            .ok_or_else(not_found)?;
        *slot = R::with_id(id, draft.clone());
        Ok(slot.clone())
    }

    async fn delete(&self, id: R::Id) -> Result<(), GatewayError> {
        let mut state = self.record(Call::Delete)?;
        let before = state.items.len();
        state.items.retain(|item| R::id(item) != id);
        if state.items.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
