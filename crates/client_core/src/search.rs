use std::marker::PhantomData;

use shared::resource::Resource;

use crate::{error::GatewayError, gateway::CrudGateway, store::ResourceStore};

/// Free-text query for one screen. Searches run only when triggered.
pub struct SearchController<R: Resource> {
    query: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> SearchController<R> {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            _resource: PhantomData,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query as a list filter; `None` while it is empty.
    pub fn filter(&self) -> Option<&str> {
        Some(self.query.as_str()).filter(|query| !query.is_empty())
    }

    /// Stores `query`, then replaces the store with the filtered list. The
    /// query is kept even when the list fails.
    pub async fn search<G>(
        &mut self,
        query: impl Into<String>,
        gateway: &G,
        store: &mut ResourceStore<R>,
    ) -> Result<(), GatewayError>
    where
        G: CrudGateway<R> + ?Sized,
    {
        self.query = query.into();
        store.refresh(gateway, self.filter()).await
    }

    pub async fn clear<G>(
        &mut self,
        gateway: &G,
        store: &mut ResourceStore<R>,
    ) -> Result<(), GatewayError>
    where
        G: CrudGateway<R> + ?Sized,
    {
        self.query.clear();
        store.refresh(gateway, None).await
    }
}

impl<R: Resource> Default for SearchController<R> {
    fn default() -> Self {
        Self::new()
    }
}
