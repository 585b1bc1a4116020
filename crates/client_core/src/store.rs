use shared::resource::Resource;

use crate::{error::GatewayError, gateway::CrudGateway};

/// Snapshot of the last successful `list` for one resource.
///
/// Contents are only ever replaced wholesale; there is no per-item mutation.
pub struct ResourceStore<R: Resource> {
    items: Vec<R::Item>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[R::Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: R::Id) -> Option<&R::Item> {
        self.items.iter().find(|item| R::id(item) == id)
    }

    pub fn contains(&self, id: R::Id) -> bool {
        self.find(id).is_some()
    }

    pub fn replace(&mut self, items: Vec<R::Item>) {
        self.items = items;
    }

    /// Lists through `gateway` and replaces the snapshot. On failure the
    /// previous snapshot is kept.
    pub async fn refresh<G>(&mut self, gateway: &G, filter: Option<&str>) -> Result<(), GatewayError>
    where
        G: CrudGateway<R> + ?Sized,
    {
        let items = gateway.list(filter).await?;
        self.replace(items);
        Ok(())
    }
}

impl<R: Resource> Default for ResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
