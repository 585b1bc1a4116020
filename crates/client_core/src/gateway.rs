use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    protocol::{collection_route, member_route},
    resource::Resource,
};
use tracing::{debug, warn};

use crate::{config::ClientConfig, error::GatewayError};

/// The four collection intents plus single-record fetch, over one resource.
///
/// Implementations hold no state between calls. `create` and `update` reject
/// drafts failing [`Resource::validate`] before any I/O.
#[async_trait]
pub trait CrudGateway<R: Resource>: Send + Sync {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<R::Item>, GatewayError>;
    async fn get(&self, id: R::Id) -> Result<R::Item, GatewayError>;
    async fn create(&self, draft: &R::Draft) -> Result<R::Item, GatewayError>;
    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<R::Item, GatewayError>;
    async fn delete(&self, id: R::Id) -> Result<(), GatewayError>;
}

/// [`CrudGateway`] over the REST collection `<api>/<collection>/`.
pub struct HttpGateway<R> {
    http: Client,
    api_base: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpGateway<R> {
    pub fn new(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            api_base: config.api_base().to_string(),
            _resource: PhantomData,
        }
    }

    pub fn collection_url(&self) -> String {
        format!("{}{}", self.api_base, collection_route(R::COLLECTION))
    }

    fn member_url(&self, id: R::Id) -> String {
        format!("{}{}", self.api_base, member_route(R::COLLECTION, id))
    }
}

impl<R> Clone for HttpGateway<R> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R: Resource> CrudGateway<R> for HttpGateway<R> {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<R::Item>, GatewayError> {
        let mut request = self.http.get(self.collection_url());
        if let Some(term) = filter.filter(|term| !term.is_empty()) {
            request = request.query(&[("search", term)]);
        }
        debug!(resource = R::SINGULAR, filter = ?filter, "list");
        let response = checked::<R>(request.send().await?, "list").await?;
        Ok(response.json().await?)
    }

    async fn get(&self, id: R::Id) -> Result<R::Item, GatewayError> {
        debug!(resource = R::SINGULAR, %id, "get");
        let response = self.http.get(self.member_url(id)).send().await?;
        let response = checked::<R>(response, "get").await?;
        Ok(response.json().await?)
    }

    async fn create(&self, draft: &R::Draft) -> Result<R::Item, GatewayError> {
        R::validate(draft)?;
        debug!(resource = R::SINGULAR, "create");
        let response = checked::<R>(
            self.http
                .post(self.collection_url())
                .json(draft)
                .send()
                .await?,
            "create",
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: R::Id, draft: &R::Draft) -> Result<R::Item, GatewayError> {
        R::validate(draft)?;
        debug!(resource = R::SINGULAR, %id, "update");
        let record = R::with_id(id, draft.clone());
        let response = checked::<R>(
            self.http
                .put(self.member_url(id))
                .json(&record)
                .send()
                .await?,
            "update",
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: R::Id) -> Result<(), GatewayError> {
        debug!(resource = R::SINGULAR, %id, "delete");
        let response = self.http.delete(self.member_url(id)).send().await?;
        checked::<R>(response, "delete").await?;
        Ok(())
    }
}

/// Passes 2xx responses through; turns anything else into `Transport`,
/// keeping the server's `message` (or `error`) field when the body has one.
async fn checked<R: Resource>(response: Response, op: &str) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let server_message = server_message(&body);
    warn!(
        resource = R::SINGULAR,
        op,
        status = status.as_u16(),
        server_message = server_message.as_deref().unwrap_or(""),
        "request rejected"
    );
    Err(GatewayError::transport(
        Some(status.as_u16()),
        server_message.clone(),
        match server_message {
            Some(message) => format!("{op} {} failed with {status}: {message}", R::SINGULAR),
            None => format!("{op} {} failed with {status}", R::SINGULAR),
        },
    ))
}

fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key)?.as_str().map(str::to_string))
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
