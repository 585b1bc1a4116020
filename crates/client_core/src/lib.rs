//! View-model for the library admin screens.
//!
//! Each screen is a [`ResourceScreen`] over one [`Resource`] and one
//! [`CrudGateway`]. [`AdminConsole`] wires the users and catalog screens to
//! the REST API described by a [`ClientConfig`].

pub mod config;
pub mod error;
pub mod gateway;
pub mod screen;
pub mod search;
pub mod session;
pub mod store;

pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{ConfigError, GatewayError};
pub use gateway::{CrudGateway, HttpGateway};
pub use screen::{confirm_prompt, Action, Notice, ResourceScreen, ScreenStatus};
pub use search::SearchController;
pub use session::{EditMode, EditSession, Submitted};
pub use shared::resource::{Books, Resource, Users};
pub use store::ResourceStore;

pub type UsersScreen = ResourceScreen<Users, HttpGateway<Users>>;
pub type CatalogScreen = ResourceScreen<Books, HttpGateway<Books>>;

/// The two admin screens. They share an HTTP connection pool and nothing else.
pub struct AdminConsole {
    pub users: UsersScreen,
    pub catalog: CatalogScreen,
}

impl AdminConsole {
    pub fn connect(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = config.http_client()?;
        Ok(Self {
            users: ResourceScreen::new(HttpGateway::new(http.clone(), config)),
            catalog: ResourceScreen::new(HttpGateway::new(http, config)),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing;
