//! Client for the Sweet Shop REST backend
//!
//! This crate provides the client-side state of the Sweet Shop: who is logged
//! in and which catalog items are shown. It supports:
//!
//! - Token-based login, registration and logout with durable sessions
//! - Profile loading with a degraded fallback to the token's own claims
//! - Catalog listing, backend-side filtering and admin item management
//! - Listener registries notified after every state change
//!
//! Every request carries an explicit [`RequestConfig`] snapshot of the
//! session; there is no shared credential header.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sweetshop_client::{ClientConfig, Filter, InMemorySessionStore, SweetShopClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SweetShopClient::new(
//!         ClientConfig::new("http://localhost:8000/api"),
//!         Arc::new(InMemorySessionStore::new()),
//!     )?;
//!
//!     client.session.login("alice", "secret").await?;
//!     client.catalog.load_all().await?;
//!
//!     let cakes = client.catalog.set_filter(Filter::by_category("cake")).await;
//!     println!("{} cakes", cakes.len());
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod store;
pub mod token;
pub mod types;

pub use api::{ApiClient, ApiError, RequestConfig};
pub use catalog::{Action, Catalog, CatalogEvent, CatalogState, ItemActions};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use events::SubscriptionId;
pub use session::{SessionEvent, SessionManager, SessionState};
pub use store::{FileSessionStore, InMemorySessionStore, SessionStore};
pub use types::{Filter, SearchParams, Sweet, SweetCreate, SweetUpdate, UserProfile};

/// Session manager and catalog sharing one HTTP client
pub struct SweetShopClient {
    pub session: Arc<SessionManager>,
    pub catalog: Catalog,
}

impl SweetShopClient {
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let api = ApiClient::new(&config)?;
        let session = Arc::new(
            SessionManager::new(api.clone(), store)
                .with_token_admin_claim(config.trust_token_admin_claim),
        );
        let catalog = Catalog::new(api, session.clone());

        Ok(Self { session, catalog })
    }
}
