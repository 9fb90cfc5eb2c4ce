//! Catalog query façade: the displayed item list, filtering and item actions.
//!
//! The catalog never patches its lists locally. Every successful mutation is
//! followed by a full reload and the active filter is applied again, so the
//! lists always reflect what the backend last returned.

use crate::api::{ApiClient, ApiError};
use crate::error::{ClientError, ClientResult};
use crate::events::{Listeners, SubscriptionId};
use crate::session::SessionManager;
use crate::types::{Filter, Sweet, SweetCreate, SweetUpdate};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, error, info, warn};

const LOAD_FAILED: &str = "Failed to load sweets. Please try again.";
const GET_FAILED: &str = "Failed to load sweet. Please try again.";

/// A mutating catalog action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Purchase,
    Restock,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Message shown when the backend rejects the action without a detail
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::Purchase => "Purchase failed. Please try again.",
            Self::Restock => "Restock failed. Please try again.",
            Self::Create | Self::Update => "Failed to save sweet. Please try again.",
            Self::Delete => "Failed to delete sweet. Please try again.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Purchase => "purchase",
            Self::Restock => "restock",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Catalog notifications
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Loaded { count: usize },
    LoadFailed { message: String },
    Filtered { count: usize },
    /// Search failed and the unfiltered list is shown instead
    SearchDegraded { message: String },
    Mutated { action: Action, id: Option<i64> },
}

/// Snapshot of the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Items as last returned by `GET /sweets`
    pub canonical: Vec<Sweet>,
    /// Items currently shown, after filtering
    pub displayed: Vec<Sweet>,
    pub filter: Filter,
    pub loading: bool,
    /// A mutation or its reconciliation is in flight
    pub pending: bool,
    /// Last user-visible load error
    pub error: Option<String>,
}

/// Controls available for one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemActions {
    pub purchase: bool,
    pub edit: bool,
    pub delete: bool,
    pub restock: bool,
}

impl ItemActions {
    pub fn for_item(item: &Sweet, is_admin: bool, pending: bool) -> Self {
        let admin = is_admin && !pending;
        Self {
            purchase: !item.is_out_of_stock() && !pending,
            edit: admin,
            delete: admin,
            restock: admin,
        }
    }
}

/// Holds the action lock and clears the pending flag when dropped
struct ActionGuard<'a> {
    _lock: MutexGuard<'a, ()>,
    pending: &'a AtomicBool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.pending.store(false, Ordering::SeqCst);
    }
}

pub struct Catalog {
    api: ApiClient,
    session: Arc<SessionManager>,
    state: RwLock<CatalogState>,
    action_lock: Mutex<()>,
    pending: AtomicBool,
    listeners: Listeners<CatalogEvent>,
}

impl Catalog {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(CatalogState::default()),
            action_lock: Mutex::new(()),
            pending: AtomicBool::new(false),
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CatalogEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub async fn state(&self) -> CatalogState {
        let mut state = self.state.read().await.clone();
        state.pending = self.is_pending();
        state
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Fetch every item, replacing both the canonical and displayed lists.
    ///
    /// On failure the previous lists are kept and the error message is
    /// recorded in the state.
    pub async fn load_all(&self) -> ClientResult<Vec<Sweet>> {
        self.state.write().await.loading = true;

        let config = self.session.request_config().await;
        let result = self.api.list_sweets(&config).await;

        let mut state = self.state.write().await;
        state.loading = false;

        match result {
            Ok(items) => {
                state.canonical = items.clone();
                state.displayed = items.clone();
                state.error = None;
                drop(state);

                debug!(count = items.len(), "Catalog loaded");
                self.listeners.emit(&CatalogEvent::Loaded { count: items.len() });
                Ok(items)
            }
            Err(e) => {
                state.error = Some(LOAD_FAILED.to_string());
                drop(state);

                error!(error = %e, "Failed to load sweets");
                self.listeners.emit(&CatalogEvent::LoadFailed {
                    message: LOAD_FAILED.to_string(),
                });
                Err(ClientError::fetch(LOAD_FAILED))
            }
        }
    }

    /// Narrow `canonical` by `filter` through the backend search.
    ///
    /// An empty filter returns `canonical` without a request. A failed search
    /// also returns `canonical`.
    pub async fn apply_filter(&self, canonical: &[Sweet], filter: &Filter) -> Vec<Sweet> {
        let params = filter.to_search_params();
        if params.is_empty() {
            return canonical.to_vec();
        }

        let config = self.session.request_config().await;
        match self.api.search_sweets(&config, &params).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Search failed, showing all sweets");
                self.listeners.emit(&CatalogEvent::SearchDegraded {
                    message: e.to_string(),
                });
                canonical.to_vec()
            }
        }
    }

    /// Make `filter` the active filter and refresh the displayed list
    pub async fn set_filter(&self, filter: Filter) -> Vec<Sweet> {
        let canonical = {
            let mut state = self.state.write().await;
            state.filter = filter.clone();
            state.canonical.clone()
        };

        let displayed = self.apply_filter(&canonical, &filter).await;

        {
            let mut state = self.state.write().await;
            // A newer filter won the race; its own call updates the display.
            if state.filter != filter {
                return displayed;
            }
            state.displayed = displayed.clone();
        }

        self.listeners.emit(&CatalogEvent::Filtered {
            count: displayed.len(),
        });
        displayed
    }

    /// Reload the catalog and apply the active filter again
    pub async fn refresh(&self) -> ClientResult<Vec<Sweet>> {
        let canonical = self.load_all().await?;
        let filter = self.state.read().await.filter.clone();
        if filter.is_empty() {
            return Ok(canonical);
        }
        Ok(self.set_filter(filter).await)
    }

    /// Fetch one item
    pub async fn get(&self, id: i64) -> ClientResult<Sweet> {
        let config = self.session.request_config().await;
        self.api.get_sweet(&config, id).await.map_err(|e| {
            warn!(id, error = %e, "Failed to load sweet");
            ClientError::fetch(e.detail().unwrap_or(GET_FAILED))
        })
    }

    /// Controls enabled for `item` given the caller's admin capability
    pub fn actions_for(&self, item: &Sweet, is_admin: bool) -> ItemActions {
        ItemActions::for_item(item, is_admin, self.is_pending())
    }

    async fn known_item(&self, id: i64) -> Option<Sweet> {
        let state = self.state.read().await;
        state.canonical.iter().find(|item| item.id == id).cloned()
    }

    fn begin_action(&self) -> ClientResult<ActionGuard<'_>> {
        let lock = self
            .action_lock
            .try_lock()
            .map_err(|_| ClientError::ActionPending)?;
        self.pending.store(true, Ordering::SeqCst);
        Ok(ActionGuard {
            _lock: lock,
            pending: &self.pending,
        })
    }

    /// Map the mutation outcome and reconcile on success.
    ///
    /// Must be called while the action guard is still held.
    async fn finish_action<T>(
        &self,
        action: Action,
        id: Option<i64>,
        result: Result<T, ApiError>,
    ) -> ClientResult<T> {
        let value = result.map_err(|e| {
            warn!(%action, ?id, error = %e, "Catalog action rejected");
            ClientError::mutation(e.detail().unwrap_or(action.fallback_message()))
        })?;

        info!(%action, ?id, "Catalog action succeeded");

        if let Err(e) = self.refresh().await {
            warn!(%action, error = %e, "Reload after catalog action failed");
        }

        self.listeners.emit(&CatalogEvent::Mutated { action, id });
        Ok(value)
    }

    /// Buy `quantity` units of an item
    pub async fn purchase(&self, id: i64, quantity: u32) -> ClientResult<Sweet> {
        if quantity == 0 {
            return Err(ClientError::InvalidQuantity);
        }
        if let Some(item) = self.known_item(id).await {
            if item.is_out_of_stock() {
                return Err(ClientError::OutOfStock { id });
            }
        }

        let _guard = self.begin_action()?;
        let config = self.session.request_config().await;
        let result = self.api.purchase_sweet(&config, id, quantity).await;
        self.finish_action(Action::Purchase, Some(id), result).await
    }

    /// Add `quantity` units to an item's stock
    pub async fn restock(&self, id: i64, quantity: u32) -> ClientResult<Sweet> {
        if quantity == 0 {
            return Err(ClientError::InvalidQuantity);
        }

        let _guard = self.begin_action()?;
        let config = self.session.request_config().await;
        let result = self.api.restock_sweet(&config, id, quantity).await;
        self.finish_action(Action::Restock, Some(id), result).await
    }

    pub async fn create(&self, item: SweetCreate) -> ClientResult<Sweet> {
        item.validate().map_err(ClientError::mutation)?;

        let _guard = self.begin_action()?;
        let config = self.session.request_config().await;
        let result = self.api.create_sweet(&config, &item).await;
        let created = self.finish_action(Action::Create, None, result).await?;
        debug!(id = created.id, "Sweet created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, patch: SweetUpdate) -> ClientResult<Sweet> {
        validate_patch(&patch).map_err(ClientError::mutation)?;

        let _guard = self.begin_action()?;
        let config = self.session.request_config().await;
        let result = self.api.update_sweet(&config, id, &patch).await;
        self.finish_action(Action::Update, Some(id), result).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let _guard = self.begin_action()?;
        let config = self.session.request_config().await;
        let result = self.api.delete_sweet(&config, id).await;
        self.finish_action(Action::Delete, Some(id), result).await
    }
}

fn validate_patch(patch: &SweetUpdate) -> Result<(), String> {
    if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err("Name is required".to_string());
    }
    if patch
        .category
        .as_deref()
        .is_some_and(|category| category.trim().is_empty())
    {
        return Err("Category is required".to_string());
    }
    if patch
        .price
        .is_some_and(|price| !price.is_finite() || price <= 0.0)
    {
        return Err("Price must be greater than 0".to_string());
    }
    Ok(())
}
