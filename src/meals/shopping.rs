use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use super::dto::{ShoppingItemPatch, ShoppingListItem};
use crate::error::PlannerError;
use crate::gateway::ApiGateway;

/// Cached shopping list, purchased items included.
#[derive(Clone)]
pub struct ShoppingListStore {
    gateway: Arc<dyn ApiGateway>,
    cache: Arc<RwLock<Vec<ShoppingListItem>>>,
}

impl ShoppingListStore {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            cache: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn list(&self) -> Vec<ShoppingListItem> {
        self.cache.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<ShoppingListItem> {
        self.cache.read().await.iter().find(|i| i.id == id).cloned()
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, PlannerError> {
        let items = self.gateway.list_shopping_list(true).await.map_err(|e| {
            error!(error = %e, "loading shopping list failed");
            e
        })?;
        let count = items.len();
        *self.cache.write().await = items;
        debug!(count, "shopping list refreshed");
        Ok(count)
    }

    /// Sends `!current_purchased` for the item, then reloads the list.
    ///
    /// The target state is derived from the caller's view of the item, so two
    /// toggles fired from the same stale state both send the same value.
    #[instrument(skip(self))]
    pub async fn toggle(&self, item_id: &str, current_purchased: bool) -> Result<(), PlannerError> {
        let patch = ShoppingItemPatch {
            is_purchased: !current_purchased,
        };
        self.gateway
            .update_shopping_item(item_id, &patch)
            .await
            .map_err(|e| {
                error!(error = %e, %item_id, "updating shopping item failed");
                e
            })?;
        info!(%item_id, is_purchased = patch.is_purchased, "shopping item toggled");
        self.refresh().await?;
        Ok(())
    }

    /// Adds one item per ingredient of the plan's recipe.
    #[instrument(skip(self))]
    pub async fn add_from_meal_plan(&self, plan_id: &str) -> Result<usize, PlannerError> {
        let added = self
            .gateway
            .shopping_list_from_meal_plan(plan_id)
            .await
            .map_err(|e| {
                error!(error = %e, %plan_id, "adding plan ingredients failed");
                e
            })?;
        info!(%plan_id, added = added.items.len(), "shopping items added from plan");
        self.refresh().await?;
        Ok(added.items.len())
    }
}
