use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use super::dto::{Recipe, RecipeDraft, RecipePatch};
use crate::error::PlannerError;
use crate::gateway::ApiGateway;

/// Cached recipes. Cloning shares the cache.
#[derive(Clone)]
pub struct RecipeStore {
    gateway: Arc<dyn ApiGateway>,
    cache: Arc<RwLock<Vec<Recipe>>>,
}

impl RecipeStore {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        Self {
            gateway,
            cache: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn list(&self) -> Vec<Recipe> {
        self.cache.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Recipe> {
        self.cache.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn ids(&self) -> Vec<String> {
        self.cache.read().await.iter().map(|r| r.id.clone()).collect()
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, PlannerError> {
        let recipes = self.gateway.list_recipes().await.map_err(|e| {
            error!(error = %e, "loading recipes failed");
            e
        })?;
        let count = recipes.len();
        *self.cache.write().await = recipes;
        debug!(count, "recipes refreshed");
        Ok(count)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, PlannerError> {
        let recipe = self.gateway.create_recipe(draft).await.map_err(|e| {
            error!(error = %e, "creating recipe failed");
            e
        })?;
        info!(recipe_id = %recipe.id, "recipe created");
        self.refresh().await?;
        Ok(recipe)
    }

    /// Changes only the fields set in `patch`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, PlannerError> {
        let recipe = self.gateway.update_recipe(id, patch).await.map_err(|e| {
            error!(error = %e, recipe_id = %id, "updating recipe failed");
            e
        })?;
        info!(recipe_id = %id, "recipe updated");
        self.refresh().await?;
        Ok(recipe)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), PlannerError> {
        self.gateway.delete_recipe(id).await.map_err(|e| {
            error!(error = %e, recipe_id = %id, "deleting recipe failed");
            e
        })?;
        info!(recipe_id = %id, "recipe deleted");
        self.refresh().await?;
        Ok(())
    }
}

#[cfg(test)]
mod recipe_store_tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::InMemoryGateway;
    use crate::meals::dto::Ingredient;

    fn store() -> (Arc<InMemoryGateway>, RecipeStore) {
        let gw = Arc::new(InMemoryGateway::new());
        let store = RecipeStore::new(gw.clone());
        (gw, store)
    }

    #[tokio::test]
    async fn created_recipe_keeps_its_ingredients() {
        let (_, store) = store();
        let mut draft = RecipeDraft::named("Scrambled eggs");
        draft.ingredients = vec![Ingredient::new("Eggs", 2.0, "pcs")];

        let created = store.create(&draft).await.expect("create");

        let listed = store.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].ingredients, vec![Ingredient::new("Eggs", 2.0, "pcs")]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cache() {
        let (gw, store) = store();
        store.create(&RecipeDraft::named("Toast")).await.expect("create");

        gw.fail_next(GatewayError::Transport("offline".into())).await;
        assert!(store.refresh().await.is_err());
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_create_leaves_cache_untouched() {
        let (gw, store) = store();
        gw.fail_next(GatewayError::Api {
            status: 422,
            detail: Some("name required".into()),
        })
        .await;
        assert!(store.create(&RecipeDraft::default()).await.is_err());
        assert!(store.list().await.is_empty());
        assert_eq!(gw.calls(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_patched_fields() {
        let (_, store) = store();
        let mut draft = RecipeDraft::named("Pancakes");
        draft.ingredients = vec![Ingredient::new("Flour", 200.0, "g")];
        let created = store.create(&draft).await.expect("create");

        store
            .update(
                &created.id,
                &RecipePatch {
                    servings: Some(2),
                    category: Some("breakfast".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update");

        let cached = store.get(&created.id).await.expect("cached");
        assert_eq!(cached.name, "Pancakes");
        assert_eq!(cached.servings, 2);
        assert_eq!(cached.category.as_deref(), Some("breakfast"));
        assert_eq!(cached.ingredients, vec![Ingredient::new("Flour", 200.0, "g")]);
    }

    #[tokio::test]
    async fn update_of_unknown_recipe_is_not_found() {
        let (gw, store) = store();
        let kept = store.create(&RecipeDraft::named("Toast")).await.expect("create");

        let err = store
            .update("ghost", &RecipePatch {
                name: Some("Renamed".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Gateway(GatewayError::Api { status: 404, ref detail })
                if detail.as_deref() == Some("Recipe not found")
        ));
        assert_eq!(store.list().await, vec![kept]);
        assert_eq!(gw.calls(), 3);
    }

    #[tokio::test]
    async fn delete_removes_from_cache() {
        let (_, store) = store();
        let keep = store.create(&RecipeDraft::named("Keep")).await.expect("create");
        let drop = store.create(&RecipeDraft::named("Drop")).await.expect("create");

        store.delete(&drop.id).await.expect("delete");

        assert_eq!(store.ids().await, vec![keep.id.clone()]);
        assert!(store.get(&drop.id).await.is_none());
        assert!(store.get(&keep.id).await.is_some());
    }
}
