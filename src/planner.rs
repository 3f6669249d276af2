use std::sync::Arc;

use time::Date;
use tracing::{info, instrument, warn};

use crate::error::PlannerError;
use crate::gateway::ApiGateway;
use crate::meals::dto::Recipe;
use crate::meals::{
    GeneratedWeek, MealPlanStore, RecipeStore, ShoppingListStore, WeekView, WeeklyPlanGenerator,
};
use crate::view::{Action, Notice, PlannerView};

/// The three caches, shareable with background tasks.
#[derive(Clone)]
pub struct PlannerStores {
    pub recipes: RecipeStore,
    pub plans: MealPlanStore,
    pub shopping: ShoppingListStore,
}

impl PlannerStores {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        let recipes = RecipeStore::new(gateway.clone());
        let plans = MealPlanStore::new(gateway.clone(), recipes.clone());
        let shopping = ShoppingListStore::new(gateway);
        Self {
            recipes,
            plans,
            shopping,
        }
    }

    /// Reloads every cache; a failing one does not stop the others.
    pub async fn refresh_all(&self) -> Result<(), PlannerError> {
        let (recipes, plans, shopping) = tokio::join!(
            self.recipes.refresh(),
            self.plans.refresh(),
            self.shopping.refresh()
        );
        recipes?;
        plans?;
        shopping?;
        Ok(())
    }
}

/// One planner session: the caches plus the view state driving them.
pub struct Planner {
    stores: PlannerStores,
    generator: WeeklyPlanGenerator,
    view: PlannerView,
}

impl Planner {
    pub fn new(gateway: Arc<dyn ApiGateway>) -> Self {
        let stores = PlannerStores::new(gateway.clone());
        let generator = WeeklyPlanGenerator::new(gateway, stores.plans.clone());
        Self {
            stores,
            generator,
            view: PlannerView::default(),
        }
    }

    pub fn stores(&self) -> &PlannerStores {
        &self.stores
    }

    pub fn view(&self) -> &PlannerView {
        &self.view
    }

    pub fn dispatch(&mut self, action: Action) {
        self.view = std::mem::take(&mut self.view).reduce(action);
    }

    pub async fn load(&self) -> Result<(), PlannerError> {
        self.stores.refresh_all().await
    }

    pub async fn week(&self, start: Date) -> WeekView {
        self.stores.plans.week(start).await
    }

    /// Creates a recipe from the current draft; the form resets on success.
    pub async fn submit_recipe(&mut self) -> Result<Recipe, PlannerError> {
        let recipe = self.stores.recipes.create(self.view.draft()).await?;
        self.dispatch(Action::RecipeCreated);
        Ok(recipe)
    }

    /// Generates a week from every known recipe.
    #[instrument(skip(self))]
    pub async fn generate_week(&mut self, start: Date) -> Result<GeneratedWeek, PlannerError> {
        let pool = self.stores.recipes.ids().await;
        match self.generator.generate(&pool, start).await {
            Ok(week) => {
                self.dispatch(Action::Notify(Notice::WeekGenerated));
                Ok(week)
            }
            Err(e) => {
                if let Some(notice) = e.notice() {
                    self.dispatch(Action::Notify(notice));
                }
                Err(e)
            }
        }
    }

    pub async fn reassign_plan(&mut self, plan_id: &str, recipe_id: &str) -> Result<(), PlannerError> {
        self.stores.plans.update(plan_id, recipe_id).await?;
        self.dispatch(Action::PlanUpdated);
        Ok(())
    }

    /// Deletes the plan the user confirmed through `Action::RequestDelete`.
    #[instrument(skip(self))]
    pub async fn confirm_delete(&mut self) -> Result<String, PlannerError> {
        let Some(plan_id) = self.view.pending_delete().map(str::to_string) else {
            warn!("delete confirmed with nothing pending");
            return Err(PlannerError::NothingPending);
        };
        self.stores.plans.delete(&plan_id).await?;
        self.dispatch(Action::DeleteFinished);
        info!(%plan_id, "confirmed delete done");
        Ok(plan_id)
    }

    /// Flips an item using its last known purchased flag.
    pub async fn toggle_item(&self, item_id: &str) -> Result<(), PlannerError> {
        let current = self
            .stores
            .shopping
            .get(item_id)
            .await
            .ok_or_else(|| PlannerError::UnknownItem(item_id.to_string()))?;
        self.stores
            .shopping
            .toggle(item_id, current.is_purchased)
            .await
    }
}
