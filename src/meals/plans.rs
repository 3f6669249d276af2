use std::collections::BTreeMap;
use std::sync::Arc;

use time::Date;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use super::dto::{MealPlan, MealPlanPatch, NewMealPlan, PlanStatus};
use super::grouping::{group_by_date, week_view, DaySlots, WeekView};
use super::recipes::RecipeStore;
use crate::error::PlannerError;
use crate::gateway::ApiGateway;

/// Cached meal plans, re-fetched in full after every successful write.
#[derive(Clone)]
pub struct MealPlanStore {
    gateway: Arc<dyn ApiGateway>,
    recipes: RecipeStore,
    cache: Arc<RwLock<Vec<MealPlan>>>,
}

impl MealPlanStore {
    pub fn new(gateway: Arc<dyn ApiGateway>, recipes: RecipeStore) -> Self {
        Self {
            gateway,
            recipes,
            cache: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Cached plans with their recipe resolved: the embedded one if the
    /// backend sent it, else the cached recipe with that id, else `None`.
    pub async fn list(&self) -> Vec<MealPlan> {
        let mut plans = self.cache.read().await.clone();
        for plan in plans.iter_mut().filter(|p| p.recipe.is_none()) {
            plan.recipe = self.recipes.get(&plan.recipe_id).await;
        }
        plans
    }

    pub async fn grouped(&self) -> BTreeMap<Date, DaySlots> {
        group_by_date(&self.list().await)
    }

    pub async fn week(&self, start: Date) -> WeekView {
        week_view(&self.grouped().await, start)
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, PlannerError> {
        let plans = self.gateway.list_meal_plans().await.map_err(|e| {
            error!(error = %e, "loading meal plans failed");
            e
        })?;
        let count = plans.len();
        *self.cache.write().await = plans;
        debug!(count, "meal plans refreshed");
        Ok(count)
    }

    #[instrument(skip(self, plan), fields(recipe_id = %plan.recipe_id, date = %plan.planned_date))]
    pub async fn create(&self, plan: &NewMealPlan) -> Result<MealPlan, PlannerError> {
        let created = self.gateway.create_meal_plan(plan).await.map_err(|e| {
            error!(error = %e, "creating meal plan failed");
            e
        })?;
        info!(plan_id = %created.id, "meal plan created");
        self.refresh().await?;
        Ok(created)
    }

    /// Points a plan at another recipe.
    #[instrument(skip(self))]
    pub async fn update(&self, plan_id: &str, recipe_id: &str) -> Result<(), PlannerError> {
        self.patch(
            plan_id,
            MealPlanPatch {
                recipe_id: Some(recipe_id.to_string()),
                status: None,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, plan_id: &str, status: PlanStatus) -> Result<(), PlannerError> {
        self.patch(
            plan_id,
            MealPlanPatch {
                recipe_id: None,
                status: Some(status),
            },
        )
        .await
    }

    async fn patch(&self, plan_id: &str, patch: MealPlanPatch) -> Result<(), PlannerError> {
        self.gateway
            .update_meal_plan(plan_id, &patch)
            .await
            .map_err(|e| {
                error!(error = %e, %plan_id, "updating meal plan failed");
                e
            })?;
        info!(%plan_id, "meal plan updated");
        self.refresh().await?;
        Ok(())
    }

    /// Removes a plan upstream. Callers confirm with the user first.
    #[instrument(skip(self))]
    pub async fn delete(&self, plan_id: &str) -> Result<(), PlannerError> {
        self.gateway.delete_meal_plan(plan_id).await.map_err(|e| {
            error!(error = %e, %plan_id, "deleting meal plan failed");
            e
        })?;
        info!(%plan_id, "meal plan deleted");
        self.refresh().await?;
        Ok(())
    }
}

#[cfg(test)]
mod meal_plan_store_tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::InMemoryGateway;
    use crate::meals::dto::{MealType, RecipeDraft};
    use time::macros::date;

    struct Fixture {
        gw: Arc<InMemoryGateway>,
        recipes: RecipeStore,
        plans: MealPlanStore,
    }

    fn fixture() -> Fixture {
        let gw = Arc::new(InMemoryGateway::new());
        let recipes = RecipeStore::new(gw.clone());
        let plans = MealPlanStore::new(gw.clone(), recipes.clone());
        Fixture { gw, recipes, plans }
    }

    async fn plan_for(f: &Fixture, recipe_id: &str, meal_type: MealType, day: Date) -> MealPlan {
        f.plans
            .create(&NewMealPlan {
                recipe_id: recipe_id.to_string(),
                meal_type,
                planned_date: day,
            })
            .await
            .expect("create plan")
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_plan() {
        let f = fixture();
        let r = f.recipes.create(&RecipeDraft::named("Soup")).await.expect("recipe");
        let a = plan_for(&f, &r.id, MealType::Lunch, date!(2025 - 12 - 27)).await;
        let b = plan_for(&f, &r.id, MealType::Dinner, date!(2025 - 12 - 27)).await;
        let c = plan_for(&f, &r.id, MealType::Lunch, date!(2025 - 12 - 28)).await;

        f.plans.delete(&b.id).await.expect("delete");

        let mut ids: Vec<String> = f.plans.list().await.into_iter().map(|p| p.id).collect();
        ids.sort();
        let mut expected = vec![a.id, c.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn update_reassigns_recipe_after_refresh() {
        let f = fixture();
        let soup = f.recipes.create(&RecipeDraft::named("Soup")).await.expect("recipe");
        let stew = f.recipes.create(&RecipeDraft::named("Stew")).await.expect("recipe");
        let plan = plan_for(&f, &soup.id, MealType::Dinner, date!(2025 - 12 - 27)).await;

        f.plans.update(&plan.id, &stew.id).await.expect("update");

        let listed = f.plans.list().await;
        assert_eq!(listed[0].recipe_id, stew.id);
        assert_eq!(listed[0].recipe.as_ref().map(|r| r.name.as_str()), Some("Stew"));
    }

    #[tokio::test]
    async fn status_can_be_completed() {
        let f = fixture();
        let r = f.recipes.create(&RecipeDraft::named("Soup")).await.expect("recipe");
        let plan = plan_for(&f, &r.id, MealType::Dinner, date!(2025 - 12 - 27)).await;

        f.plans
            .set_status(&plan.id, PlanStatus::Completed)
            .await
            .expect("status");
        assert_eq!(f.plans.list().await[0].status, PlanStatus::Completed);
    }

    #[tokio::test]
    async fn missing_recipe_resolves_to_none() {
        let f = fixture();
        let r = f.recipes.create(&RecipeDraft::named("Gone")).await.expect("recipe");
        plan_for(&f, &r.id, MealType::Breakfast, date!(2025 - 12 - 27)).await;

        f.recipes.delete(&r.id).await.expect("delete recipe");
        f.plans.refresh().await.expect("refresh");

        let listed = f.plans.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recipe, None);
    }

    #[tokio::test]
    async fn bare_plans_resolve_against_recipe_cache() {
        let f = fixture();
        let soup = f.recipes.create(&RecipeDraft::named("Soup")).await.expect("recipe");
        plan_for(&f, &soup.id, MealType::Lunch, date!(2025 - 12 - 27)).await;

        f.gw.set_bare_plans(true);
        f.plans.refresh().await.expect("refresh");
        assert!(f.gw.list_meal_plans().await.expect("raw")[0].recipe.is_none());

        let listed = f.plans.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].recipe.as_ref().map(|r| r.name.as_str()), Some("Soup"));

        f.recipes.delete(&soup.id).await.expect("delete recipe");
        assert_eq!(f.plans.list().await[0].recipe, None);
    }

    #[tokio::test]
    async fn failed_delete_is_a_no_op() {
        let f = fixture();
        let r = f.recipes.create(&RecipeDraft::named("Soup")).await.expect("recipe");
        let plan = plan_for(&f, &r.id, MealType::Lunch, date!(2025 - 12 - 27)).await;

        f.gw.fail_next(GatewayError::Api {
            status: 500,
            detail: None,
        })
        .await;
        assert!(f.plans.delete(&plan.id).await.is_err());
        assert_eq!(f.plans.list().await.len(), 1);

        let unknown = f.plans.delete("nope").await.unwrap_err();
        assert!(unknown.to_string().contains("Meal plan not found"));
        assert_eq!(f.plans.list().await.len(), 1);
    }

    #[tokio::test]
    async fn week_reads_from_cache() {
        let f = fixture();
        let r = f.recipes.create(&RecipeDraft::named("Oats")).await.expect("recipe");
        plan_for(&f, &r.id, MealType::Breakfast, date!(2025 - 12 - 30)).await;

        let week = f.plans.week(date!(2025 - 12 - 27)).await;
        assert_eq!(week.days.len(), 7);
        assert!(week.days[3].slots.breakfast.is_some());
        assert_eq!(f.plans.grouped().await.len(), 1);
    }
}
