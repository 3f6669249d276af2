//! Process-local stand-in for the meals backend.
//!
//! Mirrors the backend's observable behaviour closely enough to run the planner
//! offline: ids are minted here, meal plans come back sorted by date with their
//! recipe embedded, and weekly generation follows the backend's rotation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::{Date, Duration};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::ApiGateway;
use crate::error::GatewayError;
use crate::meals::dto::{
    MealPlan, MealPlanPatch, MealType, NewMealPlan, PlanStatus, Recipe, RecipeDraft, RecipePatch,
    ShoppingItemPatch, ShoppingListFromPlan, ShoppingListItem, WeeklyPlanRequest,
    WeeklyPlanResponse,
};

#[derive(Default)]
struct Tables {
    recipes: Vec<Recipe>,
    plans: Vec<MealPlan>,
    items: Vec<ShoppingListItem>,
}

impl Tables {
    fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    fn with_recipe(&self, plan: &MealPlan) -> MealPlan {
        MealPlan {
            recipe: self.recipe(&plan.recipe_id).cloned(),
            ..plan.clone()
        }
    }
}

#[derive(Default)]
pub struct InMemoryGateway {
    tables: Mutex<Tables>,
    failures: Mutex<VecDeque<GatewayError>>,
    calls: AtomicUsize,
    bare_plans: AtomicBool,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The next request fails with `err` instead of being served.
    pub async fn fail_next(&self, err: GatewayError) {
        self.failures.lock().await.push_back(err);
    }

    /// When set, meal plans are listed without their embedded recipe.
    pub fn set_bare_plans(&self, bare: bool) {
        self.bare_plans.store(bare, Ordering::SeqCst);
    }

    /// Shopping items are produced upstream; this seeds one directly.
    pub async fn insert_shopping_item(
        &self,
        name: &str,
        quantity: f64,
        unit: &str,
        category: &str,
    ) -> ShoppingListItem {
        let item = ShoppingListItem {
            id: new_id(),
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            category: category.to_string(),
            is_purchased: false,
        };
        self.tables.lock().await.items.push(item.clone());
        item
    }

    async fn begin(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().await.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Fills 7 days x 3 slots from `pool`.
///
/// A slot prefers recipes whose category names it and falls back to the whole
/// pool. Recipes already used for a slot are skipped until every candidate has
/// been used, then the slot starts over. The pick is `candidates[day % len]`.
pub(crate) fn rotate_week(pool: &[Recipe], start: Date) -> Option<Vec<(Date, MealType, String)>> {
    if pool.is_empty() {
        return Some(Vec::new());
    }
    let mut used: HashMap<MealType, HashSet<&str>> = HashMap::new();
    let mut picks = Vec::with_capacity(7 * MealType::SLOTS.len());

    for day in 0..7usize {
        let date = start.checked_add(Duration::days(day as i64))?;
        for slot in MealType::SLOTS {
            let by_category: Vec<&Recipe> = pool
                .iter()
                .filter(|r| {
                    r.category
                        .as_deref()
                        .is_some_and(|c| c == slot.as_str())
                })
                .collect();
            let available = if by_category.is_empty() {
                pool.iter().collect()
            } else {
                by_category
            };

            let used_for_slot = used.entry(slot).or_default();
            let mut unused: Vec<&Recipe> = available
                .iter()
                .copied()
                .filter(|r| !used_for_slot.contains(r.id.as_str()))
                .collect();
            if unused.is_empty() {
                used_for_slot.clear();
                unused = available;
            }

            let recipe = unused[day % unused.len()];
            used_for_slot.insert(recipe.id.as_str());
            picks.push((date, slot, recipe.id.clone()));
        }
    }
    Some(picks)
}

#[async_trait]
impl ApiGateway for InMemoryGateway {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, GatewayError> {
        self.begin().await?;
        Ok(self.tables.lock().await.recipes.clone())
    }

    async fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, GatewayError> {
        self.begin().await?;
        let recipe = draft.clone().into_recipe(new_id());
        self.tables.lock().await.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let recipe = tables
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| GatewayError::not_found("Recipe not found"))?;
        patch.clone().apply(recipe);
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let before = tables.recipes.len();
        tables.recipes.retain(|r| r.id != id);
        if tables.recipes.len() == before {
            return Err(GatewayError::not_found("Recipe not found"));
        }
        Ok(())
    }

    async fn list_meal_plans(&self) -> Result<Vec<MealPlan>, GatewayError> {
        self.begin().await?;
        let tables = self.tables.lock().await;
        let mut plans: Vec<MealPlan> = if self.bare_plans.load(Ordering::SeqCst) {
            tables.plans.clone()
        } else {
            tables.plans.iter().map(|p| tables.with_recipe(p)).collect()
        };
        plans.sort_by_key(|p| p.planned_date);
        Ok(plans)
    }

    async fn create_meal_plan(&self, plan: &NewMealPlan) -> Result<MealPlan, GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        if tables.recipe(&plan.recipe_id).is_none() {
            return Err(GatewayError::not_found("Recipe not found"));
        }
        let created = MealPlan {
            id: new_id(),
            recipe_id: plan.recipe_id.clone(),
            meal_type: plan.meal_type,
            planned_date: plan.planned_date,
            status: PlanStatus::Planned,
            recipe: None,
        };
        tables.plans.push(created.clone());
        Ok(created)
    }

    async fn generate_weekly(
        &self,
        request: &WeeklyPlanRequest,
    ) -> Result<WeeklyPlanResponse, GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let pool: Vec<Recipe> = request
            .recipes
            .iter()
            .filter_map(|id| tables.recipe(id).cloned())
            .collect();
        if pool.is_empty() {
            return Err(GatewayError::not_found("Recipe not found"));
        }

        let picks = rotate_week(&pool, request.start_date).ok_or_else(|| GatewayError::Api {
            status: 422,
            detail: Some("start_date out of range".into()),
        })?;
        let created: Vec<MealPlan> = picks
            .into_iter()
            .map(|(planned_date, meal_type, recipe_id)| MealPlan {
                id: new_id(),
                recipe_id,
                meal_type,
                planned_date,
                status: PlanStatus::Planned,
                recipe: None,
            })
            .collect();
        tables.plans.extend(created.iter().cloned());

        Ok(WeeklyPlanResponse {
            message: format!("Generated {} meal plans", created.len()),
            plans: created,
        })
    }

    async fn update_meal_plan(
        &self,
        id: &str,
        patch: &MealPlanPatch,
    ) -> Result<MealPlan, GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let plan = tables
            .plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::not_found("Meal plan not found"))?;
        if let Some(recipe_id) = &patch.recipe_id {
            plan.recipe_id = recipe_id.clone();
        }
        if let Some(status) = patch.status {
            plan.status = status;
        }
        Ok(plan.clone())
    }

    async fn delete_meal_plan(&self, id: &str) -> Result<(), GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let before = tables.plans.len();
        tables.plans.retain(|p| p.id != id);
        if tables.plans.len() == before {
            return Err(GatewayError::not_found("Meal plan not found"));
        }
        Ok(())
    }

    async fn list_shopping_list(
        &self,
        include_purchased: bool,
    ) -> Result<Vec<ShoppingListItem>, GatewayError> {
        self.begin().await?;
        // Newest first, like the backend.
        Ok(self
            .tables
            .lock()
            .await
            .items
            .iter()
            .rev()
            .filter(|i| include_purchased || !i.is_purchased)
            .cloned()
            .collect())
    }

    async fn update_shopping_item(
        &self,
        id: &str,
        patch: &ShoppingItemPatch,
    ) -> Result<ShoppingListItem, GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let item = tables
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| GatewayError::not_found("Shopping list item not found"))?;
        item.is_purchased = patch.is_purchased;
        Ok(item.clone())
    }

    async fn shopping_list_from_meal_plan(
        &self,
        plan_id: &str,
    ) -> Result<ShoppingListFromPlan, GatewayError> {
        self.begin().await?;
        let mut tables = self.tables.lock().await;
        let recipe_id = tables
            .plans
            .iter()
            .find(|p| p.id == plan_id)
            .map(|p| p.recipe_id.clone())
            .ok_or_else(|| GatewayError::not_found("Meal plan not found"))?;
        let ingredients = match tables.recipe(&recipe_id) {
            Some(r) if !r.ingredients.is_empty() => r.ingredients.clone(),
            _ => return Err(GatewayError::not_found("Recipe or ingredients not found")),
        };

        let items: Vec<ShoppingListItem> = ingredients
            .into_iter()
            .map(|ing| ShoppingListItem {
                id: new_id(),
                name: ing.name,
                quantity: ing.quantity,
                unit: ing.unit,
                category: "Other".to_string(),
                is_purchased: false,
            })
            .collect();
        tables.items.extend(items.iter().cloned());

        Ok(ShoppingListFromPlan {
            message: format!("Added {} items to shopping list", items.len()),
            items,
        })
    }
}
