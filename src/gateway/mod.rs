//! The I/O boundary of the planner: everything the stores know about the
//! meals backend goes through [`ApiGateway`].

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::meals::dto::{
    MealPlan, MealPlanPatch, NewMealPlan, Recipe, RecipeDraft, RecipePatch, ShoppingItemPatch,
    ShoppingListFromPlan, ShoppingListItem, WeeklyPlanRequest, WeeklyPlanResponse,
};

pub mod http;
pub mod memory;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, GatewayError>;
    async fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, GatewayError>;
    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, GatewayError>;
    async fn delete_recipe(&self, id: &str) -> Result<(), GatewayError>;

    async fn list_meal_plans(&self) -> Result<Vec<MealPlan>, GatewayError>;
    async fn create_meal_plan(&self, plan: &NewMealPlan) -> Result<MealPlan, GatewayError>;
    async fn generate_weekly(
        &self,
        request: &WeeklyPlanRequest,
    ) -> Result<WeeklyPlanResponse, GatewayError>;
    async fn update_meal_plan(
        &self,
        id: &str,
        patch: &MealPlanPatch,
    ) -> Result<MealPlan, GatewayError>;
    async fn delete_meal_plan(&self, id: &str) -> Result<(), GatewayError>;

    async fn list_shopping_list(
        &self,
        include_purchased: bool,
    ) -> Result<Vec<ShoppingListItem>, GatewayError>;
    async fn update_shopping_item(
        &self,
        id: &str,
        patch: &ShoppingItemPatch,
    ) -> Result<ShoppingListItem, GatewayError>;
    async fn shopping_list_from_meal_plan(
        &self,
        plan_id: &str,
    ) -> Result<ShoppingListFromPlan, GatewayError>;
}
