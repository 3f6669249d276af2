use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::ApiGateway;
use crate::error::GatewayError;
use crate::meals::dto::{
    MealPlan, MealPlanPatch, NewMealPlan, Recipe, RecipeDraft, RecipePatch, ShoppingItemPatch,
    ShoppingListFromPlan, ShoppingListItem, WeeklyPlanRequest, WeeklyPlanResponse,
};

/// Error payload of the backend; FastAPI validation errors put a list here.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// JSON-over-HTTP client for `{base}/meals/*`.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let base = Url::parse(base_url)
            .map_err(|e| GatewayError::Config(format!("invalid api url {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::Config(format!(
                "api url {base_url:?} cannot carry a path"
            )));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Config(format!("http client: {e}")))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "meals api request");
        self.client.request(method, url)
    }

    async fn send(req: RequestBuilder) -> Result<Response, GatewayError> {
        let response = req
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(s)),
            }) => Some(s),
            Ok(ErrorBody {
                detail: Some(other),
            }) => Some(other.to_string()),
            _ => status.canonical_reason().map(str::to_string),
        };
        Err(GatewayError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, GatewayError> {
        Self::send(req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn list_recipes(&self) -> Result<Vec<Recipe>, GatewayError> {
        Self::json(self.request(Method::GET, &["meals", "recipes"])).await
    }

    async fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe, GatewayError> {
        Self::json(self.request(Method::POST, &["meals", "recipes"]).json(draft)).await
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<Recipe, GatewayError> {
        Self::json(self.request(Method::PUT, &["meals", "recipes", id]).json(patch)).await
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), GatewayError> {
        Self::send(self.request(Method::DELETE, &["meals", "recipes", id])).await?;
        Ok(())
    }

    async fn list_meal_plans(&self) -> Result<Vec<MealPlan>, GatewayError> {
        Self::json(self.request(Method::GET, &["meals", "meal-plans"])).await
    }

    async fn create_meal_plan(&self, plan: &NewMealPlan) -> Result<MealPlan, GatewayError> {
        Self::json(self.request(Method::POST, &["meals", "meal-plans"]).json(plan)).await
    }

    async fn generate_weekly(
        &self,
        request: &WeeklyPlanRequest,
    ) -> Result<WeeklyPlanResponse, GatewayError> {
        Self::json(
            self.request(Method::POST, &["meals", "meal-plans", "generate-weekly"])
                .json(request),
        )
        .await
    }

    async fn update_meal_plan(
        &self,
        id: &str,
        patch: &MealPlanPatch,
    ) -> Result<MealPlan, GatewayError> {
        Self::json(self.request(Method::PUT, &["meals", "meal-plans", id]).json(patch)).await
    }

    async fn delete_meal_plan(&self, id: &str) -> Result<(), GatewayError> {
        Self::send(self.request(Method::DELETE, &["meals", "meal-plans", id])).await?;
        Ok(())
    }

    async fn list_shopping_list(
        &self,
        include_purchased: bool,
    ) -> Result<Vec<ShoppingListItem>, GatewayError> {
        Self::json(
            self.request(Method::GET, &["meals", "shopping-list"])
                .query(&[("include_purchased", include_purchased)]),
        )
        .await
    }

    async fn update_shopping_item(
        &self,
        id: &str,
        patch: &ShoppingItemPatch,
    ) -> Result<ShoppingListItem, GatewayError> {
        Self::json(self.request(Method::PUT, &["meals", "shopping-list", id]).json(patch)).await
    }

    async fn shopping_list_from_meal_plan(
        &self,
        plan_id: &str,
    ) -> Result<ShoppingListFromPlan, GatewayError> {
        Self::json(self.request(
            Method::POST,
            &["meals", "shopping-list", "from-meal-plan", plan_id],
        ))
        .await
    }
}
