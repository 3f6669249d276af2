use std::sync::Arc;

use time::Date;
use tracing::{error, info, instrument, warn};

use super::dto::WeeklyPlanRequest;
use super::plans::MealPlanStore;
use crate::error::PlannerError;
use crate::gateway::ApiGateway;

/// What the backend reported for an accepted generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedWeek {
    pub start: Date,
    pub message: String,
    pub created: usize,
}

/// Asks the backend to fill a week of plans; slot filling happens upstream.
#[derive(Clone)]
pub struct WeeklyPlanGenerator {
    gateway: Arc<dyn ApiGateway>,
    plans: MealPlanStore,
}

impl WeeklyPlanGenerator {
    pub fn new(gateway: Arc<dyn ApiGateway>, plans: MealPlanStore) -> Self {
        Self { gateway, plans }
    }

    #[instrument(skip(self, pool), fields(pool = pool.len()))]
    pub async fn generate(&self, pool: &[String], start: Date) -> Result<GeneratedWeek, PlannerError> {
        if pool.is_empty() {
            warn!("weekly plan requested without recipes");
            return Err(PlannerError::NoRecipes);
        }

        let request = WeeklyPlanRequest {
            recipes: pool.to_vec(),
            start_date: start,
            preferences: Default::default(),
        };
        let response = self.gateway.generate_weekly(&request).await.map_err(|e| {
            error!(error = %e, %start, "weekly plan generation failed");
            e
        })?;
        info!(created = response.plans.len(), %start, "weekly plan generated");

        self.plans.refresh().await?;
        Ok(GeneratedWeek {
            start,
            message: response.message,
            created: response.plans.len(),
        })
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::InMemoryGateway;
    use crate::meals::dto::RecipeDraft;
    use crate::meals::recipes::RecipeStore;
    use time::macros::date;

    fn setup() -> (Arc<InMemoryGateway>, RecipeStore, MealPlanStore, WeeklyPlanGenerator) {
        let gw = Arc::new(InMemoryGateway::new());
        let recipes = RecipeStore::new(gw.clone());
        let plans = MealPlanStore::new(gw.clone(), recipes.clone());
        let generator = WeeklyPlanGenerator::new(gw.clone(), plans.clone());
        (gw, recipes, plans, generator)
    }

    #[tokio::test]
    async fn empty_pool_is_rejected_without_a_request() {
        let (gw, _, plans, generator) = setup();
        let before = plans.list().await;

        let err = generator
            .generate(&[], date!(2025 - 12 - 27))
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::NoRecipes));
        assert_eq!(gw.calls(), 0);
        assert_eq!(plans.list().await, before);
    }

    #[tokio::test]
    async fn generated_week_stays_in_window() {
        let (_, recipes, plans, generator) = setup();
        let r1 = recipes.create(&RecipeDraft::named("r1")).await.expect("recipe");

        let week = generator
            .generate(&[r1.id.clone()], date!(2025 - 12 - 27))
            .await
            .expect("generate");
        assert_eq!(week.created, 21);
        assert_eq!(week.message, "Generated 21 meal plans");

        let grouped = plans.grouped().await;
        let days: Vec<Date> = grouped.keys().copied().collect();
        assert_eq!(days.len(), 7);
        assert_eq!(days.first(), Some(&date!(2025 - 12 - 27)));
        assert_eq!(days.last(), Some(&date!(2026 - 01 - 02)));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        assert!(grouped.values().all(|d| d.breakfast.is_some()
            && d.lunch.is_some()
            && d.dinner.is_some()));
    }

    #[tokio::test]
    async fn rejected_generation_leaves_plans_alone() {
        let (gw, recipes, plans, generator) = setup();
        let r1 = recipes.create(&RecipeDraft::named("r1")).await.expect("recipe");
        gw.fail_next(GatewayError::Transport("connection reset".into())).await;

        assert!(generator
            .generate(&[r1.id], date!(2025 - 12 - 27))
            .await
            .is_err());
        assert!(plans.list().await.is_empty());
    }
}
