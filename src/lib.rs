//! Client-side core of the household meal planner: cached recipes, meal plans
//! and shopping list over the `/api/v1/meals` backend, plus the weekly planner
//! view built from them.

pub mod config;
pub mod error;
pub mod gateway;
pub mod meals;
pub mod planner;
pub mod refresh;
pub mod state;
pub mod view;

pub use error::{GatewayError, PlannerError};
pub use planner::{Planner, PlannerStores};
pub use state::AppState;
