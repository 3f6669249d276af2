pub mod dates;
pub mod dto;
pub mod generator;
pub mod grouping;
pub mod plans;
pub mod recipes;
pub mod shopping;

pub use generator::{GeneratedWeek, WeeklyPlanGenerator};
pub use grouping::{group_by_date, week_view, DaySlots, DayView, WeekView};
pub use plans::MealPlanStore;
pub use recipes::RecipeStore;
pub use shopping::ShoppingListStore;
