use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use super::dates::{calendar_date, start_of_day};

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn default_servings() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.max(0.0),
            unit: unit.into(),
        }
    }
}

impl Default for Ingredient {
    fn default() -> Self {
        Self::new("", 1.0, "")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prep_time: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cook_time: u32,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl Recipe {
    /// Prep plus cook minutes, saturating on absurd backend values.
    pub fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }
}

/// Body of `POST /meals/recipes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    pub category: String,
    pub tags: Vec<String>,
}

impl Default for RecipeDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            ingredients: vec![Ingredient::default()],
            instructions: String::new(),
            prep_time: 0,
            cook_time: 0,
            servings: default_servings(),
            category: String::new(),
            tags: Vec::new(),
        }
    }
}

impl RecipeDraft {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn into_recipe(self, id: String) -> Recipe {
        fn non_empty(s: String) -> Option<String> {
            (!s.is_empty()).then_some(s)
        }
        Recipe {
            id,
            name: self.name,
            description: non_empty(self.description),
            ingredients: self.ingredients,
            instructions: non_empty(self.instructions),
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
            category: non_empty(self.category),
            tags: self.tags,
        }
    }
}

/// Body of `PUT /meals/recipes/{id}`; only set fields are sent and changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(name) = self.name {
            recipe.name = name;
        }
        if self.description.is_some() {
            recipe.description = self.description;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if self.instructions.is_some() {
            recipe.instructions = self.instructions;
        }
        if let Some(prep_time) = self.prep_time {
            recipe.prep_time = prep_time;
        }
        if let Some(cook_time) = self.cook_time {
            recipe.cook_time = cook_time;
        }
        if let Some(servings) = self.servings {
            recipe.servings = servings;
        }
        if self.category.is_some() {
            recipe.category = self.category;
        }
        if let Some(tags) = self.tags {
            recipe.tags = tags;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    /// Any slot the planner does not show (e.g. `snack`).
    #[serde(other)]
    Other,
}

impl MealType {
    pub const SLOTS: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Planned,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub recipe_id: String,
    pub meal_type: MealType,
    #[serde(with = "calendar_date")]
    pub planned_date: Date,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: PlanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

/// Body of `POST /meals/meal-plans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMealPlan {
    pub recipe_id: String,
    pub meal_type: MealType,
    #[serde(with = "calendar_date")]
    pub planned_date: Date,
}

/// Body of `PUT /meals/meal-plans/{id}`; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealPlanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlanStatus>,
}

/// Body of `POST /meals/meal-plans/generate-weekly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlanRequest {
    pub recipes: Vec<String>,
    #[serde(with = "start_of_day")]
    pub start_date: Date,
    #[serde(default)]
    pub preferences: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlanResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub plans: Vec<MealPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default)]
    pub is_purchased: bool,
}

/// Body of `PUT /meals/shopping-list/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItemPatch {
    pub is_purchased: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListFromPlan {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub items: Vec<ShoppingListItem>,
}
