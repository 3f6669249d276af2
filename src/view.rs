//! Planner view state.
//!
//! The state is a plain value; every change goes through [`PlannerView::reduce`],
//! which consumes the old state and returns the next one.

use crate::meals::dto::{Ingredient, RecipeDraft};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Recipes,
    Planner,
    Shopping,
}

/// Blocking messages shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoRecipes,
    WeekGenerated,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::NoRecipes => "Please add some recipes first!",
            Notice::WeekGenerated => "Weekly meal plan generated!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngredientField {
    Name(String),
    Quantity(f64),
    Unit(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Name(String),
    Description(String),
    Instructions(String),
    Category(String),
    PrepTime(u32),
    CookTime(u32),
    Servings(u32),
    Tags(Vec<String>),
    Ingredient { index: usize, field: IngredientField },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectTab(Tab),
    OpenRecipeForm,
    CloseRecipeForm,
    EditDraft(DraftEdit),
    AddIngredientRow,
    RemoveIngredientRow(usize),
    RecipeCreated,
    BeginEditPlan(String),
    CancelEditPlan,
    PlanUpdated,
    RequestDelete(String),
    CancelDelete,
    DeleteFinished,
    Notify(Notice),
    DismissNotice,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannerView {
    tab: Tab,
    show_recipe_form: bool,
    draft: RecipeDraft,
    editing_plan: Option<String>,
    pending_delete: Option<String>,
    notice: Option<Notice>,
}

impl PlannerView {
    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn show_recipe_form(&self) -> bool {
        self.show_recipe_form
    }

    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }

    pub fn editing_plan(&self) -> Option<&str> {
        self.editing_plan.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::SelectTab(tab) => Self { tab, ..self },
            Action::OpenRecipeForm => Self {
                show_recipe_form: true,
                ..self
            },
            Action::CloseRecipeForm => Self {
                show_recipe_form: false,
                ..self
            },
            Action::EditDraft(edit) => Self {
                draft: edit_draft(self.draft, edit),
                ..self
            },
            Action::AddIngredientRow => {
                let mut draft = self.draft;
                draft.ingredients.push(Ingredient::default());
                Self { draft, ..self }
            }
            Action::RemoveIngredientRow(index) => {
                let mut draft = self.draft;
                // The form always keeps one row.
                if draft.ingredients.len() > 1 && index < draft.ingredients.len() {
                    draft.ingredients.remove(index);
                }
                Self { draft, ..self }
            }
            Action::RecipeCreated => Self {
                show_recipe_form: false,
                draft: RecipeDraft::default(),
                ..self
            },
            Action::BeginEditPlan(id) => Self {
                editing_plan: Some(id),
                ..self
            },
            Action::CancelEditPlan | Action::PlanUpdated => Self {
                editing_plan: None,
                ..self
            },
            Action::RequestDelete(id) => Self {
                pending_delete: Some(id),
                ..self
            },
            Action::CancelDelete | Action::DeleteFinished => Self {
                pending_delete: None,
                ..self
            },
            Action::Notify(notice) => Self {
                notice: Some(notice),
                ..self
            },
            Action::DismissNotice => Self {
                notice: None,
                ..self
            },
        }
    }
}

fn edit_draft(mut draft: RecipeDraft, edit: DraftEdit) -> RecipeDraft {
    match edit {
        DraftEdit::Name(v) => draft.name = v,
        DraftEdit::Description(v) => draft.description = v,
        DraftEdit::Instructions(v) => draft.instructions = v,
        DraftEdit::Category(v) => draft.category = v,
        DraftEdit::PrepTime(v) => draft.prep_time = v,
        DraftEdit::CookTime(v) => draft.cook_time = v,
        DraftEdit::Servings(v) => draft.servings = v.max(1),
        DraftEdit::Tags(v) => draft.tags = v,
        DraftEdit::Ingredient { index, field } => {
            if let Some(row) = draft.ingredients.get_mut(index) {
                match field {
                    IngredientField::Name(v) => row.name = v,
                    IngredientField::Quantity(v) => row.quantity = v.max(0.0),
                    IngredientField::Unit(v) => row.unit = v,
                }
            }
        }
    }
    draft
}

#[cfg(test)]
mod view_tests {
    use super::*;

    fn apply(actions: Vec<Action>) -> PlannerView {
        actions
            .into_iter()
            .fold(PlannerView::default(), PlannerView::reduce)
    }

    #[test]
    fn starts_on_recipes_with_default_draft() {
        let view = PlannerView::default();
        assert_eq!(view.tab(), Tab::Recipes);
        assert_eq!(view.draft(), &RecipeDraft::default());
        assert!(!view.show_recipe_form());
    }

    #[test]
    fn recipe_created_resets_the_form() {
        let view = apply(vec![
            Action::OpenRecipeForm,
            Action::EditDraft(DraftEdit::Name("Chili".into())),
            Action::EditDraft(DraftEdit::PrepTime(15)),
            Action::AddIngredientRow,
            Action::RecipeCreated,
        ]);
        assert!(!view.show_recipe_form());
        assert_eq!(view.draft().ingredients.len(), 1);
        assert_eq!(view.draft().prep_time, 0);
        assert_eq!(view.draft().cook_time, 0);
        assert_eq!(view.draft().servings, 4);
        assert!(view.draft().name.is_empty());
    }

    #[test]
    fn ingredient_rows_are_edited_in_place() {
        let view = apply(vec![
            Action::AddIngredientRow,
            Action::EditDraft(DraftEdit::Ingredient {
                index: 1,
                field: IngredientField::Name("Eggs".into()),
            }),
            Action::EditDraft(DraftEdit::Ingredient {
                index: 1,
                field: IngredientField::Quantity(2.0),
            }),
            Action::EditDraft(DraftEdit::Ingredient {
                index: 1,
                field: IngredientField::Unit("pcs".into()),
            }),
            Action::EditDraft(DraftEdit::Ingredient {
                index: 7,
                field: IngredientField::Name("ignored".into()),
            }),
        ]);
        assert_eq!(view.draft().ingredients[1], Ingredient::new("Eggs", 2.0, "pcs"));
        assert_eq!(view.draft().ingredients.len(), 2);
    }

    #[test]
    fn last_ingredient_row_cannot_be_removed() {
        let view = apply(vec![Action::RemoveIngredientRow(0)]);
        assert_eq!(view.draft().ingredients.len(), 1);

        let view = apply(vec![Action::AddIngredientRow, Action::RemoveIngredientRow(0)]);
        assert_eq!(view.draft().ingredients.len(), 1);
    }

    #[test]
    fn quantities_and_servings_are_clamped() {
        let view = apply(vec![
            Action::EditDraft(DraftEdit::Servings(0)),
            Action::EditDraft(DraftEdit::Ingredient {
                index: 0,
                field: IngredientField::Quantity(-3.0),
            }),
        ]);
        assert_eq!(view.draft().servings, 1);
        assert_eq!(view.draft().ingredients[0].quantity, 0.0);
    }

    #[test]
    fn delete_gate_and_plan_editing() {
        let view = apply(vec![
            Action::SelectTab(Tab::Planner),
            Action::BeginEditPlan("p1".into()),
            Action::RequestDelete("p2".into()),
        ]);
        assert_eq!(view.tab(), Tab::Planner);
        assert_eq!(view.editing_plan(), Some("p1"));
        assert_eq!(view.pending_delete(), Some("p2"));

        let view = view.reduce(Action::CancelDelete).reduce(Action::PlanUpdated);
        assert_eq!(view.pending_delete(), None);
        assert_eq!(view.editing_plan(), None);
    }

    #[test]
    fn notices_come_and_go() {
        let view = apply(vec![Action::Notify(Notice::NoRecipes)]);
        assert_eq!(view.notice().map(|n| n.text()), Some("Please add some recipes first!"));
        assert_eq!(view.reduce(Action::DismissNotice).notice(), None);
    }
}
