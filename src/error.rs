use thiserror::Error;

use crate::view::Notice;

/// Failure talking to the meals backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("api error {status}: {}", .detail.as_deref().unwrap_or("An error occurred"))]
    Api { status: u16, detail: Option<String> },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn not_found(detail: &str) -> Self {
        GatewayError::Api {
            status: 404,
            detail: Some(detail.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Please add some recipes first!")]
    NoRecipes,

    #[error("no meal plan is awaiting delete confirmation")]
    NothingPending,

    #[error("unknown shopping list item {0}")]
    UnknownItem(String),
}

impl PlannerError {
    /// The blocking notice shown to the user, if this failure warrants one.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            PlannerError::NoRecipes => Some(Notice::NoRecipes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn api_error_message_prefers_detail() {
        let err = GatewayError::not_found("Meal plan not found");
        assert_eq!(err.to_string(), "api error 404: Meal plan not found");

        let bare = GatewayError::Api {
            status: 500,
            detail: None,
        };
        assert_eq!(bare.to_string(), "api error 500: An error occurred");
    }

    #[test]
    fn only_precondition_failures_carry_a_notice() {
        assert_eq!(PlannerError::NoRecipes.notice(), Some(Notice::NoRecipes));
        let gateway: PlannerError = GatewayError::Transport("refused".into()).into();
        assert_eq!(gateway.notice(), None);
    }
}
