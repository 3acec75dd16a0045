use serde::Serialize;

/// Free-text review of a place written by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Review {
    pub place_id: String,
    pub user_id: String,
    pub text: String,
}
