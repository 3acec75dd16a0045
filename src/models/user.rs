use serde::Serialize;

/// A person who owns places or writes reviews.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub email: String,
    /// Stored as given; the console does not hash it.
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}
