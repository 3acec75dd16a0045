use serde::Serialize;

/// A city within a state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct City {
    /// Id of the owning [`State`](super::State). Not validated.
    pub state_id: String,
    pub name: String,
}
