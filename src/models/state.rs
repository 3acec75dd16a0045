use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct State {
    pub name: String,
}
