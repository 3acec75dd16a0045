use serde::Serialize;

/// The bare record: identity and timestamps only, no default fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaseModel {}
