use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one spawned decoration instance.
///
/// The terrain core only allocates and releases handles; the render/physics
/// layer maps them to whatever scene objects it creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecorationHandle(pub Uuid);

impl DecorationHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DecorationHandle {
    fn default() -> Self {
        Self::new()
    }
}
