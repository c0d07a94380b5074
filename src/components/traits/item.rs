use serde::{Deserialize, Serialize};

/// An entry of an infinite list. `id` is the dedup and ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: u64,
  pub payload: String,
}

impl Item {
  pub fn new(id: u64, payload: impl Into<String>) -> Self {
    Item { id, payload: payload.into() }
  }
}
