use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
  #[default]
  #[serde(alias = "default")]
  Default,
  #[serde(alias = "error")]
  Error,
}
