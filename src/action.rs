use serde::{Deserialize, Serialize};
use strum::Display;

use crate::components::traits::item::Item;

/// Identifies which infinite list an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, Deserialize)]
pub enum Feed {
  Gallery,
  Random,
}

#[derive(Debug, Clone, PartialEq, Serialize, Display, Deserialize)]
pub enum Action {
  Error(String),
  ExitError,
  Quit,
  Render,
  Resize(u16, u16),
  Resume,
  Suspend,
  Tick,
  ToggleView,
  ScrollUp,
  ScrollDown,
  PageUp,
  PageDown,
  ScrollToTop,
  ScrollToBottom,
  LoadMore(Feed),
  BatchLoaded { feed: Feed, offset: usize, items: Vec<Item> },
  LoadFailed(Feed),
  ReachedEnd(Feed),
}
