use ratatui::text::Line;

use super::item::Item;

/// Turns an item into the lines it occupies in the list.
pub trait ItemRenderer: Send + Sync + 'static {
  /// `position` is zero based, `total` is the known size of the full list.
  fn render(&self, position: usize, total: usize, item: &Item) -> Vec<Line<'static>>;
}
