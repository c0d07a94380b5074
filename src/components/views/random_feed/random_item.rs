use ratatui::text::Line;

use crate::components::traits::{item::Item, item_renderer::ItemRenderer};

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomItem;

impl ItemRenderer for RandomItem {
  fn render(&self, position: usize, total: usize, item: &Item) -> Vec<Line<'static>> {
    vec![Line::from(format!("{}/{}: {}", position + 1, total, item.payload)), Line::default()]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_render_shows_position_of_total() {
    let rendered = RandomItem.render(0, 100, &Item::new(1, "0.25"));

    assert_eq!(rendered, vec![Line::from("1/100: 0.25"), Line::default()]);
  }
}
