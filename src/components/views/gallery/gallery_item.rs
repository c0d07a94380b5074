use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
};

use crate::components::traits::{item::Item, item_renderer::ItemRenderer};

#[derive(Clone, Copy, Debug, Default)]
pub struct GalleryItem;

impl ItemRenderer for GalleryItem {
  fn render(&self, _position: usize, _total: usize, item: &Item) -> Vec<Line<'static>> {
    vec![
      Line::from(vec![Span::styled("id: ", Style::default().add_modifier(Modifier::DIM)), Span::from(item.id.to_string())]),
      Line::from(Span::from(item.payload.clone()).style(Style::default().fg(Color::Cyan))),
      Line::default(),
    ]
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn test_render() {
    let item = Item::new(3, "https://picsum.photos/seed/3/200/200");

    let rendered = GalleryItem.render(2, 100, &item);

    assert_eq!(rendered, vec![
      Line::from_iter([Span::from("id: ").style(Style::default().add_modifier(Modifier::DIM)), Span::from("3")]),
      Line::from(Span::from("https://picsum.photos/seed/3/200/200").style(Style::default().fg(Color::Cyan))),
      Line::default(),
    ]);
  }
}
