use crossterm::event::KeyCode;
use ratatui::{
  prelude::*,
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{
  action::Action,
  components::{AsyncComponent, Component},
  tui::Event,
};

/// Shows failures reported through [`Action::Error`]. Arrow keys scroll, any
/// other key dismisses.
#[derive(Default)]
pub struct ErrorView {
  messages: Vec<String>,
  scroll: u16,
  last_height: u16,
}

impl ErrorView {
  /// Queues a message. Blank messages are dropped.
  pub fn push_message(&mut self, message: String) {
    if message.trim().is_empty() {
      return;
    }
    self.messages.push(message);
  }

  pub fn is_empty(&self) -> bool {
    self.messages.is_empty()
  }

  fn text(&self) -> String {
    self.messages.join("\n")
  }

  fn has_scrolled_to_bottom(&self) -> bool {
    let total_lines = self.text().lines().count() as u16;
    self.scroll + self.last_height >= total_lines
  }

  fn dismiss(&mut self) {
    self.messages.clear();
    self.scroll = 0;
    self.last_height = 0;
  }
}

impl Component for ErrorView {
  fn draw(&mut self, frame: &mut Frame, area: Rect) -> color_eyre::Result<()> {
    self.last_height = area.height.saturating_sub(2);
    let title = match self.messages.len() {
      1 => "Error".to_string(),
      count => format!("Errors ({count})"),
    };
    let paragraph = Paragraph::new(self.text())
      .block(
        Block::default()
          .title(title)
          .title_bottom("↑/↓: Scroll | any other key: Dismiss")
          .style(Style::default().fg(Color::Red))
          .borders(Borders::ALL),
      )
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));

    frame.render_widget(paragraph, area);
    Ok(())
  }
}

#[async_trait::async_trait]
impl AsyncComponent for ErrorView {
  async fn handle_events(&mut self, event: Option<Event>) -> color_eyre::Result<Option<Action>> {
    match event {
      Some(Event::Key(key)) => {
        let action = match key.code {
          KeyCode::Up | KeyCode::Char('k') => {
            self.scroll = self.scroll.saturating_sub(1);
            None
          },
          KeyCode::Down | KeyCode::Char('j') => {
            if !self.has_scrolled_to_bottom() {
              self.scroll += 1;
            }
            None
          },
          _ => {
            self.dismiss();
            Some(Action::ExitError)
          },
        };
        Ok(action)
      },
      _ => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::{KeyEvent, KeyModifiers};

  use super::*;

  fn key(code: KeyCode) -> Option<Event> {
    Some(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
  }

  #[tokio::test]
  async fn test_scroll_stops_at_bottom() {
    let mut view = ErrorView::default();
    view.push_message("one\ntwo\nthree".to_string());
    view.last_height = 2;

    view.handle_events(key(KeyCode::Down)).await.unwrap();
    view.handle_events(key(KeyCode::Down)).await.unwrap();
    assert_eq!(view.scroll, 1);

    view.handle_events(key(KeyCode::Up)).await.unwrap();
    view.handle_events(key(KeyCode::Up)).await.unwrap();
    assert_eq!(view.scroll, 0);
  }

  #[test]
  fn test_blank_message_is_dropped() {
    let mut view = ErrorView::default();

    view.push_message("  \n".to_string());

    assert!(view.is_empty());
  }

  #[tokio::test]
  async fn test_other_key_dismisses() {
    let mut view = ErrorView::default();
    view.push_message("Failed to fetch items: offline".to_string());
    view.push_message("Failed to fetch items: offline".to_string());

    let action = view.handle_events(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(action, Some(Action::ExitError));
    assert!(view.is_empty());
  }
}
