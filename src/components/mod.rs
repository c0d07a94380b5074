use color_eyre::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
  action::Action,
  tui::{Event, Frame},
};

pub mod shared;
pub mod traits;
pub mod views;

pub use views::{ErrorView, GalleryFeed, RandomFeed};

pub trait Component: Send + Sync {
  /// Register an action handler that can send actions for processing if necessary.
  ///
  /// # Arguments
  ///
  /// * `tx` - An unbounded sender that can send actions.
  ///
  /// # Returns
  ///
  /// * `Result<()>` - An Ok result or an error.
  fn register_action_handler(&mut self, _tx: UnboundedSender<Action>) -> Result<()> {
    Ok(())
  }

  /// Render the component on the screen. (REQUIRED)
  ///
  /// # Arguments
  ///
  /// * `frame` - A frame used for rendering.
  /// * `area` - The area in which the component should be drawn.
  ///
  /// # Returns
  ///
  /// * `Result<()>` - An Ok result or an error.
  fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()>;
}

#[async_trait::async_trait]
pub trait AsyncComponent: Component {
  /// Handle incoming events and produce actions if necessary.
  async fn handle_events(&mut self, _event: Option<Event>) -> Result<Option<Action>> {
    Ok(None)
  }

  /// Update the state of the component based on a received action.
  async fn update(&mut self, _action: Action) -> Result<Option<Action>> {
    Ok(None)
  }
}
