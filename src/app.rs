use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
  action::Action,
  cli::Cli,
  components::{AsyncComponent, ErrorView, GalleryFeed, RandomFeed},
  config::Config,
  mode::Mode,
  tui::{Event, Tui},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
  Gallery,
  Random,
}

impl View {
  pub fn toggle(self) -> Self {
    match self {
      View::Gallery => View::Random,
      View::Random => View::Gallery,
    }
  }
}

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub gallery: Box<dyn AsyncComponent>,
  pub random: Box<dyn AsyncComponent>,
  pub error_view: ErrorView,
  pub should_quit: bool,
  pub should_suspend: bool,
  pub mode: Mode,
  pub view: View,
  pub last_tick_key_events: Vec<KeyEvent>,
}

impl App {
  pub fn new(cli: &Cli) -> Result<Self> {
    let mut config = Config::new()?;
    cli.apply(&mut config.feed);
    let gallery = Box::new(GalleryFeed::from_config(&config.feed)?);
    let random = Box::new(RandomFeed::from_config(&config.feed)?);
    Ok(Self {
      config,
      tick_rate: cli.tick_rate,
      frame_rate: cli.frame_rate,
      gallery,
      random,
      error_view: ErrorView::default(),
      should_quit: false,
      should_suspend: false,
      mode: Mode::Default,
      view: cli.view,
      last_tick_key_events: Vec::new(),
    })
  }

  fn tui(&self) -> Result<Tui> {
    Ok(Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).mouse(true))
  }

  fn active_list(&mut self) -> &mut dyn AsyncComponent {
    match self.view {
      View::Gallery => self.gallery.as_mut(),
      View::Random => self.random.as_mut(),
    }
  }

  fn focused(&mut self) -> &mut dyn AsyncComponent {
    match self.mode {
      Mode::Error => &mut self.error_view,
      Mode::Default => self.active_list(),
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = self.tui()?;
    tui.enter()?;

    self.gallery.register_action_handler(action_tx.clone())?;
    self.random.register_action_handler(action_tx.clone())?;

    loop {
      if let Some(e) = tui.next().await {
        match e {
          Event::Quit => action_tx.send(Action::Quit)?,
          Event::Tick => action_tx.send(Action::Tick)?,
          Event::Render => action_tx.send(Action::Render)?,
          Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
          Event::Key(key) => self.handle_key(key, &action_tx)?,
          _ => {},
        }

        if let Some(action) = self.focused().handle_events(Some(e.clone())).await? {
          action_tx.send(action)?;
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          log::debug!("{action:?}");
        }
        match &action {
          Action::Tick => self.last_tick_key_events.clear(),
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::ToggleView => {
            self.view = self.view.toggle();
            action_tx.send(Action::Render)?;
          },
          Action::Error(message) => {
            self.error_view.push_message(message.clone());
            if !self.error_view.is_empty() {
              self.mode = Mode::Error;
              action_tx.send(Action::Render)?;
            }
          },
          Action::ExitError => {
            self.mode = Mode::Default;
            action_tx.send(Action::Render)?;
          },
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, *w, *h))?;
            self.render(&mut tui, &action_tx)?;
          },
          Action::Render => self.render(&mut tui, &action_tx)?,
          _ => {},
        }
        if let Some(action) = self.dispatch(action).await? {
          action_tx.send(action)?
        };
      }

      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = self.tui()?;
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent, action_tx: &UnboundedSender<Action>) -> Result<()> {
    if self.mode != Mode::Default {
      return Ok(());
    }
    let Some(keymap) = self.config.keybindings.get(&self.mode) else {
      return Ok(());
    };
    match keymap.get(&vec![key]) {
      Some(action) => {
        log::info!("Got action: {action:?}");
        action_tx.send(action.clone())?;
      },
      None => {
        self.last_tick_key_events.push(key);
        if let Some(action) = keymap.get(&self.last_tick_key_events) {
          log::info!("Got action: {action:?}");
          action_tx.send(action.clone())?;
        }
      },
    }
    Ok(())
  }

  /// List actions tagged with a feed reach both lists, so a batch that lands
  /// while its list is hidden is still merged. Everything else goes to the
  /// visible list.
  async fn dispatch(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::LoadMore(_) | Action::BatchLoaded { .. } | Action::LoadFailed(_) | Action::ReachedEnd(_) => {
        let from_gallery = self.gallery.update(action.clone()).await?;
        let from_random = self.random.update(action).await?;
        Ok(from_gallery.or(from_random))
      },
      action => self.active_list().update(action).await,
    }
  }

  fn render(&mut self, tui: &mut Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
    let component = self.focused();
    tui.draw(|f| {
      let area = f.area();
      if let Err(e) = component.draw(f, area) {
        let _ = action_tx.send(Action::Error(format!("Failed to draw: {:?}", e)));
      }
    })?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_view_toggle() {
    assert_eq!(View::Gallery.toggle(), View::Random);
    assert_eq!(View::Random.toggle(), View::Gallery);
  }
}
