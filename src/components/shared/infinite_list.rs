use std::{collections::HashMap, sync::Arc, time::SystemTime};

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::{KeyCode, MouseEventKind};
use ratatui::{
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style, Stylize},
  text::Line,
  widgets::{Block, Borders, Paragraph},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{debug, error, info, warn};

use super::visibility_marker::{MarkerProps, VisibilityMarker};
use crate::{
  action::{Action, Feed},
  components::{
    AsyncComponent, Component,
    traits::{batch_source::BatchSource, item::Item, item_renderer::ItemRenderer},
  },
  observer::{AnchorId, ObservationConfig, Span, Viewport},
  tui::{Event, Frame},
};

const END_ANCHOR: AnchorId = AnchorId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingOperation {
  None,
  Loading(SystemTime),
}

/// One entry of the rendered list, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
  Item(usize),
  LoadMarker,
  LoadingNotice,
  EndMarker,
}

#[derive(Clone)]
pub struct ListSettings {
  pub title: &'static str,
  pub total: usize,
  pub batch_size: usize,
  /// Number of items rendered below the load marker.
  pub preload: usize,
  pub observation: ObservationConfig,
  /// Content drawn inside the load marker.
  pub marker_text: Option<Arc<str>>,
  /// Shows a "Loading more ..." row after the items while more can be loaded.
  pub loading_notice: bool,
  /// Adds an end-of-list marker drawing this text. It reports reaching the
  /// bottom and never loads.
  pub end_text: Option<Arc<str>>,
}

/// A list that grows in batches whenever its load marker scrolls into view.
pub struct InfiniteList<DS, R>
where
  DS: BatchSource,
  R: ItemRenderer,
{
  feed: Feed,
  source: Arc<DS>,
  renderer: R,
  settings: ListSettings,

  items: Vec<Item>,
  in_flight: usize,
  loading: LoadingOperation,
  reached_end: bool,

  viewport: Viewport,
  content: Vec<Line<'static>>,
  load_marker: VisibilityMarker,
  // bumped on every merged batch
  generation: usize,
  // (generation the marker was placed for, its anchor)
  load_anchor: Option<(usize, AnchorId)>,
  next_anchor: u64,
  end_marker: Option<VisibilityMarker>,

  action_tx: Option<UnboundedSender<Action>>,
}

impl<DS, R> InfiniteList<DS, R>
where
  DS: BatchSource,
  R: ItemRenderer,
{
  pub fn new(feed: Feed, source: DS, renderer: R, settings: ListSettings) -> Self {
    let load_marker = VisibilityMarker::new(
      MarkerProps::new(|| {}).config(settings.observation.clone()).children(settings.marker_text.clone()),
    );
    let end_marker = settings.end_text.clone().map(|text| VisibilityMarker::new(MarkerProps::new(|| {}).children(Some(text))));

    Self {
      feed,
      source: Arc::new(source),
      renderer,
      settings,
      items: Vec::new(),
      in_flight: 0,
      loading: LoadingOperation::None,
      reached_end: false,
      viewport: Viewport::new(),
      content: Vec::new(),
      load_marker,
      generation: 0,
      load_anchor: None,
      next_anchor: 0,
      end_marker,
      action_tx: None,
    }
  }

  pub fn items(&self) -> &[Item] {
    &self.items
  }

  pub fn has_more(&self) -> bool {
    self.items.len() < self.settings.total
  }

  fn load_marker_props(&self) -> MarkerProps {
    let tx = self.action_tx.clone();
    let feed = self.feed;
    MarkerProps::new(move || {
      debug!(%feed, "load marker entered view");
      if let Some(tx) = &tx {
        send_action(tx, Action::LoadMore(feed));
      }
    })
    .config(self.settings.observation.clone())
    .children(self.settings.marker_text.clone())
  }

  fn end_marker_props(&self) -> MarkerProps {
    let tx = self.action_tx.clone();
    let feed = self.feed;
    MarkerProps::new(move || {
      if let Some(tx) = &tx {
        send_action(tx, Action::ReachedEnd(feed));
      }
    })
    .children(self.settings.end_text.clone())
  }

  /// The rendered rows. While more items can be loaded the load marker sits
  /// `preload` rows before the last item.
  pub fn rows(&self) -> Vec<Row> {
    let mut rows: Vec<Row> = (0..self.items.len()).map(Row::Item).collect();
    if self.has_more() {
      rows.insert(self.items.len().saturating_sub(self.settings.preload), Row::LoadMarker);
      if self.settings.loading_notice {
        rows.push(Row::LoadingNotice);
      }
    }
    if self.end_marker.is_some() {
      rows.push(Row::EndMarker);
    }
    rows
  }

  fn row_lines(&self, row: Row) -> Vec<Line<'static>> {
    match row {
      Row::Item(position) => self.renderer.render(position, self.settings.total, &self.items[position]),
      Row::LoadMarker => self.load_marker.lines().to_vec(),
      Row::LoadingNotice => vec![Line::from("Loading more ...").dim()],
      Row::EndMarker => self.end_marker.as_ref().map(|marker| marker.lines().to_vec()).unwrap_or_default(),
    }
  }

  fn layout(&mut self) {
    let mut content = Vec::new();
    for row in self.rows() {
      let lines = self.row_lines(row);
      let span = Span::new(content.len(), lines.len());
      match row {
        Row::LoadMarker => {
          if let Some((_, anchor)) = self.load_anchor {
            self.viewport.place_anchor(anchor, span);
          }
        },
        Row::EndMarker => self.viewport.place_anchor(END_ANCHOR, span),
        Row::Item(_) | Row::LoadingNotice => {},
      }
      content.extend(lines);
    }
    self.viewport.set_content_height(content.len());
    self.content = content;
  }

  /// Brings markers in line with the list. The load marker is a new element
  /// for every merged batch, so a marker still in view after a batch lands
  /// gets a fresh initial notification, even when the batch added nothing.
  fn reconcile(&mut self) {
    let wanted = self.has_more().then_some(self.generation);
    if self.load_anchor.map(|(generation, _)| generation) != wanted {
      if let Some((_, anchor)) = self.load_anchor.take() {
        self.load_marker.unmount(&mut self.viewport);
        self.viewport.remove_anchor(anchor);
      }
      if let Some(generation) = wanted {
        self.next_anchor += 1;
        self.load_anchor = Some((generation, AnchorId(self.next_anchor)));
      }
    }

    self.layout();

    if let Some((_, anchor)) = self.load_anchor {
      if !self.load_marker.is_subscribed() {
        self.load_marker.mount(&mut self.viewport, anchor);
      }
    }
    if let Some(end_marker) = self.end_marker.as_mut() {
      if !end_marker.is_subscribed() {
        end_marker.mount(&mut self.viewport, END_ANCHOR);
      }
    }
    self.viewport.evaluate();
  }

  /// Requests the batch following the current items. The request remembers
  /// the list length it was issued for.
  pub fn load_more(&mut self) {
    if !self.has_more() {
      return;
    }
    let Some(tx) = self.action_tx.clone() else {
      warn!(feed = %self.feed, "load requested before an action handler was registered");
      return;
    };
    let offset = self.items.len();
    let count = self.settings.batch_size.min(self.settings.total - offset);
    info!(feed = %self.feed, offset, count, "load more");

    self.in_flight += 1;
    if self.loading == LoadingOperation::None {
      self.loading = LoadingOperation::Loading(SystemTime::now());
    }

    let feed = self.feed;
    let source = self.source.clone();
    spawn(async move {
      match source.fetch_batch(offset, count).await {
        Ok(items) => send_action(&tx, Action::BatchLoaded { feed, offset, items }),
        Err(err) => {
          error!("Failed to fetch items: {}", err);
          send_action(&tx, Action::Error(format!("Failed to fetch items: {}", err)));
          send_action(&tx, Action::LoadFailed(feed));
        },
      }
    });
  }

  fn finish_request(&mut self) {
    self.in_flight = self.in_flight.saturating_sub(1);
    if self.in_flight == 0 {
      self.loading = LoadingOperation::None;
    }
  }

  /// Merges a batch fetched for `offset`. Returns false, leaving the list
  /// untouched, when the list no longer has `offset` items.
  pub fn apply_batch(&mut self, offset: usize, batch: Vec<Item>) -> bool {
    if self.items.len() != offset {
      debug!(feed = %self.feed, offset, len = self.items.len(), "discarding stale batch");
      return false;
    }
    self.items = merge_by_id(std::mem::take(&mut self.items), batch);
    if self.items.len() == offset {
      warn!(feed = %self.feed, offset, "batch added no new items");
    }
    self.generation += 1;
    self.reconcile();
    true
  }

  fn scroll(&mut self, delta: isize) -> Option<Action> {
    self.viewport.scroll_by(delta);
    self.viewport.evaluate();
    Some(Action::Render)
  }

  fn title(&self) -> String {
    let count = format!("{} {}/{}", self.settings.title, self.items.len(), self.settings.total);
    match self.loading {
      LoadingOperation::Loading(time) => format!("{count} Loading... ({})", format_time_elapsed(time)),
      LoadingOperation::None => count,
    }
  }

  fn instructions(&self) -> String {
    let mut instructions = vec!["↑/↓: Scroll", "PgUp/PgDn: Page", "Home/End: Jump", "Tab: Switch View", "q: Quit"];
    if self.reached_end {
      instructions.push("Reached the end");
    }
    instructions.join(" | ")
  }
}

/// Concatenates `incoming` after `existing` keeping one item per id. Later
/// items win and each id keeps the position where it was first seen.
pub fn merge_by_id(existing: Vec<Item>, incoming: Vec<Item>) -> Vec<Item> {
  let mut positions: HashMap<u64, usize> = HashMap::with_capacity(existing.len() + incoming.len());
  let mut merged: Vec<Item> = Vec::with_capacity(existing.len() + incoming.len());
  for item in existing.into_iter().chain(incoming) {
    match positions.get(&item.id) {
      Some(&position) => merged[position] = item,
      None => {
        positions.insert(item.id, merged.len());
        merged.push(item);
      },
    }
  }
  merged
}

fn send_action(tx: &UnboundedSender<Action>, action: Action) {
  if let Err(e) = tx.send(action) {
    error!("Failed to send action: {}", e);
  }
}

impl<DS, R> Component for InfiniteList<DS, R>
where
  DS: BatchSource,
  R: ItemRenderer,
{
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.action_tx = Some(tx);
    let props = self.load_marker_props();
    self.load_marker.set_props(&mut self.viewport, props);
    let props = self.end_marker_props();
    if let Some(end_marker) = self.end_marker.as_mut() {
      end_marker.set_props(&mut self.viewport, props);
    }
    self.reconcile();
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(1), Constraint::Length(3)])
      .split(area);

    let block = Block::default().title(self.title()).borders(Borders::ALL);
    let inner = block.inner(chunks[0]);
    if self.viewport.set_height(inner.height as usize) {
      self.viewport.evaluate();
    }

    let start = self.viewport.scroll_top().min(self.viewport.content_height());
    let end = (start + self.viewport.height()).min(self.viewport.content_height());
    let list = Paragraph::new(self.content[start..end].to_vec()).block(block).style(Style::default().fg(Color::White));
    frame.render_widget(list, chunks[0]);

    let footer = Paragraph::new(self.instructions())
      .block(Block::default().borders(Borders::ALL))
      .style(Style::default().fg(Color::White));
    frame.render_widget(footer, chunks[1]);
    Ok(())
  }
}

#[async_trait]
impl<DS, R> AsyncComponent for InfiniteList<DS, R>
where
  DS: BatchSource,
  R: ItemRenderer,
{
  async fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
    let action = match event {
      Some(Event::Key(key)) => match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::ScrollToTop),
        KeyCode::End | KeyCode::Char('G') => Some(Action::ScrollToBottom),
        _ => None,
      },
      Some(Event::Mouse(mouse)) => match mouse.kind {
        MouseEventKind::ScrollUp => Some(Action::ScrollUp),
        MouseEventKind::ScrollDown => Some(Action::ScrollDown),
        _ => None,
      },
      _ => None,
    };
    Ok(action)
  }

  async fn update(&mut self, action: Action) -> Result<Option<Action>> {
    let page = self.viewport.height().max(1) as isize;
    let next = match action {
      Action::Tick => {
        self.viewport.flush();
        None
      },
      Action::ScrollUp => self.scroll(-1),
      Action::ScrollDown => self.scroll(1),
      Action::PageUp => self.scroll(-page),
      Action::PageDown => self.scroll(page),
      Action::ScrollToTop => {
        self.viewport.scroll_to(0);
        self.viewport.evaluate();
        Some(Action::Render)
      },
      Action::ScrollToBottom => {
        self.viewport.scroll_to_end();
        self.viewport.evaluate();
        Some(Action::Render)
      },
      Action::LoadMore(feed) if feed == self.feed => {
        self.load_more();
        Some(Action::Render)
      },
      Action::BatchLoaded { feed, offset, items } if feed == self.feed => {
        self.finish_request();
        self.apply_batch(offset, items);
        Some(Action::Render)
      },
      Action::LoadFailed(feed) if feed == self.feed => {
        self.finish_request();
        Some(Action::Render)
      },
      Action::ReachedEnd(feed) if feed == self.feed => {
        info!(%feed, "scrolled to bottom");
        self.reached_end = true;
        Some(Action::Render)
      },
      _ => None,
    };
    Ok(next)
  }
}

fn format_time_elapsed(time: SystemTime) -> String {
  match time.elapsed() {
    Ok(elapsed) => format!("{:.1}s", elapsed.as_secs_f64()),
    Err(err) => {
      warn!("Failed to get system time {}", err);
      String::from("xs")
    },
  }
}
