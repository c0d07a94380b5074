use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, Ordering},
};

use ratatui::text::Line;
use tracing::{debug, error, warn};

use crate::observer::{
  AnchorId, IntersectionCallback, IntersectionEntry, ObservationConfig, SubscriptionHandle, VisibilityHost,
};

pub type OnEnter = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct MarkerProps {
  pub on_enter: OnEnter,
  pub config: ObservationConfig,
  pub children: Option<Arc<str>>,
}

impl MarkerProps {
  pub fn new(on_enter: impl Fn() + Send + Sync + 'static) -> Self {
    MarkerProps { on_enter: Arc::new(on_enter), config: ObservationConfig::default(), children: None }
  }

  pub fn config(mut self, config: ObservationConfig) -> Self {
    self.config = config;
    self
  }

  pub fn children(mut self, children: Option<Arc<str>>) -> Self {
    self.children = children;
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MarkerState {
  Unmounted,
  Subscribed { anchor: AnchorId, handle: SubscriptionHandle },
}

/// Calls `on_enter` when its anchor scrolls into view.
///
/// The marker is either unmounted or holds exactly one live subscription.
/// Changing the observation config swaps the subscription, changing only the
/// callback does not.
pub struct VisibilityMarker {
  props: MarkerProps,
  on_enter: Arc<Mutex<OnEnter>>,
  live: Arc<AtomicBool>,
  state: MarkerState,
  rendered: Vec<Line<'static>>,
}

impl VisibilityMarker {
  pub fn new(props: MarkerProps) -> Self {
    let on_enter = Arc::new(Mutex::new(props.on_enter.clone()));
    let rendered = render_children(props.children.as_deref());
    VisibilityMarker { props, on_enter, live: Arc::new(AtomicBool::new(false)), state: MarkerState::Unmounted, rendered }
  }

  pub fn is_subscribed(&self) -> bool {
    matches!(self.state, MarkerState::Subscribed { .. })
  }

  pub fn anchor(&self) -> Option<AnchorId> {
    match self.state {
      MarkerState::Subscribed { anchor, .. } => Some(anchor),
      MarkerState::Unmounted => None,
    }
  }

  pub fn subscription(&self) -> Option<SubscriptionHandle> {
    match self.state {
      MarkerState::Subscribed { handle, .. } => Some(handle),
      MarkerState::Unmounted => None,
    }
  }

  pub fn config(&self) -> &ObservationConfig {
    &self.props.config
  }

  /// Lines drawn inside the anchor; empty for a zero-height marker.
  pub fn lines(&self) -> &[Line<'static>] {
    &self.rendered
  }

  pub fn height(&self) -> usize {
    self.rendered.len()
  }

  /// Subscribes against `anchor`. A missing anchor is logged and leaves the
  /// marker unmounted.
  pub fn mount(&mut self, host: &mut dyn VisibilityHost, anchor: AnchorId) {
    if let MarkerState::Subscribed { anchor: current, .. } = self.state {
      warn!(%current, %anchor, "marker is already mounted");
      return;
    }
    self.subscribe(host, anchor);
  }

  /// Applies new props. Returns whether the marker needs to redraw, which is
  /// only when the children changed.
  pub fn set_props(&mut self, host: &mut dyn VisibilityHost, next: MarkerProps) -> bool {
    let should_render = self.should_render(&next);
    let config_changed = next.config != self.props.config;

    match self.on_enter.lock() {
      Ok(mut on_enter) => *on_enter = next.on_enter.clone(),
      Err(poisoned) => *poisoned.into_inner() = next.on_enter.clone(),
    }
    self.props = next;

    if config_changed {
      if let MarkerState::Subscribed { anchor, .. } = self.state {
        debug!(%anchor, config = ?self.props.config, "observation config changed, resubscribing");
        self.release(host);
        self.subscribe(host, anchor);
      }
    }
    if should_render {
      self.rendered = render_children(self.props.children.as_deref());
    }
    should_render
  }

  pub fn should_render(&self, next: &MarkerProps) -> bool {
    match (&self.props.children, &next.children) {
      (Some(current), Some(next)) => !Arc::ptr_eq(current, next),
      (None, None) => false,
      _ => true,
    }
  }

  pub fn unmount(&mut self, host: &mut dyn VisibilityHost) {
    self.release(host);
  }

  fn subscribe(&mut self, host: &mut dyn VisibilityHost, anchor: AnchorId) {
    let live = Arc::new(AtomicBool::new(true));
    let callback = entry_callback(self.on_enter.clone(), live.clone());
    match host.subscribe(anchor, &self.props.config, callback) {
      Ok(handle) => {
        self.live = live;
        self.state = MarkerState::Subscribed { anchor, handle };
      },
      Err(err) => {
        error!("Failed to observe marker anchor: {}", err);
        live.store(false, Ordering::Release);
        self.state = MarkerState::Unmounted;
      },
    }
  }

  fn release(&mut self, host: &mut dyn VisibilityHost) {
    self.live.store(false, Ordering::Release);
    if let MarkerState::Subscribed { handle, .. } = std::mem::replace(&mut self.state, MarkerState::Unmounted) {
      if let Err(err) = host.unsubscribe(handle) {
        error!("Failed to stop observing marker: {}", err);
      }
    }
  }
}

impl Drop for VisibilityMarker {
  fn drop(&mut self) {
    self.live.store(false, Ordering::Release);
  }
}

fn entry_callback(on_enter: Arc<Mutex<OnEnter>>, live: Arc<AtomicBool>) -> IntersectionCallback {
  Box::new(move |entries: &[IntersectionEntry]| {
    if !live.load(Ordering::Acquire) {
      return;
    }
    if entries.iter().any(|entry| entry.is_intersecting) {
      let callback = match on_enter.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
      };
      callback();
    }
  })
}

fn render_children(children: Option<&str>) -> Vec<Line<'static>> {
  children.map(|text| text.lines().map(|line| Line::from(line.to_string())).collect()).unwrap_or_default()
}
