use std::{collections::HashMap, path::PathBuf, time::Duration};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{Deserialize, de::Deserializer};
use tracing::warn;

use crate::{action::Action, error::Error, mode::Mode};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
}

/// Parameters shared by both demo lists.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
  pub total: usize,
  pub batch_size: usize,
  pub preload: usize,
  pub latency_ms: u64,
  pub root_margin: String,
  pub threshold: f64,
}

impl Default for FeedConfig {
  fn default() -> Self {
    FeedConfig {
      total: 100,
      batch_size: 10,
      preload: 5,
      latency_ms: 1000,
      root_margin: "0px".to_string(),
      threshold: 0.0,
    }
  }
}

impl FeedConfig {
  pub fn latency(&self) -> Duration {
    Duration::from_millis(self.latency_ms)
  }

  /// Batch size that can make progress. A zero batch would leave the list
  /// requesting nothing forever.
  pub fn batch_size(&self) -> Result<usize, Error> {
    match self.batch_size {
      0 => Err(Error::InvalidBatchSize),
      size => Ok(size),
    }
  }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
  #[serde(default, flatten)]
  pub config: AppConfig,
  #[serde(default)]
  pub keybindings: KeyBindings,
  #[serde(default)]
  pub feed: FeedConfig,
}

impl Config {
  pub fn new() -> Result<Self, config::ConfigError> {
    let default_config: Config = json5::from_str(CONFIG).map_err(|e| config::ConfigError::Message(e.to_string()))?;
    let data_dir = crate::utils::get_data_dir();
    let config_dir = crate::utils::get_config_dir();
    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("_config_dir", config_dir.to_string_lossy().to_string())?;

    let config_files = [
      ("config.json5", config::FileFormat::Json5),
      ("config.json", config::FileFormat::Json),
      ("config.yaml", config::FileFormat::Yaml),
      ("config.toml", config::FileFormat::Toml),
      ("config.ini", config::FileFormat::Ini),
    ];
    let mut found_config = false;
    for (file, format) in &config_files {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
      if config_dir.join(file).exists() {
        found_config = true
      }
    }
    if !found_config {
      warn!("No configuration file found in {}, using defaults", config_dir.display());
    }

    let mut cfg: Self = builder.build()?.try_deserialize()?;

    for (mode, default_bindings) in default_config.keybindings.iter() {
      let user_bindings = cfg.keybindings.entry(*mode).or_default();
      for (key, cmd) in default_bindings.iter() {
        user_bindings.entry(key.clone()).or_insert_with(|| cmd.clone());
      }
    }

    Ok(cfg)
  }
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<Mode, HashMap<Vec<KeyEvent>, Action>>);

impl<'de> Deserialize<'de> for KeyBindings {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let parsed_map = HashMap::<Mode, HashMap<String, Action>>::deserialize(deserializer)?;

    let mut keybindings = HashMap::new();
    for (mode, inner_map) in parsed_map {
      let mut converted = HashMap::new();
      for (key_str, cmd) in inner_map {
        converted.insert(parse_key_sequence(&key_str).map_err(serde::de::Error::custom)?, cmd);
      }
      keybindings.insert(mode, converted);
    }

    Ok(KeyBindings(keybindings))
  }
}

fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
  let raw_lower = raw.to_ascii_lowercase();
  let (remaining, modifiers) = extract_modifiers(&raw_lower);
  parse_key_code_with_modifiers(remaining, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
  let mut modifiers = KeyModifiers::empty();
  let mut current = raw;

  loop {
    if let Some(rest) = current.strip_prefix("ctrl-") {
      modifiers.insert(KeyModifiers::CONTROL);
      current = rest;
    } else if let Some(rest) = current.strip_prefix("alt-") {
      modifiers.insert(KeyModifiers::ALT);
      current = rest;
    } else if let Some(rest) = current.strip_prefix("shift-") {
      modifiers.insert(KeyModifiers::SHIFT);
      current = rest;
    } else {
      break;
    }
  }

  (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, mut modifiers: KeyModifiers) -> Result<KeyEvent, String> {
  let c = match raw {
    "esc" => KeyCode::Esc,
    "enter" => KeyCode::Enter,
    "left" => KeyCode::Left,
    "right" => KeyCode::Right,
    "up" => KeyCode::Up,
    "down" => KeyCode::Down,
    "home" => KeyCode::Home,
    "end" => KeyCode::End,
    "pageup" => KeyCode::PageUp,
    "pagedown" => KeyCode::PageDown,
    "backtab" => {
      modifiers.insert(KeyModifiers::SHIFT);
      KeyCode::BackTab
    },
    "backspace" => KeyCode::Backspace,
    "delete" => KeyCode::Delete,
    "insert" => KeyCode::Insert,
    "space" => KeyCode::Char(' '),
    "hyphen" | "minus" => KeyCode::Char('-'),
    "tab" => KeyCode::Tab,
    c if c.chars().count() == 1 => {
      let Some(mut c) = c.chars().next() else {
        return Err(format!("Unable to parse {raw}"));
      };
      if modifiers.contains(KeyModifiers::SHIFT) {
        c = c.to_ascii_uppercase();
      }
      KeyCode::Char(c)
    },
    _ => return Err(format!("Unable to parse {raw}")),
  };
  Ok(KeyEvent::new(c, modifiers))
}

pub fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>, String> {
  if raw.chars().filter(|c| *c == '>').count() != raw.chars().filter(|c| *c == '<').count() {
    return Err(format!("Unable to parse `{}`", raw));
  }
  let raw = if !raw.contains("><") {
    let raw = raw.strip_prefix('<').unwrap_or(raw);
    raw.strip_suffix('>').unwrap_or(raw)
  } else {
    raw
  };
  raw
    .split("><")
    .map(|seq| seq.strip_prefix('<').or_else(|| seq.strip_suffix('>')).unwrap_or(seq))
    .map(parse_key_event)
    .collect()
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn test_default_config_parses() {
    let config: Config = json5::from_str(CONFIG).unwrap();

    let bindings = config.keybindings.get(&Mode::Default).unwrap();
    assert_eq!(bindings.get(&parse_key_sequence("<q>").unwrap()), Some(&Action::Quit));
    assert_eq!(bindings.get(&parse_key_sequence("<Tab>").unwrap()), Some(&Action::ToggleView));
    assert_eq!(config.feed, FeedConfig::default());
  }

  #[test]
  fn test_partial_feed_config_keeps_defaults() {
    let config: Config = json5::from_str(r#"{ "feed": { "latency_ms": 0, "root_margin": "1px 2px" } }"#).unwrap();

    assert_eq!(config.feed.latency(), Duration::ZERO);
    assert_eq!(config.feed.root_margin, "1px 2px");
    assert_eq!(config.feed.total, 100);
  }

  #[test]
  fn test_zero_batch_size_is_rejected() {
    let config = FeedConfig { batch_size: 0, ..FeedConfig::default() };

    assert_eq!(config.batch_size(), Err(Error::InvalidBatchSize));
    assert_eq!(FeedConfig::default().batch_size(), Ok(10));
  }

  #[test]
  fn test_simple_keys() {
    assert_eq!(parse_key_event("a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::empty()));
    assert_eq!(parse_key_event("tab").unwrap(), KeyEvent::new(KeyCode::Tab, KeyModifiers::empty()));
    assert_eq!(parse_key_event("pagedown").unwrap(), KeyEvent::new(KeyCode::PageDown, KeyModifiers::empty()));
  }

  #[test]
  fn test_with_modifiers() {
    assert_eq!(parse_key_event("ctrl-a").unwrap(), KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
    assert_eq!(parse_key_event("shift-g").unwrap(), KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT));
    assert_eq!(
      parse_key_event("ctrl-alt-z").unwrap(),
      KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL | KeyModifiers::ALT)
    );
  }

  #[test]
  fn test_key_sequences() {
    assert_eq!(parse_key_sequence("<g><g>").unwrap(), vec![
      KeyEvent::new(KeyCode::Char('g'), KeyModifiers::empty()),
      KeyEvent::new(KeyCode::Char('g'), KeyModifiers::empty()),
    ]);
    assert!(parse_key_sequence("<q").is_err());
    assert!(parse_key_event("invalid-key").is_err());
  }
}
