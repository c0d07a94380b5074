use clap::Parser;

use crate::{app::View, config::FeedConfig, utils::version};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 10.0)]
  pub tick_rate: f64,

  #[arg(short, long, value_name = "FLOAT", help = "Frame rate, i.e. number of frames per second", default_value_t = 30.0)]
  pub frame_rate: f64,

  #[arg(long, value_enum, help = "List shown on start", default_value_t = View::Gallery)]
  pub view: View,

  #[arg(long, value_name = "MS", help = "Simulated latency of every batch fetch")]
  pub latency_ms: Option<u64>,

  #[arg(long, value_name = "COUNT", help = "Number of items available in each list")]
  pub total: Option<usize>,

  #[arg(long, value_name = "COUNT", help = "Number of items fetched per batch")]
  pub batch_size: Option<usize>,

  #[arg(long, value_name = "COUNT", help = "Items kept below the gallery load marker")]
  pub preload: Option<usize>,

  #[arg(long, value_name = "MARGIN", help = "Root margin for load markers, e.g. \"0px 0px 5px 0px\"")]
  pub root_margin: Option<String>,

  #[arg(long, value_name = "FLOAT", help = "Visible fraction of a marker that counts as entered")]
  pub threshold: Option<f64>,
}

impl Cli {
  /// Overrides configured feed values with the ones given on the command line.
  pub fn apply(&self, feed: &mut FeedConfig) {
    if let Some(latency_ms) = self.latency_ms {
      feed.latency_ms = latency_ms;
    }
    if let Some(total) = self.total {
      feed.total = total;
    }
    if let Some(batch_size) = self.batch_size {
      feed.batch_size = batch_size;
    }
    if let Some(preload) = self.preload {
      feed.preload = preload;
    }
    if let Some(root_margin) = &self.root_margin {
      feed.root_margin = root_margin.clone();
    }
    if let Some(threshold) = self.threshold {
      feed.threshold = threshold;
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn test_defaults_keep_config() {
    let cli = Cli::parse_from(["lazy-load-marker"]);
    let mut feed = FeedConfig::default();

    cli.apply(&mut feed);

    assert_eq!(feed, FeedConfig::default());
    assert_eq!(cli.view, View::Gallery);
  }

  #[test]
  fn test_flags_override_config() {
    let cli = Cli::parse_from([
      "lazy-load-marker",
      "--latency-ms",
      "0",
      "--total",
      "30",
      "--batch-size",
      "7",
      "--root-margin",
      "2px",
      "--view",
      "random",
    ]);
    let mut feed = FeedConfig::default();

    cli.apply(&mut feed);

    assert_eq!(feed.latency_ms, 0);
    assert_eq!(feed.total, 30);
    assert_eq!(feed.batch_size, 7);
    assert_eq!(feed.preload, 5);
    assert_eq!(feed.root_margin, "2px");
    assert_eq!(cli.view, View::Random);
  }
}
