mod random_item;
mod random_source;

use std::sync::Arc;

use color_eyre::Result;
pub use random_item::RandomItem;
pub use random_source::RandomSource;

use crate::{
  action::Feed,
  components::shared::infinite_list::{InfiniteList, ListSettings},
  config::FeedConfig,
  observer::ObservationConfig,
};

/// Loads once the last row is reached; the marker itself shows the loading text.
pub type RandomFeed = InfiniteList<RandomSource, RandomItem>;

impl RandomFeed {
  pub fn from_config(config: &FeedConfig) -> Result<Self> {
    let settings = ListSettings {
      title: "Random",
      total: config.total,
      batch_size: config.batch_size()?,
      preload: 0,
      observation: ObservationConfig::new(&config.root_margin, config.threshold)?,
      marker_text: Some(Arc::from("Loading more ...")),
      loading_notice: false,
      end_text: None,
    };
    Ok(InfiniteList::new(Feed::Random, RandomSource::new(config.latency()), RandomItem, settings))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_batch_size_is_rejected() {
    let config = FeedConfig { batch_size: 0, ..FeedConfig::default() };

    assert!(RandomFeed::from_config(&config).is_err());
  }
}
