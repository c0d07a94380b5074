mod gallery_item;
mod gallery_source;

use std::sync::Arc;

use color_eyre::Result;
pub use gallery_item::GalleryItem;
pub use gallery_source::GallerySource;

use crate::{
  action::Feed,
  components::shared::infinite_list::{InfiniteList, ListSettings},
  config::FeedConfig,
  observer::ObservationConfig,
};

/// Loads while the last `preload` images are still below the fold.
pub type GalleryFeed = InfiniteList<GallerySource, GalleryItem>;

impl GalleryFeed {
  pub fn from_config(config: &FeedConfig) -> Result<Self> {
    let settings = ListSettings {
      title: "Gallery",
      total: config.total,
      batch_size: config.batch_size()?,
      preload: config.preload,
      observation: ObservationConfig::new(&config.root_margin, config.threshold)?,
      marker_text: None,
      loading_notice: true,
      end_text: Some(Arc::from("The bottom")),
    };
    Ok(InfiniteList::new(Feed::Gallery, GallerySource::new(config.latency()), GalleryItem, settings))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_batch_size_is_rejected() {
    let config = FeedConfig { batch_size: 0, ..FeedConfig::default() };

    let result = GalleryFeed::from_config(&config);

    assert!(result.is_err());
  }

  #[test]
  fn test_from_config_builds_empty_list() {
    let feed = GalleryFeed::from_config(&FeedConfig::default()).unwrap();

    assert!(feed.items().is_empty());
    assert!(feed.has_more());
  }
}
