use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::time::sleep;

use crate::components::traits::{batch_source::BatchSource, item::Item};

pub struct GallerySource {
  latency: Duration,
}

impl GallerySource {
  pub fn new(latency: Duration) -> Self {
    GallerySource { latency }
  }

  pub fn item(id: u64) -> Item {
    Item::new(id, format!("https://picsum.photos/seed/{id}/200/200"))
  }
}

#[async_trait]
impl BatchSource for GallerySource {
  async fn fetch_batch(&self, offset: usize, count: usize) -> Result<Vec<Item>> {
    sleep(self.latency).await;
    Ok((offset as u64 + 1..=(offset + count) as u64).map(GallerySource::item).collect())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[tokio::test]
  async fn test_fetch_batch_continues_after_offset() {
    let source = GallerySource::new(Duration::ZERO);

    let items = source.fetch_batch(20, 3).await.unwrap();

    assert_eq!(items, vec![
      Item::new(21, "https://picsum.photos/seed/21/200/200"),
      Item::new(22, "https://picsum.photos/seed/22/200/200"),
      Item::new(23, "https://picsum.photos/seed/23/200/200"),
    ]);
  }

  #[tokio::test]
  async fn test_fetch_empty_batch() {
    let source = GallerySource::new(Duration::ZERO);

    assert!(source.fetch_batch(5, 0).await.unwrap().is_empty());
  }
}
