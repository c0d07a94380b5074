use async_trait::async_trait;
use color_eyre::Result;

use super::item::Item;

/// Defines the contract for fetching the next page of an infinite list.
#[async_trait]
pub trait BatchSource: Send + Sync + 'static {
  /// Produces up to `count` items following the first `offset` items.
  async fn fetch_batch(&self, offset: usize, count: usize) -> Result<Vec<Item>>;
}
