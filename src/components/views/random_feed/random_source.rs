use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use rand::Rng;
use tokio::time::sleep;

use crate::components::traits::{batch_source::BatchSource, item::Item};

pub struct RandomSource {
  latency: Duration,
}

impl RandomSource {
  pub fn new(latency: Duration) -> Self {
    RandomSource { latency }
  }
}

#[async_trait]
impl BatchSource for RandomSource {
  async fn fetch_batch(&self, offset: usize, count: usize) -> Result<Vec<Item>> {
    sleep(self.latency).await;
    let mut rng = rand::thread_rng();
    Ok((offset as u64 + 1..=(offset + count) as u64).map(|id| Item::new(id, rng.gen_range(0.0..1.0f64).to_string())).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_fetch_batch_yields_fractions() {
    let source = RandomSource::new(Duration::ZERO);

    let items = source.fetch_batch(10, 5).await.unwrap();

    assert_eq!(items.iter().map(|item| item.id).collect::<Vec<_>>(), vec![11, 12, 13, 14, 15]);
    for item in items {
      let value: f64 = item.payload.parse().unwrap();
      assert!((0.0..1.0).contains(&value));
    }
  }
}
