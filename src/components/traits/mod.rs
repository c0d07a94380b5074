pub mod batch_source;
pub mod item;
pub mod item_renderer;
