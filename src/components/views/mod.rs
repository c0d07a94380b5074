pub mod error_view;
pub mod gallery;
pub mod random_feed;

pub use error_view::view::ErrorView;
pub use gallery::GalleryFeed;
pub use random_feed::RandomFeed;
