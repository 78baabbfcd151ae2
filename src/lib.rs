pub mod config;
pub mod content;
pub mod enumerator;
pub mod logger;
pub mod post;
pub mod resolver;
pub mod server;
pub mod site_builder;
pub mod slug;
pub mod view;
mod text_utils;
mod test_data;

pub use content::file_source::FileContentSource;
pub use content::{ContentSource, MemoryContentSource};
pub use enumerator::{enumerate_page_params, find_slug_collisions, PageParams, SlugCollision};
pub use post::{Post, PostId};
pub use resolver::{PostPage, SlugResolver};
pub use slug::{derive_slug, Slug};
