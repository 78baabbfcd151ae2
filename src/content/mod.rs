use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::post::{Post, PostId};

pub mod file_source;
pub mod parsing_utils;

/// Where posts come from.
///
/// `list_post_ids` must return identifiers in a stable, deterministic order:
/// calling it twice over unchanged content yields the same sequence. Slug
/// collisions are broken by this order, so it is part of the contract.
///
/// Implementations are shared between request handlers and build workers,
/// hence `Send + Sync`.
pub trait ContentSource: Send + Sync {
    fn list_post_ids(&self) -> io::Result<Vec<PostId>>;

    /// Fails with `ErrorKind::NotFound` when the identifier is unknown.
    fn get_post_data(&self, id: &PostId) -> io::Result<Post>;

    /// Same as `get_post_data`, without the body. Used by the listing page.
    fn get_post_summary(&self, id: &PostId) -> io::Result<Post> {
        let mut post = self.get_post_data(id)?;
        post.content = None;
        Ok(post)
    }

    /// Directory holding the files a post links to relatively, like images.
    /// Only posts stored as a directory have one.
    fn asset_dir(&self, _id: &PostId) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Files next to a post that can be published with it. Markdown sources,
/// hidden files and names that leave the directory are not.
pub fn is_asset_name(file_name: &str) -> bool {
    !(file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains('/')
        || file_name.contains('\\')
        || Path::new(file_name).extension().and_then(|e| e.to_str()) == Some(file_source::POST_EXTENSION))
}

/// Asset of the post `id` named `file_name`, if both exist.
pub fn asset_path(source: &dyn ContentSource, id: &PostId, file_name: &str) -> io::Result<Option<PathBuf>> {
    if !is_asset_name(file_name) {
        return Ok(None);
    }
    let Some(dir) = source.asset_dir(id)? else {
        return Ok(None);
    };
    let path = dir.join(file_name);
    Ok(if path.is_file() { Some(path) } else { None })
}

/// Every asset file of a directory post, sorted by name. Subdirectories are
/// left out, they may hold posts of their own.
pub fn list_assets(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut assets = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_asset_name) {
            assets.push(entry.path());
        }
    }
    assets.sort();
    Ok(assets)
}

/// Posts kept in memory in insertion order.
#[derive(Default)]
pub struct MemoryContentSource {
    posts: Vec<Post>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        MemoryContentSource::default()
    }

    pub fn from_posts(posts: Vec<Post>) -> Self {
        MemoryContentSource { posts }
    }

    /// Adds a post, replacing one that already has the same identifier in place.
    pub fn add(&mut self, post: Post) {
        match self.posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => *existing = post,
            None => self.posts.push(post),
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl ContentSource for MemoryContentSource {
    fn list_post_ids(&self) -> io::Result<Vec<PostId>> {
        Ok(self.posts.iter().map(|p| p.id.clone()).collect())
    }

    fn get_post_data(&self, id: &PostId) -> io::Result<Post> {
        self.posts.iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, format!("Could not find post {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut source = MemoryContentSource::new();
        source.add(Post::new(PostId::new("z"), "Z"));
        source.add(Post::new(PostId::new("a"), "A"));
        source.add(Post::new(PostId::new("m/b"), "B"));

        let ids = source.list_post_ids().unwrap();
        assert_eq!(ids, vec![PostId::new("z"), PostId::new("a"), PostId::new("m/b")]);
    }

    #[test]
    fn test_add_replaces_in_place() {
        let mut source = MemoryContentSource::new();
        source.add(Post::new(PostId::new("a"), "First"));
        source.add(Post::new(PostId::new("b"), "B"));
        source.add(Post::new(PostId::new("a"), "Second"));

        assert_eq!(source.len(), 2);
        assert_eq!(source.list_post_ids().unwrap(), vec![PostId::new("a"), PostId::new("b")]);
        assert_eq!(source.get_post_data(&PostId::new("a")).unwrap().title, "Second");
    }

    #[test]
    fn test_is_asset_name() {
        for name in ["diagram.png", "data.tar.gz", "notes.txt", "Makefile"] {
            assert!(is_asset_name(name), "{}", name);
        }
        for name in ["", "index.md", "other.md", ".hidden", "..", "../secret.png", "img/a.png", "a\\b.png"] {
            assert!(!is_asset_name(name), "{}", name);
        }
    }

    #[test]
    fn test_memory_source_has_no_assets() {
        let source = MemoryContentSource::from_posts(vec![Post::new(PostId::new("a"), "A")]);
        assert_eq!(source.asset_dir(&PostId::new("a")).unwrap(), None);
        assert_eq!(asset_path(&source, &PostId::new("a"), "x.png").unwrap(), None);
    }

    #[test]
    fn test_unknown_id() {
        let source = MemoryContentSource::new();
        assert!(source.is_empty());
        let err = source.get_post_data(&PostId::new("missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
