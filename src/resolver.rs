use std::io;

use spdlog::debug;

use crate::content::ContentSource;
use crate::post::{Post, PostId};
use crate::slug::{matches_slug, Slug};

/// Outcome of resolving a `/blog/{slug}` request.
#[derive(Debug, Clone, PartialEq)]
pub enum PostPage {
    Found(Post),
    NotFound(Slug),
}

/// First identifier of `ids` reached by `slug`, see `matches_slug`.
pub fn find_post_id<'i>(ids: &'i [PostId], slug: &str) -> Option<&'i PostId> {
    ids.iter().find(|id| matches_slug(id, slug))
}

/// Maps slug -> identifier -> post over a content source.
pub struct SlugResolver<'a> {
    source: &'a dyn ContentSource,
}

impl<'a> SlugResolver<'a> {
    pub fn new(source: &'a dyn ContentSource) -> Self {
        SlugResolver { source }
    }

    /// Finds the identifier a slug points to.
    ///
    /// The first identifier, in the source's listing order, whose slug or raw
    /// value equals `slug` wins. `Ok(None)` means no post has that slug.
    /// `slug` is expected to be already url decoded.
    pub fn resolve_slug(&self, slug: &str) -> io::Result<Option<PostId>> {
        let ids = self.source.list_post_ids()?;
        Ok(find_post_id(&ids, slug).cloned())
    }

    /// Straight to the content source. Unknown identifiers are its error to raise.
    pub fn get_post(&self, id: &PostId) -> io::Result<Post> {
        self.source.get_post_data(id)
    }

    pub fn resolve_page(&self, slug: &str) -> io::Result<PostPage> {
        let ids = self.source.list_post_ids()?;
        self.resolve_page_in(&ids, slug)
    }

    /// Same as `resolve_page` over an identifier list taken earlier from the
    /// same source. Lets a build list the source once for all its pages.
    pub fn resolve_page_in(&self, ids: &[PostId], slug: &str) -> io::Result<PostPage> {
        match find_post_id(ids, slug) {
            Some(id) => {
                debug!("Slug {} resolved to {}", slug, id);
                Ok(PostPage::Found(self.get_post(id)?))
            }
            None => {
                debug!("Slug {} not found", slug);
                Ok(PostPage::NotFound(Slug(slug.to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use crate::content::MemoryContentSource;
    use crate::slug::derive_slug;

    use super::*;

    fn source_with(ids: &[&str]) -> MemoryContentSource {
        let posts = ids.iter()
            .map(|id| Post::new(PostId::new(*id), &format!("Title of {}", id)))
            .collect();
        MemoryContentSource::from_posts(posts)
    }

    struct BrokenSource;

    impl ContentSource for BrokenSource {
        fn list_post_ids(&self) -> io::Result<Vec<PostId>> {
            Err(io::Error::new(ErrorKind::Other, "storage is gone"))
        }

        fn get_post_data(&self, id: &PostId) -> io::Result<Post> {
            Err(io::Error::new(ErrorKind::NotFound, format!("Could not find post {}", id)))
        }
    }

    #[test]
    fn test_slug_and_raw_id() {
        let source = source_with(&["posts/hello-world"]);
        let resolver = SlugResolver::new(&source);

        assert_eq!(resolver.resolve_slug("hello-world").unwrap(), Some(PostId::new("posts/hello-world")));
        assert_eq!(resolver.resolve_slug("posts/hello-world").unwrap(), Some(PostId::new("posts/hello-world")));
    }

    #[test]
    fn test_collision_first_wins() {
        let source = source_with(&["a", "dir/a"]);
        let resolver = SlugResolver::new(&source);

        assert_eq!(resolver.resolve_slug("a").unwrap(), Some(PostId::new("a")));
        assert_eq!(resolver.resolve_slug("dir/a").unwrap(), Some(PostId::new("dir/a")));
    }

    #[test]
    fn test_collision_follows_listing_order() {
        let source = source_with(&["dir/a", "a"]);
        let resolver = SlugResolver::new(&source);
        assert_eq!(resolver.resolve_slug("a").unwrap(), Some(PostId::new("dir/a")));
    }

    #[test]
    fn test_not_found() {
        let source = source_with(&["posts/hello-world", "flat"]);
        let resolver = SlugResolver::new(&source);

        assert_eq!(resolver.resolve_slug("does-not-exist").unwrap(), None);
        assert_eq!(resolver.resolve_slug("posts").unwrap(), None);
        assert_eq!(resolver.resolve_slug("").unwrap(), None);
        assert_eq!(resolver.resolve_slug("hello-world/").unwrap(), None);
    }

    #[test]
    fn test_empty_source() {
        let source = MemoryContentSource::new();
        let resolver = SlugResolver::new(&source);
        assert_eq!(resolver.resolve_slug("anything").unwrap(), None);
    }

    #[test]
    fn test_every_slug_resolves_to_a_post_with_that_slug() {
        let source = source_with(&["a", "dir/a", "x/y/z", "posts/hello-world", "z"]);
        let resolver = SlugResolver::new(&source);

        for id in source.list_post_ids().unwrap() {
            let slug = derive_slug(&id);
            let found = resolver.resolve_slug(slug.as_str()).unwrap().unwrap();
            assert_eq!(derive_slug(&found), slug);
        }
    }

    #[test]
    fn test_idempotent() {
        let source = source_with(&["a", "dir/a", "posts/hello-world"]);
        let resolver = SlugResolver::new(&source);
        for slug in ["a", "hello-world", "missing"] {
            assert_eq!(resolver.resolve_slug(slug).unwrap(), resolver.resolve_slug(slug).unwrap());
        }
    }

    #[test]
    fn test_resolve_page() {
        let source = source_with(&["posts/hello-world"]);
        let resolver = SlugResolver::new(&source);

        match resolver.resolve_page("hello-world").unwrap() {
            PostPage::Found(post) => {
                assert_eq!(post.id, PostId::new("posts/hello-world"));
                assert_eq!(post.title, "Title of posts/hello-world");
            }
            PostPage::NotFound(slug) => panic!("{} should resolve", slug),
        }

        assert_eq!(resolver.resolve_page("does-not-exist").unwrap(), PostPage::NotFound(Slug("does-not-exist".to_string())));
    }

    #[test]
    fn test_resolve_page_in_snapshot() {
        let source = source_with(&["a", "dir/a", "posts/hello-world"]);
        let resolver = SlugResolver::new(&source);
        let ids = source.list_post_ids().unwrap();

        for slug in ["a", "dir/a", "hello-world", "missing"] {
            assert_eq!(resolver.resolve_page_in(&ids, slug).unwrap(), resolver.resolve_page(slug).unwrap());
        }
        assert_eq!(find_post_id(&ids, "a"), Some(&PostId::new("a")));
        assert_eq!(find_post_id(&[], "a"), None);
    }

    #[test]
    fn test_source_failure_propagates() {
        let resolver = SlugResolver::new(&BrokenSource);
        assert_eq!(resolver.resolve_slug("a").unwrap_err().kind(), ErrorKind::Other);
        assert!(resolver.resolve_page("a").is_err());
        assert_eq!(resolver.get_post(&PostId::new("a")).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
