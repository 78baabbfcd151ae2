use std::io;
use std::io::ErrorKind;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::resolver::PostPage;
use crate::slug::Slug;
use crate::view::list_renderer::ListRenderer;
use crate::view::not_found_renderer::NotFoundRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::post::Post;

pub mod list_renderer;
pub mod not_found_renderer;
pub mod post_renderer;

pub const POST_TEMPLATE: &str = "post.tpl";
pub const NOT_FOUND_TEMPLATE: &str = "notfound.tpl";
pub const LIST_TEMPLATE: &str = "postlist.tpl";

pub const BLOG_PREFIX: &str = "/blog";
pub const HOME_LINK: &str = "/";

// Everything a browser would not keep inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ').add(b'"').add(b'#').add(b'<').add(b'>').add(b'?').add(b'`')
    .add(b'{').add(b'}').add(b'/').add(b'%').add(b'\\');

/// Link to a post page. The slug is percent-encoded, the server gets it back decoded.
pub fn post_link(slug: &Slug) -> String {
    format!("{}/{}", BLOG_PREFIX, utf8_percent_encode(slug.as_str(), PATH_SEGMENT))
}

#[derive(ramhorns::Content)]
pub(crate) struct ViewTag<'a> {
    pub tag: &'a str,
}

/// Template sources, read once from the template directory.
pub struct Templates {
    pub post: String,
    pub not_found: String,
    pub list: String,
}

impl Templates {
    pub fn load(template_dir: &Path) -> io::Result<Templates> {
        Ok(Templates {
            post: read_template(template_dir, POST_TEMPLATE)?,
            not_found: read_template(template_dir, NOT_FOUND_TEMPLATE)?,
            list: read_template(template_dir, LIST_TEMPLATE)?,
        })
    }
}

pub fn read_template(template_dir: &Path, file_name: &str) -> io::Result<String> {
    let full_path = template_dir.join(file_name);
    std::fs::read_to_string(&full_path).map_err(|e| {
        io::Error::new(e.kind(), format!("Error loading template {}: {}", full_path.display(), e))
    })
}

pub(crate) fn template_error(name: &str, e: ramhorns::Error) -> io::Error {
    io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e))
}

/// The three views of the blog, parsed and ready to render.
pub struct SiteRenderer<'a> {
    pub post: PostRenderer<'a>,
    pub not_found: NotFoundRenderer<'a>,
    pub list: ListRenderer<'a>,
}

impl<'a> SiteRenderer<'a> {
    pub fn new(templates: &'a Templates) -> io::Result<SiteRenderer<'a>> {
        Ok(SiteRenderer {
            post: PostRenderer::new(&templates.post)?,
            not_found: NotFoundRenderer::new(&templates.not_found)?,
            list: ListRenderer::new(&templates.list)?,
        })
    }

    pub fn render_page(&self, page: &PostPage) -> String {
        match page {
            PostPage::Found(post) => self.post.render(post),
            PostPage::NotFound(slug) => self.not_found.render(Some(slug)),
        }
    }

    pub fn render_list(&self, posts: &[Post]) -> String {
        self.list.render(posts)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::post::PostId;

    use super::*;

    #[test]
    fn test_post_link() {
        assert_eq!(post_link(&Slug("hello-world".to_string())), "/blog/hello-world");
    }

    #[test]
    fn test_post_link_encodes_segment() {
        for (slug, link) in [
            ("c#-tips", "/blog/c%23-tips"),
            ("what now?", "/blog/what%20now%3F"),
            ("100%", "/blog/100%25"),
            ("café", "/blog/caf%C3%A9"),
        ] {
            let res = post_link(&Slug(slug.to_string()));
            assert_eq!(res, link);

            let segment = res.strip_prefix("/blog/").unwrap();
            let decoded = percent_encoding::percent_decode_str(segment).decode_utf8().unwrap();
            assert_eq!(decoded, slug);
        }
    }

    #[test]
    fn test_load_templates() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(POST_TEMPLATE), "P={{title}}").unwrap();
        fs::write(tmp.path().join(NOT_FOUND_TEMPLATE), "NF={{slug}}").unwrap();
        fs::write(tmp.path().join(LIST_TEMPLATE), "L={{#post_list}}[{{title}}]{{/post_list}}").unwrap();

        let templates = Templates::load(tmp.path()).unwrap();
        let renderer = SiteRenderer::new(&templates).unwrap();

        let post = Post::new(PostId::new("posts/a"), "A");
        assert_eq!(renderer.render_page(&PostPage::Found(post.clone())), "P=A");
        assert_eq!(renderer.render_page(&PostPage::NotFound(Slug("zz".to_string()))), "NF=zz");
        assert_eq!(renderer.render_list(&[post]), "L=[A]");
    }

    #[test]
    fn test_missing_template() {
        let tmp = TempDir::new().unwrap();
        let err = Templates::load(tmp.path()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains(POST_TEMPLATE));
    }
}
