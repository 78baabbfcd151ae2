use std::io;

use ramhorns::Template;

use crate::post::Post;
use crate::view::{template_error, ViewTag, HOME_LINK};

pub const CONTENT_PENDING: &str = "Content is loading...";

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    featured: bool,
    date: &'a str,
    read_time: &'a str,
    author: &'a str,
    has_author: bool,
    excerpt: &'a str,
    post_content: &'a str,
    tags: &'a Vec<ViewTag<'a>>,
    has_tags: bool,
    home_link: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl<'a> PostRenderer<'a> {
    pub fn new(view_tpl_src: &'a str) -> io::Result<PostRenderer<'a>> {
        let template = Template::new(view_tpl_src).map_err(|e| template_error("post view", e))?;
        Ok(PostRenderer { template })
    }

    pub fn render(&self, post: &Post) -> String {
        let tags: &Vec<ViewTag> = &post.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect();
        self.template.render(&ViewItem {
            id: post.id.as_str(),
            title: post.title.as_str(),
            category: post.category.as_str(),
            featured: post.featured,
            date: post.date.as_str(),
            read_time: post.read_time.as_str(),
            author: post.author.as_deref().unwrap_or_default(),
            has_author: post.author.is_some(),
            excerpt: post.excerpt.as_str(),
            post_content: post.content.as_deref().unwrap_or(CONTENT_PENDING),
            tags,
            has_tags: !tags.is_empty(),
            home_link: HOME_LINK,
        })
    }
}
