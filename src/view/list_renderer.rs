use std::io;

use ramhorns::Template;

use crate::post::Post;
use crate::slug::derive_slug;
use crate::view::{post_link, template_error, ViewTag};

/// How many posts make the "featured" block of the listing page.
pub const FEATURED_COUNT: usize = 3;

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    featured_posts: Vec<PostItem<'a>>,
    post_list: Vec<PostItem<'a>>,
    post_count: usize,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    link: String,
    title: &'a str,
    category: &'a str,
    featured: bool,
    excerpt: &'a str,
    date: &'a str,
    read_time: &'a str,
    tags: Vec<ViewTag<'a>>,
}

impl<'a> PostItem<'a> {
    fn from(post: &'a Post) -> Self {
        PostItem {
            link: post_link(&derive_slug(&post.id)),
            title: post.title.as_str(),
            category: post.category.as_str(),
            featured: post.featured,
            excerpt: post.excerpt.as_str(),
            date: post.date.as_str(),
            read_time: post.read_time.as_str(),
            tags: post.tags.iter().map(|t| ViewTag { tag: t.as_str() }).collect(),
        }
    }
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl<'a> ListRenderer<'a> {
    pub fn new(list_tpl_src: &'a str) -> io::Result<ListRenderer<'a>> {
        let template = Template::new(list_tpl_src).map_err(|e| template_error("list", e))?;
        Ok(ListRenderer { template })
    }

    /// Posts are shown in the given order, the first ones also go to the featured block.
    pub fn render(&self, posts: &[Post]) -> String {
        let featured_posts = posts.iter().take(FEATURED_COUNT).map(PostItem::from).collect();
        let post_list = posts.iter().map(PostItem::from).collect();

        self.template.render(&ListPage {
            featured_posts,
            post_list,
            post_count: posts.len(),
        })
    }
}

/// Newest first. Dates are display strings, `YYYY-MM-DD` ones sort correctly.
/// Posts with the same date keep the content source order.
pub fn sort_for_listing(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}
