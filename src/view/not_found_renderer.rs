use std::io;

use ramhorns::Template;

use crate::slug::Slug;
use crate::view::{template_error, HOME_LINK};

#[derive(ramhorns::Content)]
struct NotFoundPage<'a> {
    slug: &'a str,
    has_slug: bool,
    home_link: &'a str,
}

/// Fallback page for slugs that point nowhere.
pub struct NotFoundRenderer<'a> {
    pub template: Template<'a>,
}

impl<'a> NotFoundRenderer<'a> {
    pub fn new(tpl_src: &'a str) -> io::Result<NotFoundRenderer<'a>> {
        let template = Template::new(tpl_src).map_err(|e| template_error("not found", e))?;
        Ok(NotFoundRenderer { template })
    }

    /// `slug` is None for the generic 404 page written by the site builder.
    pub fn render(&self, slug: Option<&Slug>) -> String {
        self.template.render(&NotFoundPage {
            slug: slug.map(|s| s.as_str()).unwrap_or_default(),
            has_slug: slug.is_some(),
            home_link: HOME_LINK,
        })
    }
}
