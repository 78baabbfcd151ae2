use std::fmt;
use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Key assigned by the content source, e.g. `python/hello-world`.
/// May contain `/` when the source groups posts in namespaces.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        PostId(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub category: String,
    pub excerpt: String,
    /// Rendered html. None when the post was loaded header only.
    pub content: Option<String>,
    pub date: String,
    pub read_time: String,
    pub featured: bool,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

impl Post {
    pub fn new(id: PostId, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            category: String::new(),
            excerpt: String::new(),
            content: None,
            date: String::new(),
            read_time: String::new(),
            featured: false,
            author: None,
            tags: vec![],
        }
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, date={}, author={}, category={}\ntitle={}\nexcerpt={}",
               self.id,
               self.date,
               self.author.as_deref().unwrap_or(""),
               self.category,
               self.title,
               self.excerpt,
        )
    }
}
