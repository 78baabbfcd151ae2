use std::fmt;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::post::PostId;

pub const ID_SEPARATOR: char = '/';

/// Public short name of a post, the part that goes in `/blog/{slug}`.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Slug(pub String);

impl Slug {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last segment of the identifier, or the whole identifier if it has no separator.
pub fn derive_slug(id: &PostId) -> Slug {
    Slug(slug_str(id.as_str()).to_string())
}

pub(crate) fn slug_str(id: &str) -> &str {
    match id.rfind(ID_SEPARATOR) {
        Some(pos) => &id[pos + ID_SEPARATOR.len_utf8()..],
        None => id,
    }
}

/// True when `candidate` reaches `id`, either by its derived slug or by the raw identifier.
pub fn matches_slug(id: &PostId, candidate: &str) -> bool {
    slug_str(id.as_str()) == candidate || id.as_str() == candidate
}
