use std::collections::HashMap;
use std::io;

use serde::Serialize;

use crate::content::ContentSource;
use crate::post::PostId;
use crate::slug::{derive_slug, Slug};

/// One page to pre-render, `/blog/{slug}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageParams {
    pub slug: Slug,
}

/// A slug shared by several identifiers. Only `reachable` can be opened
/// through the slug, the others only through their raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCollision {
    pub slug: Slug,
    pub reachable: PostId,
    pub shadowed: Vec<PostId>,
}

/// One record per identifier, in the source's listing order. Duplicated slugs are kept.
pub fn enumerate_page_params(source: &dyn ContentSource) -> io::Result<Vec<PageParams>> {
    let ids = source.list_post_ids()?;
    Ok(page_params_from_ids(&ids))
}

pub fn page_params_from_ids(ids: &[PostId]) -> Vec<PageParams> {
    ids.iter()
        .map(|id| PageParams { slug: derive_slug(id) })
        .collect()
}

/// Collisions sorted by the position of their first identifier.
pub fn find_slug_collisions(ids: &[PostId]) -> Vec<SlugCollision> {
    let mut by_slug: HashMap<Slug, Vec<&PostId>> = HashMap::new();
    let mut order: Vec<Slug> = vec![];

    for id in ids {
        let slug = derive_slug(id);
        let entry = by_slug.entry(slug.clone()).or_default();
        if entry.is_empty() {
            order.push(slug);
        }
        entry.push(id);
    }

    order.into_iter()
        .filter_map(|slug| {
            let ids = by_slug.remove(&slug)?;
            if ids.len() < 2 {
                return None;
            }
            let (first, rest) = ids.split_first()?;
            Some(SlugCollision {
                slug,
                reachable: (*first).clone(),
                shadowed: rest.iter().map(|id| (*id).clone()).collect(),
            })
        })
        .collect()
}
