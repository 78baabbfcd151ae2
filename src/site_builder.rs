use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{fs, io};

use rayon::prelude::*;
use spdlog::{debug, info, warn};
use walkdir::WalkDir;

use crate::content::{list_assets, ContentSource};
use crate::enumerator::{find_slug_collisions, page_params_from_ids, PageParams};
use crate::post::PostId;
use crate::resolver::{PostPage, SlugResolver};
use crate::slug::{Slug, ID_SEPARATOR};
use crate::view::list_renderer::sort_for_listing;
use crate::view::{SiteRenderer, Templates};

pub const PAGE_FILE_NAME: &str = "index.html";
pub const NOT_FOUND_FILE_NAME: &str = "404.html";
const BLOG_DIR: &str = "blog";
const PUBLIC_DIR: &str = "public";

#[derive(Debug, Default, PartialEq)]
pub struct BuildStats {
    /// One per identifier, duplicated slugs included.
    pub pages_requested: usize,
    pub pages_written: usize,
    pub collisions: usize,
    /// Files copied from directory posts next to their page.
    pub asset_files: usize,
    pub public_files: usize,
}

/// Writes the whole blog as static files:
/// `blog/<slug>/index.html` per post, `index.html`, `404.html` and `public/`.
pub struct SiteBuilder<'a> {
    pub source: &'a dyn ContentSource,
    pub templates: Templates,
    pub output_dir: PathBuf,
    pub public_dir: Option<PathBuf>,
    pub fail_on_slug_collision: bool,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(source: &'a dyn ContentSource, templates: Templates, output_dir: &Path) -> Self {
        SiteBuilder {
            source,
            templates,
            output_dir: output_dir.to_path_buf(),
            public_dir: None,
            fail_on_slug_collision: false,
        }
    }

    pub fn build(&self) -> io::Result<BuildStats> {
        let start = Instant::now();
        let renderer = SiteRenderer::new(&self.templates)?;
        let mut stats = BuildStats::default();

        // Enumeration phase: every page key is known before anything is resolved.
        let ids = self.source.list_post_ids()?;
        let params = page_params_from_ids(&ids);
        stats.pages_requested = params.len();

        let collisions = find_slug_collisions(&ids);
        for collision in collisions.iter() {
            let shadowed: Vec<&str> = collision.shadowed.iter().map(|id| id.as_str()).collect();
            warn!("Slug {} is used by {} and {}. Only {} is reachable through /blog/{}",
                collision.slug, collision.reachable, shadowed.join(", "), collision.reachable, collision.slug);
        }
        stats.collisions = collisions.len();
        if self.fail_on_slug_collision && !collisions.is_empty() {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("{} slug collision(s) found, first one is {}", collisions.len(), collisions[0].slug),
            ));
        }

        let blog_dir = self.output_dir.join(BLOG_DIR);
        if blog_dir.exists() {
            debug!("Cleaning {}", blog_dir.display());
            fs::remove_dir_all(&blog_dir)?;
        }
        fs::create_dir_all(&blog_dir)?;

        // Resolution phase: each page is resolved on its own against the listing
        // taken above, so the source is walked once per build.
        let pages = unique_pages(&params);
        info!("Generating {} post pages", pages.len());
        let resolver = SlugResolver::new(self.source);
        let written: Vec<io::Result<usize>> = pages
            .par_iter()
            .map(|slug| {
                let page_dir = blog_dir.join(slug.as_str());
                match resolver.resolve_page_in(&ids, slug.as_str())? {
                    PostPage::Found(post) => {
                        write_file(&page_dir.join(PAGE_FILE_NAME), &renderer.post.render(&post))?;
                        self.copy_assets(&post.id, &page_dir)
                    }
                    PostPage::NotFound(slug) => {
                        write_file(&page_dir.join(PAGE_FILE_NAME), &renderer.not_found.render(Some(&slug)))?;
                        Ok(0)
                    }
                }
            })
            .collect();
        for result in written {
            stats.asset_files += result?;
            stats.pages_written += 1;
        }

        let mut posts = ids.iter()
            .map(|id| self.source.get_post_summary(id))
            .collect::<io::Result<Vec<_>>>()?;
        sort_for_listing(&mut posts);
        write_file(&self.output_dir.join(PAGE_FILE_NAME), &renderer.render_list(&posts))?;
        write_file(&self.output_dir.join(NOT_FOUND_FILE_NAME), &renderer.not_found.render(None))?;

        if let Some(ref public_dir) = self.public_dir {
            stats.public_files = copy_dir(public_dir, &self.output_dir.join(PUBLIC_DIR))?;
        }

        info!("Build complete: {} pages written, {} requested, {} collisions, {} assets, {} public files in {} ms",
            stats.pages_written, stats.pages_requested, stats.collisions, stats.asset_files, stats.public_files,
            start.elapsed().as_millis());

        Ok(stats)
    }

    /// Copies the files of a directory post next to its page, so relative links keep working.
    fn copy_assets(&self, id: &PostId, page_dir: &Path) -> io::Result<usize> {
        let Some(asset_dir) = self.source.asset_dir(id)? else {
            return Ok(0);
        };

        let mut count = 0;
        for asset in list_assets(&asset_dir)? {
            let Some(file_name) = asset.file_name() else {
                continue;
            };
            if file_name == PAGE_FILE_NAME {
                warn!("Skipping {}, it would replace the page of {}", asset.display(), id);
                continue;
            }
            fs::copy(&asset, page_dir.join(file_name))?;
            count += 1;
        }
        if count > 0 {
            debug!("Copied {} files of {} into {}", count, id, page_dir.display());
        }
        Ok(count)
    }
}

/// Slugs to write, first occurrence order. Slugs that can't be a directory name are skipped.
fn unique_pages(params: &[PageParams]) -> Vec<Slug> {
    let mut seen = HashSet::new();
    let mut pages = vec![];
    for param in params {
        if !is_valid_page_name(param.slug.as_str()) {
            warn!("Skipping page with slug [{}]", param.slug);
            continue;
        }
        if seen.insert(param.slug.clone()) {
            pages.push(param.slug.clone());
        }
    }
    pages
}

fn is_valid_page_name(slug: &str) -> bool {
    !(slug.is_empty() || slug == "." || slug == ".." || slug.contains(ID_SEPARATOR) || slug.contains('\\'))
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

fn copy_dir(from: &Path, to: &Path) -> io::Result<usize> {
    if !from.is_dir() {
        warn!("Public directory {} does not exist, skipping", from.display());
        return Ok(0);
    }

    let mut count = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry.path().strip_prefix(from).map_err(io::Error::other)?;
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            count += 1;
        }
    }
    Ok(count)
}
