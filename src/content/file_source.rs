use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::{fs, io};

use markdown::Options;
use spdlog::{debug, warn};
use walkdir::WalkDir;

use crate::content::parsing_utils::{extract_content, first_paragraph, has_more_tag, parse_post_header, parse_title_markdown, remove_comments};
use crate::content::ContentSource;
use crate::post::{Post, PostId};
use crate::slug::{slug_str, ID_SEPARATOR};
use crate::text_utils::{display_date, estimate_read_time, strip_html};

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub(crate) const POST_EXTENSION: &str = "md";

/// Markdown posts under a directory.
///
/// `posts/python/hello.md` gets the identifier `python/hello`. A directory
/// holding `<index_base_name>.md` is a post on its own, identified by the
/// directory path, so `posts/rust/intro/index.md` becomes `rust/intro`.
/// Identifiers are listed sorted by their string value.
pub struct FileContentSource {
    pub root_dir: PathBuf,
    pub index_base_name: String,
}

impl FileContentSource {
    pub fn new(root_dir: &Path, index_base_name: &str) -> Self {
        FileContentSource {
            root_dir: root_dir.to_path_buf(),
            index_base_name: index_base_name.to_string(),
        }
    }

    fn retrieve_files(&self) -> io::Result<Vec<(PostId, PathBuf)>> {
        let mut posts: HashMap<PostId, PathBuf> = HashMap::new();

        for entry in WalkDir::new(&self.root_dir).follow_links(true) {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(id) = self.id_from_path(path) else {
                continue;
            };

            if let Some(previous) = posts.insert(id.clone(), path.to_path_buf()) {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Post identifier {} is used by {} and {}", id, previous.display(), path.display()),
                ));
            }
        }

        let mut posts: Vec<(PostId, PathBuf)> = posts.into_iter().collect();
        posts.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(posts)
    }

    fn id_from_path(&self, path: &Path) -> Option<PostId> {
        if path.extension().and_then(|e| e.to_str()) != Some(POST_EXTENSION) {
            return None;
        }

        let relative = path.strip_prefix(&self.root_dir).ok()?;
        let mut segments = vec![];
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_str()?.to_string()),
                _ => return None,
            }
        }

        let file_name = segments.pop()?;
        let stem = file_name.strip_suffix(&format!(".{}", POST_EXTENSION))?.to_string();

        // Directory posts take the directory name. An index file in the root is just a post.
        if stem != self.index_base_name || segments.is_empty() {
            segments.push(stem);
        }

        let sep = ID_SEPARATOR.to_string();
        Some(PostId(segments.join(&sep)))
    }

    /// Locates the file of an identifier without scanning the whole tree.
    fn path_from_id(&self, id: &PostId) -> io::Result<PathBuf> {
        let not_found = || io::Error::new(ErrorKind::NotFound, format!("Could not find post {}", id));

        let segments: Vec<&str> = id.as_str().split(ID_SEPARATOR).collect();
        if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
            return Err(not_found());
        }

        let base = segments.iter().fold(self.root_dir.clone(), |acc, s| acc.join(s));

        let mut file_post = base.clone().into_os_string();
        file_post.push(format!(".{}", POST_EXTENSION));
        let file_post = PathBuf::from(file_post);
        if file_post.is_file() {
            return Ok(file_post);
        }

        let dir_post = base.join(format!("{}.{}", self.index_base_name, POST_EXTENSION));
        if dir_post.is_file() {
            return Ok(dir_post);
        }

        Err(not_found())
    }

    /// `<dir>/<index_base_name>.md`, the file of a directory post.
    fn is_dir_post_file(&self, path: &Path) -> bool {
        let index_file = format!("{}.{}", self.index_base_name, POST_EXTENSION);
        path.file_name().and_then(|n| n.to_str()) == Some(index_file.as_str())
            && path.parent().is_some_and(|dir| dir != self.root_dir)
    }

    fn load_post(&self, id: &PostId, full_content: bool) -> io::Result<Post> {
        let file_path = self.path_from_id(id)?;
        debug!("Loading post {} from {}", id, file_path.display());
        let raw_content = fs::read_to_string(&file_path)?;
        parse_post(id, &file_path, &raw_content, full_content)
    }
}

impl ContentSource for FileContentSource {
    fn list_post_ids(&self) -> io::Result<Vec<PostId>> {
        if !self.root_dir.is_dir() {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("Posts directory {} does not exist", self.root_dir.display()),
            ));
        }

        let ids: Vec<PostId> = self.retrieve_files()?
            .into_iter()
            .map(|(id, _path)| id)
            .collect();

        if ids.is_empty() {
            warn!("No posts found in {}", self.root_dir.display());
        }
        Ok(ids)
    }

    fn get_post_data(&self, id: &PostId) -> io::Result<Post> {
        self.load_post(id, true)
    }

    fn get_post_summary(&self, id: &PostId) -> io::Result<Post> {
        self.load_post(id, false)
    }

    fn asset_dir(&self, id: &PostId) -> io::Result<Option<PathBuf>> {
        let file_path = self.path_from_id(id)?;
        if self.is_dir_post_file(&file_path) {
            Ok(file_path.parent().map(Path::to_path_buf))
        } else {
            Ok(None)
        }
    }
}

pub fn parse_post(id: &PostId, file_path: &Path, raw_content: &str, full_content: bool) -> io::Result<Post> {
    let (header, lines, maybe_line) = parse_post_header(file_path, raw_content.lines())?;
    let (title, lines, maybe_line) = parse_title_markdown(lines, maybe_line);
    let body = extract_content(lines, maybe_line, false);

    let needs_rendering = full_content || header.excerpt.is_none() || header.read_time.is_none();
    let rendered = if needs_rendering {
        Some(render_markdown(&body)?)
    } else {
        None
    };

    let excerpt = match header.excerpt {
        Some(excerpt) => excerpt,
        None => {
            let preview = if has_more_tag(&body) {
                let mut lines = body.lines();
                let first = lines.next();
                extract_content(lines, first, true)
            } else {
                first_paragraph(&body)
            };
            strip_html(&render_markdown(&preview)?)
        }
    };

    let read_time = match header.read_time {
        Some(read_time) => read_time,
        None => estimate_read_time(&strip_html(rendered.as_deref().unwrap_or_default())),
    };

    Ok(Post {
        id: id.clone(),
        title: title.unwrap_or_else(|| slug_str(id.as_str()).to_string()),
        category: header.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        excerpt,
        content: if full_content { rendered } else { None },
        date: display_date(header.date.as_deref().unwrap_or_default()),
        read_time,
        featured: header.featured.unwrap_or(false),
        author: header.author,
        tags: header.tags,
    })
}

fn render_markdown(md_text: &str) -> io::Result<String> {
    let buf = remove_comments(md_text)?;
    match markdown::to_html_with_options(buf.as_str(), &Options::gfm()) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, e.reason)),
    }
}
