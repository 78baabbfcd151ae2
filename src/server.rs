use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ntex::web;
use ntex_files::NamedFile;
use spdlog::{error, info, warn};

use crate::config::Config;
use crate::content::file_source::FileContentSource;
use crate::content::{asset_path, ContentSource};
use crate::resolver::{PostPage, SlugResolver};
use crate::slug::Slug;
use crate::view::list_renderer::{sort_for_listing, ListRenderer};
use crate::view::not_found_renderer::NotFoundRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::{post_link, read_template, LIST_TEMPLATE, NOT_FOUND_TEMPLATE, POST_TEMPLATE};

/// Read only, shared by all workers.
pub struct AppState {
    pub source: Box<dyn ContentSource>,
    pub config: Config,
}

pub enum BlogResponse {
    Found(String),
    NotFound(String),
}

// Templates are read on every request so they can be edited while the server runs.
pub fn render_blog_page(source: &dyn ContentSource, template_dir: &Path, slug: &str) -> io::Result<BlogResponse> {
    let resolver = SlugResolver::new(source);
    match resolver.resolve_page(slug)? {
        PostPage::Found(post) => {
            let template_src = read_template(template_dir, POST_TEMPLATE)?;
            let renderer = PostRenderer::new(&template_src)?;
            Ok(BlogResponse::Found(renderer.render(&post)))
        }
        PostPage::NotFound(slug) => {
            let template_src = read_template(template_dir, NOT_FOUND_TEMPLATE)?;
            let renderer = NotFoundRenderer::new(&template_src)?;
            Ok(BlogResponse::NotFound(renderer.render(Some(&slug))))
        }
    }
}

pub fn render_index(source: &dyn ContentSource, template_dir: &Path) -> io::Result<String> {
    let mut posts = source.list_post_ids()?
        .iter()
        .map(|id| source.get_post_summary(id))
        .collect::<io::Result<Vec<_>>>()?;
    sort_for_listing(&mut posts);

    let template_src = read_template(template_dir, LIST_TEMPLATE)?;
    let renderer = ListRenderer::new(&template_src)?;
    Ok(renderer.render(&posts))
}

/// File stored next to the post a slug resolves to.
pub fn post_asset(source: &dyn ContentSource, slug: &str, file_name: &str) -> io::Result<Option<PathBuf>> {
    let resolver = SlugResolver::new(source);
    match resolver.resolve_slug(slug)? {
        Some(id) => asset_path(source, &id, file_name),
        None => Ok(None),
    }
}

/// `requested` is a `/` separated path under the public directory. None when it
/// would leave the directory.
pub fn public_file_path(public_dir: &Path, requested: &str) -> Option<PathBuf> {
    let mut file_path = public_dir.to_path_buf();
    for segment in requested.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return None;
        }
        file_path.push(segment);
    }
    Some(file_path)
}

#[web::get("/blog/{slug}/")]
async fn blog_post_with_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", post_link(&Slug(path.into_inner())))
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/blog/{slug}")]
async fn blog_post(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let slug = path.into_inner();

    match render_blog_page(state.source.as_ref(), &state.config.paths.template_dir, &slug) {
        Ok(BlogResponse::Found(body)) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Ok(BlogResponse::NotFound(body)) => {
            info!("No post for slug {}", slug);
            web::HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(body)
        }
        Err(e) => {
            error!("Error loading post {}: {}", slug, e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error loading post {}: {}", slug, e))
        }
    }
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    match render_index(state.source.as_ref(), &state.config.paths.template_dir) {
        Ok(body) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            error!("Error listing posts: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error listing posts: {}", e))
        }
    }
}

#[web::get("/blog/{slug}/{file}")]
async fn post_files(path: web::types::Path<(String, String)>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    let (slug, file) = path.into_inner();

    match post_asset(state.source.as_ref(), &slug, &file) {
        Ok(Some(file_path)) => Ok(NamedFile::open(file_path)?),
        Ok(None) => {
            info!("No file {} for slug {}", file, slug);
            Err(web::error::ErrorNotFound("File not found").into())
        }
        Err(e) => {
            error!("Error loading file {} of post {}: {}", file, slug, e);
            Err(web::error::ErrorInternalServerError(format!("Error loading file {}: {}", file, e)).into())
        }
    }
}

#[web::get("/public/{file_path}*")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> Result<NamedFile, web::Error> {
    let requested = path.into_inner();
    let Some(file_path) = public_file_path(&state.config.paths.public_dir, &requested) else {
        warn!("Refusing public file {}", requested);
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    };

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let source = FileContentSource::new(&config.paths.posts_dir, &config.content.index_base_name);

    // Fail early when the posts directory is not usable
    let ids = source.list_post_ids()?;
    info!("Serving {} posts from {}", ids.len(), config.paths.posts_dir.display());

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        source: Box::new(source),
        config,
    });

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(index)
            .service(public_files)
            .service(blog_post)
            .service(blog_post_with_slash)
            .service(post_files)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::content::MemoryContentSource;
    use crate::post::{Post, PostId};

    use super::*;

    fn template_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(POST_TEMPLATE), "POST {{title}}").unwrap();
        fs::write(tmp.path().join(NOT_FOUND_TEMPLATE), "NOT FOUND {{slug}} {{home_link}}").unwrap();
        fs::write(tmp.path().join(LIST_TEMPLATE), "{{#post_list}}{{title}}@{{date}};{{/post_list}}").unwrap();
        tmp
    }

    fn source() -> MemoryContentSource {
        let mut old = Post::new(PostId::new("posts/hello-world"), "Hello");
        old.date = "2023-01-01".to_string();
        let mut new = Post::new(PostId::new("rust/ownership"), "Ownership");
        new.date = "2024-01-01".to_string();
        MemoryContentSource::from_posts(vec![old, new])
    }

    #[test]
    fn test_found() {
        let tpl = template_dir();
        match render_blog_page(&source(), tpl.path(), "hello-world").unwrap() {
            BlogResponse::Found(body) => assert_eq!(body, "POST Hello"),
            BlogResponse::NotFound(body) => panic!("unexpected not found: {}", body),
        }
    }

    #[test]
    fn test_raw_identifier() {
        let tpl = template_dir();
        assert!(matches!(render_blog_page(&source(), tpl.path(), "rust/ownership").unwrap(), BlogResponse::Found(_)));
    }

    #[test]
    fn test_not_found_renders_fallback() {
        let tpl = template_dir();
        match render_blog_page(&source(), tpl.path(), "does-not-exist").unwrap() {
            BlogResponse::NotFound(body) => assert_eq!(body, "NOT FOUND does-not-exist /"),
            BlogResponse::Found(body) => panic!("unexpected post: {}", body),
        }
    }

    #[test]
    fn test_index_newest_first() {
        let tpl = template_dir();
        let body = render_index(&source(), tpl.path()).unwrap();
        assert_eq!(body, "Ownership@2024-01-01;Hello@2023-01-01;");
    }

    #[test]
    fn test_post_asset() {
        let tmp = TempDir::new().unwrap();
        let post_dir = tmp.path().join("rust").join("ownership");
        fs::create_dir_all(&post_dir).unwrap();
        fs::write(post_dir.join("index.md"), "# Ownership\n").unwrap();
        fs::write(post_dir.join("diagram.png"), "png").unwrap();
        fs::write(tmp.path().join("flat.md"), "# Flat\n").unwrap();
        fs::write(tmp.path().join("secret.txt"), "secret").unwrap();
        let source = FileContentSource::new(tmp.path(), "index");

        let found = post_asset(&source, "ownership", "diagram.png").unwrap();
        assert_eq!(found, Some(post_dir.join("diagram.png")));
        assert_eq!(post_asset(&source, "rust/ownership", "diagram.png").unwrap(), Some(post_dir.join("diagram.png")));

        assert_eq!(post_asset(&source, "ownership", "index.md").unwrap(), None);
        assert_eq!(post_asset(&source, "ownership", "..").unwrap(), None);
        assert_eq!(post_asset(&source, "ownership", "../../secret.txt").unwrap(), None);
        assert_eq!(post_asset(&source, "ownership", "missing.png").unwrap(), None);
        assert_eq!(post_asset(&source, "flat", "secret.txt").unwrap(), None);
        assert_eq!(post_asset(&source, "does-not-exist", "diagram.png").unwrap(), None);
    }

    #[test]
    fn test_public_file_path() {
        let public = Path::new("/srv/public");
        assert_eq!(public_file_path(public, "style.css"), Some(public.join("style.css")));
        assert_eq!(public_file_path(public, "img/logo.svg"), Some(public.join("img").join("logo.svg")));

        for requested in ["", "../secret", "img/../../secret", "img//logo.svg", "./style.css", "img\\..\\x"] {
            assert_eq!(public_file_path(public, requested), None, "{}", requested);
        }
    }

    #[test]
    fn test_missing_template() {
        let tmp = TempDir::new().unwrap();
        assert!(render_blog_page(&source(), tmp.path(), "hello-world").is_err());
    }
}
