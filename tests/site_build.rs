use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use slugpost::site_builder::SiteBuilder;
use slugpost::view::Templates;
use slugpost::{enumerate_page_params, ContentSource, FileContentSource, PostId, PostPage, SlugResolver};

fn res_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res")
}

fn sample_source() -> FileContentSource {
    FileContentSource::new(&res_dir().join("posts"), "index")
}

#[test]
fn enumerates_sample_posts() {
    let source = sample_source();
    let params = enumerate_page_params(&source).unwrap();
    let json = serde_json::to_string(&params).unwrap();
    assert_eq!(json, r#"[{"slug":"hello-world"},{"slug":"numpy-basics"},{"slug":"ownership"}]"#);
}

#[test]
fn resolves_every_enumerated_slug() {
    let source = sample_source();
    let resolver = SlugResolver::new(&source);

    for param in enumerate_page_params(&source).unwrap() {
        match resolver.resolve_page(param.slug.as_str()).unwrap() {
            PostPage::Found(post) => assert!(!post.title.is_empty()),
            PostPage::NotFound(slug) => panic!("{} was enumerated but does not resolve", slug),
        }
    }

    let id = resolver.resolve_slug("python/numpy-basics").unwrap();
    assert_eq!(id, Some(PostId::new("python/numpy-basics")));
    assert!(matches!(resolver.resolve_page("does-not-exist").unwrap(), PostPage::NotFound(_)));
}

#[test]
fn sample_post_fields() {
    let source = sample_source();
    let post = source.get_post_data(&PostId::new("python/numpy-basics")).unwrap();
    assert_eq!(post.title, "NumPy basics");
    assert_eq!(post.category, "Python");
    assert_eq!(post.read_time, "4 min read");
    assert_eq!(post.date, "2024-03-02");
    assert!(post.featured);

    let post = source.get_post_data(&PostId::new("rust/ownership")).unwrap();
    assert_eq!(post.excerpt, "Ownership explained with a single diagram.");
    assert_eq!(post.date, "2024-05-20");
    assert!(post.author.is_none());
}

#[test]
fn builds_the_sample_blog() {
    let out = TempDir::new().unwrap();
    let source = sample_source();
    let templates = Templates::load(&res_dir().join("template")).unwrap();

    let mut builder = SiteBuilder::new(&source, templates, out.path());
    builder.public_dir = Some(res_dir().join("public"));
    let stats = builder.build().unwrap();

    assert_eq!(stats.pages_requested, 3);
    assert_eq!(stats.pages_written, 3);
    assert_eq!(stats.collisions, 0);
    assert_eq!(stats.asset_files, 1);
    assert_eq!(stats.public_files, 1);

    let page = fs::read_to_string(out.path().join("blog/numpy-basics/index.html")).unwrap();
    assert!(page.contains("<h1>NumPy basics</h1>"));
    assert!(page.contains("Featured"));
    assert!(page.contains("<h2>Creating arrays</h2>"));

    let page = fs::read_to_string(out.path().join("blog/ownership/index.html")).unwrap();
    assert!(page.contains("ownership/ownership.svg"));
    assert!(out.path().join("blog/ownership/ownership.svg").exists());

    let index = fs::read_to_string(out.path().join("index.html")).unwrap();
    let newest = index.find("/blog/ownership").unwrap();
    let oldest = index.find("/blog/hello-world").unwrap();
    assert!(newest < oldest);

    let not_found = fs::read_to_string(out.path().join("404.html")).unwrap();
    assert!(not_found.contains("Post not found"));
    assert!(out.path().join("public/style.css").exists());
}
