use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::str::Lines;

use lazy_static::lazy_static;
use regex::Regex;

pub const MORE_TAG: &str = "<!-- more -->";

/// Raw values found in the header. Defaults are applied by the content source.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostHeader {
    pub date: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub read_time: Option<String>,
    pub featured: Option<bool>,
    pub tags: Vec<String>,
}

/// Parses the `[KEY]: # (value)` lines at the top of a post, optionally wrapped in `<!-- -->`.
/// A post without header gets an empty one and all lines are kept.
pub fn parse_post_header<'a>(file_name: &Path, lines: Lines<'a>) -> io::Result<(PostHeader, Lines<'a>, Option<&'a str>)> {
    let mut header = PostHeader::default();

    let mut lines = lines;
    let mut maybe_line = lines.next();

    // Skip optional HTML comment in the beginning
    let mut start_with_comment = false;

    while let Some(line) = maybe_line {
        let line = line.trim();

        if line.is_empty() {
            maybe_line = lines.next();
            continue;
        }

        if line == "<!--" {
            maybe_line = lines.next();
            start_with_comment = true;
        }
        break;
    }

    while let Some(line) = maybe_line {
        if line.trim().is_empty() {
            maybe_line = lines.next();
            continue;
        }

        let Some((key, val)) = extract_header_key_val(line) else {
            break;
        };

        let val = val.trim().to_string();
        match key {
            "DATE" => header.date = Some(val),
            "AUTHOR" => header.author = Some(val),
            "CATEGORY" => header.category = Some(val),
            "EXCERPT" => header.excerpt = Some(val),
            "READ_TIME" => header.read_time = Some(val),
            "FEATURED" => header.featured = Some(parse_flag(&val)),
            "TAGS" => header.tags = extract_tags(&val),
            _ => {}
        }
        maybe_line = lines.next();
    }

    if start_with_comment {
        // Let's find the end of the comment
        loop {
            let Some(line) = maybe_line else {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("End of comment in the header is missing - file={}", file_name.display()),
                ));
            };

            let line = line.trim();
            maybe_line = lines.next();
            if line == "-->" {
                break;
            }
        }
    }

    Ok((header, lines, maybe_line))
}

/// Finds the first `# ` line. Returns the title, if any, and the lines after it.
/// Without a title line, the body starts where the header ended.
pub fn parse_title_markdown<'a>(lines: Lines<'a>, maybe_line: Option<&'a str>) -> (Option<String>, Lines<'a>, Option<&'a str>) {
    let before = lines.clone();
    let mut lines = lines;
    let mut current = maybe_line;

    while let Some(line) = current {
        if let Some(title) = line.strip_prefix("# ") {
            let next = lines.next();
            return (Some(title.trim().to_string()), lines, next);
        }
        current = lines.next();
    }

    (None, before, maybe_line)
}

/// Body text starting at `maybe_line`. With `preview_only` it stops at the more tag.
pub fn extract_content(mut lines: Lines, maybe_line: Option<&str>, preview_only: bool) -> String {
    let mut content = String::new();
    let mut current = maybe_line;
    while let Some(line) = current {
        if preview_only && line.contains(MORE_TAG) {
            break;
        }
        content.push_str(line);
        content.push('\n');
        current = lines.next();
    }
    content
}

pub fn has_more_tag(body: &str) -> bool {
    body.contains(MORE_TAG)
}

/// First block of text separated by a blank line.
pub fn first_paragraph(body: &str) -> String {
    let mut paragraph = String::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        if !paragraph.is_empty() {
            paragraph.push('\n');
        }
        paragraph.push_str(line);
    }
    paragraph
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

fn extract_tags(tags_str: &str) -> Vec<String> {
    tags_str.split(' ')
        .filter(|x| !x.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn extract_header_key_val(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(r"\[(?P<key>\w+)\]: # \((?P<value>.*)\)").unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str());
        let val = cap.name("value").map(|val| val.as_str());
        match (key, val) {
            (Some(key), Some(val)) => Some((key, val)),
            _ => None
        }
    })
}

pub fn remove_comments(md_post: &str) -> io::Result<String> {
    let mut res: String = String::new();
    let mut slice = Some(md_post);

    let start_comment = "<!--";
    let end_comment = "-->";

    while let Some(block) = slice {
        let md_buf: &str = match block.find(start_comment) {
            Some(start) => {
                let to_render: &str = &block[0..start];

                let next: &str = &block[(start + start_comment.len())..];
                match next.find(end_comment) {
                    Some(end) => {
                        slice = Some(&next[(end + end_comment.len())..]);
                    }
                    None => {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            "Error finding end of comment",
                        ));
                    }
                };

                to_render
            }
            None => {
                slice = None;
                block
            }
        };
        res.push_str(md_buf);
    }

    Ok(res)
}
