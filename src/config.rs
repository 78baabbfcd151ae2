use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub posts_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct Content {
    #[serde(default = "default_index_base_name")]
    pub index_base_name: String,
    /// Refuse to build when two posts derive the same slug.
    #[serde(default)]
    pub fail_on_slug_collision: bool,
}

impl Default for Content {
    fn default() -> Self {
        Content {
            index_base_name: default_index_base_name(),
            fail_on_slug_collision: false,
        }
    }
}

fn default_index_base_name() -> String {
    "index".to_string()
}

#[derive(Deserialize, Debug)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Debug)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub content: Content,
    pub server: Server,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf, exe_dir: Option<&Path>) -> PathBuf {
    match (path.to_str(), exe_dir.and_then(|d| d.to_str())) {
        (Some(str_path), Some(exe_dir)) if str_path.starts_with("${exe_dir}") => {
            PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
        }
        _ => path,
    }
}

pub fn parse_config(cfg_content: &str, exe_dir: Option<&Path>) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir, exe_dir),
        public_dir: parse_path(cfg.paths.public_dir, exe_dir),
        posts_dir: parse_path(cfg.paths.posts_dir, exe_dir),
        output_dir: parse_path(cfg.paths.output_dir, exe_dir),
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let cur_exe = env::current_exe()?;
    parse_config(&cfg_content, cur_exe.parent())
}
