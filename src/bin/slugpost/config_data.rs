use std::fs;
use std::io;
use std::path::Path;

const CONFIG_SAMPLE: &str = r#"# For the file locations, If you want it to be relative to the executable directory
# use ${exe_dir}/location
[paths]
template_dir = "res/template"
public_dir = "res/public"
posts_dir = "res/posts"
output_dir = "out"

# A directory with index.md inside is a post named after the directory
[content]
index_base_name = "index"
fail_on_slug_collision = false

[server]
address = "0.0.0.0"
port = 8001

# Remove this section to log to the console only
[log]
level = "Info"
log_to_console = true
"#;

pub(crate) fn write_sample_cfg(file_path: &Path) -> io::Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, CONFIG_SAMPLE)
}
