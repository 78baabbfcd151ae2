use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use slugpost::config::{read_config, Config};
use slugpost::logger::default_log_location;

use crate::config_data::write_sample_cfg;
use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    if let Some(exe_dir) = env::current_exe().ok().and_then(|p| p.parent().map(|d| d.to_path_buf())) {
        if exe_dir.join(CFG_FILE_NAME).exists() {
            return Some(exe_dir.join(CFG_FILE_NAME));
        }
    }

    if let Ok(cur_dir) = env::current_dir() {
        if cur_dir.join(CFG_FILE_NAME).exists() {
            return Some(cur_dir.join(CFG_FILE_NAME));
        }
    }

    let cfg_dir = dirs::config_dir()?;
    if cfg_dir.join(CFG_FILE_NAME).exists() {
        return Some(cfg_dir.join(CFG_FILE_NAME));
    }

    None
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Err(anyhow!("Could not find slugpost configuration ({})", CFG_FILE_NAME)),
    };

    println!("Reading config from {}", config_path.display());
    let mut config = read_config(&config_path)?;

    if let Some(mut log) = config.log {
        let location = log.location.unwrap_or_else(default_log_location);
        println!("Log enabled. Files will be written in {}", location.display());
        log.location = Some(location);
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}

pub(crate) fn generate_cfg(config_path: &Option<PathBuf>) -> Result<PathBuf> {
    let path: PathBuf = match config_path {
        Some(path) => path.clone(),
        None => {
            let cfg_dir = dirs::config_dir().ok_or_else(|| anyhow!("Could not find user config dir"))?;
            cfg_dir.join(CFG_FILE_NAME)
        }
    };

    if path.exists() {
        return Err(anyhow!("{} already exists, not overwriting it", path.display()));
    }

    write_sample_cfg(&path)?;
    Ok(path)
}
