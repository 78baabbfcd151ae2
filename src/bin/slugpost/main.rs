use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use slugpost::config::Config;
use slugpost::logger::configure_logger;
use slugpost::server::server_run;
use slugpost::site_builder::SiteBuilder;
use slugpost::view::Templates;
use slugpost::{enumerate_page_params, find_slug_collisions, ContentSource, FileContentSource};

use crate::config::{generate_cfg, open_config};

mod config;
mod config_data;

const CFG_FILE_NAME: &str = "slugpost.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serves the blog, resolving slugs on every request
    Serve,
    /// Writes every post page, the listing and the 404 page as static files
    Build {
        /// Overrides paths.output_dir
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Prints the pages to pre-render as JSON, one {"slug"} per post
    Params {
        /// Pretty print the JSON
        #[arg(short, long)]
        pretty: bool,
    },
    /// Writes a sample configuration file
    InitConfig,
}

fn source_from(config: &Config) -> FileContentSource {
    FileContentSource::new(&config.paths.posts_dir, &config.content.index_base_name)
}

fn build(config: &Config, output_dir: Option<String>) -> Result<()> {
    let source = source_from(config);
    let templates = Templates::load(&config.paths.template_dir)?;
    let output_dir = output_dir.map(PathBuf::from).unwrap_or_else(|| config.paths.output_dir.clone());

    let mut builder = SiteBuilder::new(&source, templates, &output_dir);
    builder.public_dir = Some(config.paths.public_dir.clone());
    builder.fail_on_slug_collision = config.content.fail_on_slug_collision;

    let stats = builder.build()?;
    println!("{} pages written to {}", stats.pages_written, output_dir.display());
    if stats.collisions > 0 {
        println!("{} slug collision(s), check the log for details", stats.collisions);
    }
    Ok(())
}

fn params(config: &Config, pretty: bool) -> Result<()> {
    let source = source_from(config);
    let params = enumerate_page_params(&source)?;

    let collisions = find_slug_collisions(&source.list_post_ids()?);
    for collision in collisions.iter() {
        warn!("Slug {} is shared by {} other post(s)", collision.slug, collision.shadowed.len());
    }

    let json = if pretty {
        serde_json::to_string_pretty(&params)?
    } else {
        serde_json::to_string(&params)?
    };
    println!("{}", json);
    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config_path.map(PathBuf::from);

    if let Command::InitConfig = args.command {
        let path = generate_cfg(&config_path)?;
        println!("Sample configuration written to {}", path.display());
        return Ok(());
    }

    let config = match open_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run slugpost --help");
            bail!("configuration not available");
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    match args.command {
        Command::Serve => {
            info!("Starting slugpost =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            info!("Listening on {}:{}", config.server.address, config.server.port);
            server_run(config).await?;
        }
        Command::Build { output_dir } => build(&config, output_dir)?,
        Command::Params { pretty } => params(&config, pretty)?,
        Command::InitConfig => {}
    }

    Ok(())
}
