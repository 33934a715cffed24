use std::path::PathBuf;

use crate::cli::commands::{Cli, Commands};
use crate::cli::output::{PathsJson, format_task_list, task_to_json};
use crate::io::config_io;
use crate::io::kv_store::{FileStore, STORE_FILE};
use crate::io::persist;
use crate::logging;
use crate::model::AppConfig;

/// Resolved locations and configuration for one invocation
pub struct Context {
    pub config_path: PathBuf,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

/// Read the config file and resolve the data and log directories,
/// applying command-line overrides.
pub fn load_context(cli: &Cli) -> Result<Context, Box<dyn std::error::Error>> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => config_io::default_config_path()?,
    };
    let mut config = config_io::read_config(&config_path)?;
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    let data_dir = config_io::resolve_data_dir(&config, cli.data_dir.as_deref())?;
    let log_dir = config_io::resolve_log_dir(&config, &data_dir);
    Ok(Context {
        config_path,
        config,
        data_dir,
        log_dir,
    })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = load_context(&cli)?;
    logging::init_logging(&ctx.config.log.level, &ctx.log_dir)?;

    match cli.command {
        None => crate::tui::run(&ctx.config, &ctx.data_dir),
        Some(Commands::List) => cmd_list(&ctx, cli.json),
        Some(Commands::Paths) => cmd_paths(&ctx, cli.json),
    }
}

fn cmd_list(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open_read_only(&ctx.data_dir)?;
    let tasks = persist::load_tasks(&store);

    if json {
        let out: Vec<_> = tasks.iter().map(task_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if tasks.is_empty() {
        println!("no tasks yet (run `tl` to start)");
    } else {
        print!("{}", format_task_list(&tasks));
    }
    Ok(())
}

fn cmd_paths(ctx: &Context, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let paths = PathsJson {
        config: ctx.config_path.display().to_string(),
        data_dir: ctx.data_dir.display().to_string(),
        store: ctx.data_dir.join(STORE_FILE).display().to_string(),
        log_dir: ctx.log_dir.display().to_string(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        println!("config:   {}", paths.config);
        println!("data dir: {}", paths.data_dir);
        println!("store:    {}", paths.store);
        println!("logs:     {}", paths.log_dir);
    }
    Ok(())
}
