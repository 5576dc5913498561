use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use readalong_config::{Config, ConfigManager};
use std::path::PathBuf;

mod commands;
mod player;

fn build_cli() -> Command {
    Command::new("readalong")
        .version("0.1.0")
        .author("ReadAlong Team")
        .about("Read-along stories with audio-synchronized highlighting")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml (defaults to the platform config dir)")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Story data directory (overrides app.data_dir)")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log filter (overrides app.log_level)")
                .global(true),
        )
        .subcommand(Command::new("stories").about("List the stories in the data directory"))
        .subcommand(
            Command::new("check")
                .about("Validate a story's timing table against its text")
                .arg(Arg::new("story").required(true).value_name("STORY_ID").help("Story id"))
                .arg(Arg::new("voice").value_name("VOICE").help("Narrator voice (defaults to app.default_voice)")),
        )
        .subcommand(
            Command::new("play")
                .about("Play a story with highlighted text")
                .arg(Arg::new("story").required(true).value_name("STORY_ID").help("Story id"))
                .arg(Arg::new("voice").value_name("VOICE").help("Narrator voice (defaults to app.default_voice)"))
                .arg(
                    Arg::new("speed")
                        .short('s')
                        .long("speed")
                        .value_name("RATE")
                        .help("Playback rate")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("1.0"),
                )
                .arg(
                    Arg::new("no-effects")
                        .long("no-effects")
                        .help("Don't show reactive effects")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand(Command::new("init").about("Write the default config if none exists"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(Command::new("path").about("Print the config file location"))
                .subcommand(Command::new("reset").about("Overwrite the config with defaults")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir))
            .context("Failed to open config directory"),
        None => ConfigManager::new().context("Failed to locate config directory"),
    }
}

fn effective_config(manager: &ConfigManager, matches: &ArgMatches) -> Config {
    let mut config = match manager.load_with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}. Using default settings.", e);
            Config::default()
        }
    };

    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.app.data_dir = PathBuf::from(dir);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(&matches)?;
    let config = effective_config(&manager, &matches);

    let filter = matches
        .get_one::<String>("log-level")
        .cloned()
        .unwrap_or_else(|| config.app.log_level.as_filter().to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match matches.subcommand() {
        Some(("stories", _)) => commands::list_stories(&config),
        Some(("check", sub_matches)) => commands::check_story(&config, sub_matches),
        Some(("play", sub_matches)) => player::play_story(&config, sub_matches).await,
        Some(("config", sub_matches)) => commands::config_command(&manager, &config, sub_matches),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
