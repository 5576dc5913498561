use super::*;
use crate::player::{estimated_duration, render_paragraph};
use readalong_core::{ChunkTable, GapPolicy, TextChunk};
use readalong_sync_engine::{StoryData, StyledParagraph};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn setup_data_dir() -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "stories.json",
        r#"[{"id": 1, "fullText": "Hello world"}]"#,
    );
    write(
        temp_dir.path(),
        "chunks/elsa_story1.json",
        r#"[{"text": "Hello", "start": 0.0, "end": 1.0},
            {"text": "moon", "start": 1.0, "end": 2.0},
            {"text": " world", "start": 2.0, "end": 2.5, "emoji": "🎉"}]"#,
    );
    write(temp_dir.path(), "audio/elsa_story1.mp3", "");

    let mut config = Config::default();
    config.app.data_dir = temp_dir.path().to_path_buf();
    (temp_dir, config)
}

fn matches_for(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["readalong"];
    argv.extend_from_slice(args);
    let matches = crate::build_cli().try_get_matches_from(argv).unwrap();
    let (_, sub_matches) = matches.subcommand().unwrap();
    sub_matches.clone()
}

#[test]
fn test_story_key_uses_default_voice() {
    let config = Config::default();
    let key = story_key(&matches_for(&["check", "3"]), &config).unwrap();
    assert_eq!(key, StoryKey::new(3, "elsa"));
}

#[test]
fn test_story_key_normalizes_voice() {
    let config = Config::default();
    let key = story_key(&matches_for(&["check", "2", "Hulk"]), &config).unwrap();
    assert_eq!(key.resource_name(), "hulk_story2");

    let key = story_key(&matches_for(&["check", "2", "Girl"]), &config).unwrap();
    assert_eq!(key.resource_name(), "girl_story2");
}

#[test]
fn test_story_key_rejects_bad_id() {
    let config = Config::default();
    assert!(story_key(&matches_for(&["check", "three"]), &config).is_err());
}

#[test]
fn test_session_config_mapping() {
    let mut config = Config::default();
    config.playback.tick_interval_ms = 50;
    config.playback.gap_policy = GapPolicy::StaleHold;
    config.effects.max_emit_duration_ms = 1000;
    config.effects.birth_rate = 6.0;

    let settings = session_config(&config);
    assert_eq!(settings.tick_interval, Duration::from_millis(50));
    assert_eq!(settings.gap_policy, GapPolicy::StaleHold);
    assert_eq!(settings.completion_dismiss, Duration::from_millis(3000));
    assert_eq!(settings.effects.max_emit_duration, Duration::from_millis(1000));
    assert_eq!(settings.effects.birth_rate, 6.0);
}

#[test]
fn test_session_config_clamps_tick_interval() {
    let mut config = Config::default();
    config.playback.tick_interval_ms = 0;
    assert_eq!(session_config(&config).tick_interval, Duration::from_millis(16));

    config.playback.tick_interval_ms = 60_000;
    assert_eq!(session_config(&config).tick_interval, Duration::from_secs(1));
}

#[test]
fn test_default_config_matches_session_defaults() {
    assert_eq!(session_config(&Config::default()), SessionConfig::default());
}

#[test]
fn test_list_stories() {
    let (_temp_dir, config) = setup_data_dir();
    assert!(list_stories(&config).is_ok());
}

#[test]
fn test_list_stories_without_catalogue_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.app.data_dir = temp_dir.path().to_path_buf();
    assert!(list_stories(&config).is_err());
}

#[test]
fn test_check_story() {
    let (_temp_dir, config) = setup_data_dir();
    assert!(check_story(&config, &matches_for(&["check", "1", "elsa"])).is_ok());
    assert!(check_story(&config, &matches_for(&["check", "1", "hulk"])).is_ok());
    assert!(check_story(&config, &matches_for(&["check", "7", "hulk"])).is_err());
}

#[test]
fn test_config_command_init_and_path() {
    let temp_dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf()).unwrap();
    let config = Config::default();

    config_command(&manager, &config, &matches_for(&["config", "init"])).unwrap();
    assert!(manager.config_path().exists());
    config_command(&manager, &config, &matches_for(&["config", "show"])).unwrap();
    config_command(&manager, &config, &matches_for(&["config", "path"])).unwrap();
    assert!(config_command(&manager, &config, &matches_for(&["config"])).is_err());
}

#[test]
fn test_render_paragraph_keeps_text() {
    console::set_colors_enabled(false);
    let table = ChunkTable::new(vec![
        TextChunk::new("Hello", 0.0, 1.0),
        TextChunk::new(" world", 1.0, 2.5),
    ]);
    let styled = StyledParagraph::build("Hello world", &table, Some(1));
    assert_eq!(render_paragraph(&styled), "Hello world");
}

#[test]
fn test_estimated_duration() {
    let key = StoryKey::new(1, "elsa");
    let table = ChunkTable::new(vec![TextChunk::new("Hello", 0.0, 2.5)]);
    let data = StoryData::new(key.clone(), "Hello", table, "elsa_story1");
    assert_eq!(estimated_duration(&data), 3.5);

    let without_timing = StoryData {
        table: None,
        ..StoryData::new(key, "one two three", ChunkTable::empty(), "x")
    };
    assert!((estimated_duration(&without_timing) - 2.2).abs() < 1e-9);
}
