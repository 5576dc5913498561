use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use console::style;
use readalong_config::{Config, ConfigManager, MAX_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};
use readalong_core::{Character, StoryKey};
use readalong_sync_engine::{EffectSettings, JsonStoryProvider, SessionConfig, StoryDataProvider};
use std::time::Duration;

/// List the stories in the data directory
pub fn list_stories(config: &Config) -> Result<()> {
    let provider = JsonStoryProvider::new(&config.app.data_dir);
    let stories = provider
        .stories()
        .with_context(|| format!("Failed to read {}", provider.stories_path().display()))?;

    if stories.is_empty() {
        println!("No stories in {}", config.app.data_dir.display());
        return Ok(());
    }

    println!("\n{} Stories", style(stories.len()).bold().cyan());
    println!("{}", "=".repeat(80));

    for story in stories {
        let voices: Vec<&str> = Character::ALL
            .iter()
            .filter(|c| {
                provider
                    .audio_path(&StoryKey::for_character(story.id, **c))
                    .is_some()
            })
            .map(|c| c.voice())
            .collect();

        println!(
            "{} {}",
            style(format!("#{}", story.id)).bold(),
            preview(&story.full_text, 60)
        );
        if voices.is_empty() {
            println!("  Voices: {}", style("none").dim());
        } else {
            println!("  Voices: {}", voices.join(", "));
        }
    }

    Ok(())
}

/// Validate a story's timing table against its paragraph
pub fn check_story(config: &Config, matches: &ArgMatches) -> Result<()> {
    let key = story_key(matches, config)?;
    let provider = JsonStoryProvider::new(&config.app.data_dir);
    let data = provider
        .load(&key)
        .with_context(|| format!("Failed to load {}", key))?;

    println!("\n{}", style(format!("Checking {}", key)).bold().cyan());
    println!("{}", "=".repeat(80));
    print_presence("Text", data.paragraph.is_some());
    print_presence("Timing", data.table.is_some());
    print_presence("Audio", data.audio.is_some());

    let (Some(paragraph), Some(table)) = (data.paragraph.as_deref(), data.table.as_ref()) else {
        println!("\nHighlighting is unavailable for this selection.");
        return Ok(());
    };

    let issues = table.validate(paragraph);
    println!("\n{} chunks, narration ends at {:.1}s", table.len(), table.narration_end());

    if issues.is_empty() {
        println!("{} No timing issues found", style("✓").green().bold());
    } else {
        println!(
            "{} {} timing issue(s); affected chunks will be skipped:",
            style("!").yellow().bold(),
            issues.len()
        );
        for issue in &issues {
            println!("  {}", style(issue).yellow());
        }
    }

    Ok(())
}

/// Handle `config init|show|path|reset`
pub fn config_command(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("init", _)) => {
            let created = manager
                .initialize()
                .context("Failed to initialize config")?;
            if created {
                println!(
                    "{} Created {}",
                    style("✓").green().bold(),
                    manager.config_path().display()
                );
            } else {
                println!("Config already exists at {}", manager.config_path().display());
            }
            Ok(())
        }
        Some(("show", _)) => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", text);
            Ok(())
        }
        Some(("path", _)) => {
            println!("{}", manager.config_path().display());
            Ok(())
        }
        Some(("reset", _)) => {
            manager.reset().context("Failed to reset config")?;
            println!("{} Config reset to defaults", style("✓").green().bold());
            Ok(())
        }
        _ => bail!("Expected one of: init, show, path, reset"),
    }
}

/// Builds the selection from `<story> [voice]`
pub(crate) fn story_key(matches: &ArgMatches, config: &Config) -> Result<StoryKey> {
    let story = matches
        .get_one::<String>("story")
        .ok_or_else(|| anyhow::anyhow!("Story id is required"))?;
    let story_id: u32 = story
        .parse()
        .with_context(|| format!("Invalid story id: {}", story))?;

    let voice = matches
        .get_one::<String>("voice")
        .map(String::as_str)
        .unwrap_or(config.app.default_voice.as_str());
    if voice.trim().is_empty() {
        bail!("Voice must not be empty");
    }

    Ok(match Character::from_voice(voice) {
        Some(character) => StoryKey::for_character(story_id, character),
        None => StoryKey::new(story_id, voice.trim().to_lowercase()),
    })
}

/// Maps the file configuration onto session settings
///
/// The tick interval is clamped to the accepted range, since a config that
/// failed validation is still loaded.
pub(crate) fn session_config(config: &Config) -> SessionConfig {
    let tick_interval_ms = config
        .playback
        .tick_interval_ms
        .clamp(MIN_TICK_INTERVAL_MS, MAX_TICK_INTERVAL_MS);
    if tick_interval_ms != config.playback.tick_interval_ms {
        log::warn!(
            "Tick interval {}ms out of range, using {}ms",
            config.playback.tick_interval_ms,
            tick_interval_ms
        );
    }

    SessionConfig {
        tick_interval: Duration::from_millis(tick_interval_ms),
        gap_policy: config.playback.gap_policy,
        completion_dismiss: Duration::from_millis(config.playback.completion_dismiss_ms),
        auto_play: config.playback.auto_play,
        effects: EffectSettings {
            enabled: config.effects.enabled,
            max_emit_duration: Duration::from_millis(config.effects.max_emit_duration_ms),
            birth_rate: config.effects.birth_rate,
        },
    }
}

fn print_presence(label: &str, present: bool) {
    let mark = if present {
        style("✓").green().bold()
    } else {
        style("✗").red().bold()
    };
    println!("  {:<8} {}", label, mark);
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

#[cfg(test)]
mod tests;
