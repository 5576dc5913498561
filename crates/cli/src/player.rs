use crate::commands::{session_config, story_key};
use anyhow::{Context, Result};
use clap::ArgMatches;
use console::{style, Term};
use readalong_config::Config;
use readalong_core::{AppError, ClockTime, SessionState};
use readalong_sync_engine::{
    shared, JsonStoryProvider, SessionEvent, SessionSnapshot, SimulatedClock, StoryData,
    StoryDataProvider, StyledParagraph, SyncSession, TickDriver,
};
use std::sync::{Arc, Mutex};

/// Seconds of silence assumed after the last chunk
const TRAILING_SILENCE: f64 = 1.0;

/// Narration pace used when there is no timing table
const SECONDS_PER_WORD: f64 = 0.4;

/// Play a story against a simulated clock, redrawing on every change
pub async fn play_story(config: &Config, matches: &ArgMatches) -> Result<()> {
    let key = story_key(matches, config)?;
    let speed = matches.get_one::<f64>("speed").copied().unwrap_or(1.0);

    let mut settings = session_config(config);
    if matches.get_flag("no-effects") {
        settings.effects.enabled = false;
    }
    let tick_interval = settings.tick_interval;

    let provider = JsonStoryProvider::new(&config.app.data_dir);
    let result = provider.load(&key);
    let duration = result.as_ref().map(estimated_duration).unwrap_or(0.0);
    let nothing_found = result.is_err();

    let clock = SimulatedClock::realtime(duration).with_speed(speed);
    let mut session = SyncSession::new(Box::new(clock), settings);
    session.select(key.clone())?;
    session.finish_loading(result)?;

    if session.state() == SessionState::Error {
        let fallback = if nothing_found {
            AppError::StoryNotFound {
                story_id: key.story_id,
            }
        } else {
            AppError::AudioMissing {
                resource: key.resource_name(),
            }
        };
        show_fallback(&session, &fallback);
        session.dismiss();
        return Ok(());
    }

    let notice = (!session.highlighting_enabled()).then(|| {
        let missing = AppError::TimingDataMissing {
            resource: key.resource_name(),
        };
        log::warn!("{}", missing);
        missing.user_message()
    });

    if session.state() == SessionState::Ready {
        session.play().context("Failed to start playback")?;
    }

    let session = shared(session);
    let driver = TickDriver::spawn(Arc::clone(&session), tick_interval)?;
    let result = run_player(&session, &driver, notice.as_deref()).await;

    driver.cancel();
    if let Ok(mut session) = session.lock() {
        session.dismiss();
    }
    result
}

async fn run_player(
    session: &Arc<Mutex<SyncSession>>,
    driver: &TickDriver,
    notice: Option<&str>,
) -> Result<()> {
    let term = Term::stdout();
    let _ = term.hide_cursor();
    let mut updates = driver.updates();
    let mut effect_log: Vec<String> = Vec::new();

    let result = loop {
        let (snapshot, events) = {
            let mut session = session
                .lock()
                .map_err(|_| anyhow::anyhow!("Session lock poisoned"))?;
            (session.snapshot(), session.drain_events())
        };

        for event in &events {
            match event {
                SessionEvent::EffectStarted(tag) => {
                    effect_log.push(format!("{} {}", style("▶").green(), tag));
                }
                SessionEvent::EffectStopped { tag, reason } => {
                    effect_log.push(format!("{} {} ({})", style("■").dim(), tag, reason));
                }
                _ => {}
            }
        }
        draw(&term, &snapshot, notice, &effect_log)?;

        if snapshot.state == SessionState::Finished && !snapshot.completion_visible {
            break Ok(());
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, stopping playback");
                break Ok(());
            }
        }
    };

    let _ = term.show_cursor();
    result
}

fn draw(
    term: &Term,
    snapshot: &SessionSnapshot,
    notice: Option<&str>,
    effect_log: &[String],
) -> Result<()> {
    term.clear_screen().context("Failed to clear terminal")?;

    println!(
        "{}  {}",
        style(format!("[{}]", snapshot.state)).bold().cyan(),
        ClockTime::from_seconds(snapshot.position)
    );
    println!("{}", "=".repeat(80));
    println!("{}", render_paragraph(&snapshot.styled));
    println!();

    if let Some(notice) = notice {
        println!("{}", style(notice).dim());
    }

    if let Some(effect) = &snapshot.effect {
        println!(
            "Effect: {} ({:.1} particles/s)",
            style(effect).bold(),
            snapshot.birth_rate
        );
    }

    for line in effect_log.iter().rev().take(5).rev() {
        println!("  {}", line);
    }

    if snapshot.completion_visible {
        println!();
        println!("{}", style("🎉 The End! Great listening! 🎉").bold().magenta());
    }

    Ok(())
}

/// Renders the paragraph with the active range highlighted
pub(crate) fn render_paragraph(styled: &StyledParagraph) -> String {
    styled
        .iter()
        .map(|range| {
            if range.is_active() {
                style(range.text.as_str()).black().on_yellow().bold().to_string()
            } else {
                range.text.clone()
            }
        })
        .collect()
}

/// Length of the simulated track for this selection
pub(crate) fn estimated_duration(data: &StoryData) -> f64 {
    if let Some(table) = data.table.as_ref().filter(|t| !t.is_empty()) {
        return table.narration_end() + TRAILING_SILENCE;
    }
    let words = data
        .paragraph
        .as_deref()
        .map(|p| p.split_whitespace().count())
        .unwrap_or(0);
    words as f64 * SECONDS_PER_WORD + TRAILING_SILENCE
}

fn show_fallback(session: &SyncSession, error: &AppError) {
    if let Some(reason) = session.failure() {
        log::warn!("{}", reason);
    }
    println!("{}", style(error.user_message()).bold().yellow());
    if let Some(paragraph) = session.paragraph() {
        println!();
        println!("{}", paragraph);
    }
}
