use anyhow::Context;
use clap::{Parser, Subcommand};
use refrain::lyrics::{LyricLine, LyricTimeline};
use refrain::model::Track;
use refrain::player::PlaybackSession;

#[derive(Debug, Parser)]
#[command(name = "refrain", version, about = "Bilingual lyrics player core, headless tools")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a timed-lyrics file and print the timeline.
    Parse {
        file: std::path::PathBuf,
        /// Dump the timeline as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the active lyric line at a playback position.
    At {
        file: std::path::PathBuf,
        /// Playback position in seconds.
        seconds: f64,
    },
    /// Drive a playback session through a step list and print each state.
    Simulate {
        /// JSON file with an array of tracks.
        tracks: std::path::PathBuf,
        /// Comma-separated steps: next, prev, toggle, mode, reset, ensure.
        #[arg(long, default_value = "next")]
        steps: String,
        /// Playlist index to start at.
        #[arg(long, default_value_t = 0)]
        start: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let cfg = refrain::config::load(cli.config.as_deref()).context("load config")?;

    match cli.command {
        Command::Parse { file, json } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let timeline = LyricTimeline::parse(&raw);
            if json {
                println!("{}", serde_json::to_string_pretty(&timeline)?);
            } else {
                for line in &timeline.lines {
                    println!("{:9.3}  {}", line.time, line.text.replace('\n', " / "));
                }
            }
        }
        Command::At { file, seconds } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let timeline = LyricTimeline::parse(&raw);
            match active_line(&timeline, seconds) {
                Some(line) => {
                    println!("[{:.3}] {}", line.time, line.text.replace('\n', " / "))
                }
                None => println!("(no active line at {seconds}s)"),
            }
        }
        Command::Simulate {
            tracks,
            steps,
            start,
        } => {
            let raw = std::fs::read_to_string(&tracks)
                .with_context(|| format!("read {}", tracks.display()))?;
            let list: Vec<Track> = serde_json::from_str(&raw).context("parse track list")?;

            let mut session = PlaybackSession::with_default_track(cfg.bgm.to_track());
            session.set_volume(cfg.player.volume);
            session.play_list(list, start);
            print_state(&session, "start");

            for step in steps.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                apply_step(&mut session, step)?;
                print_state(&session, step);
            }
        }
    }

    Ok(())
}

/// Last line at or before `seconds`. The timeline is sorted ascending, so a
/// reverse scan finds it without extra bookkeeping.
fn active_line(timeline: &LyricTimeline, seconds: f64) -> Option<&LyricLine> {
    timeline.lines.iter().rev().find(|l| l.time <= seconds)
}

fn apply_step(session: &mut PlaybackSession, step: &str) -> anyhow::Result<()> {
    match step {
        "next" => session.next(),
        "prev" => session.prev(),
        "toggle" => session.toggle_play(),
        "mode" => session.cycle_mode(),
        "reset" => session.reset(),
        "ensure" => session.ensure_default_track(),
        other => anyhow::bail!("unknown step: {other}"),
    }
    Ok(())
}

fn print_state(session: &PlaybackSession, label: &str) {
    let title = session
        .current_track()
        .map(|t| t.title.as_str())
        .unwrap_or("-");
    println!(
        "{label:>8}: #{}/{} {title}  mode={} playing={} t={:.1}",
        session.current_index() + 1,
        session.len(),
        session.mode().label(),
        session.is_playing(),
        session.current_time(),
    );
}
