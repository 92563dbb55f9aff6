use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use podscribe::cli::{Cli, Commands};
use podscribe::config::Config;
use podscribe::defaults::EPISODE_LIST_LIMIT;
use podscribe::progress::{ProgressTracker, RunPhase};
use podscribe::run::EpisodeRunner;
use podscribe::stt::{WhisperApiClient, WhisperApiConfig};
use podscribe::timeline::{SegmenterConfig, Transcript};
use podscribe::{feed, select_episode};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logger(cli.verbose, cli.quiet)?;

    let config = load_config(&cli);

    match cli.command {
        Commands::Episodes { ref feed_url, all } => {
            list_episodes(feed_url, all).await?;
        }
        Commands::Transcribe {
            ref feed_url,
            episode,
            ref output_dir,
        } => {
            let client = reqwest::Client::new();
            let episodes = feed::fetch_episodes(&client, feed_url).await?;
            let selected = select_episode(&episodes, episode)?;

            if !cli.quiet {
                println!("Selected episode {}: {}", selected.index, selected.title.bold());
            }

            let transcript = run_with_progress(
                &config,
                cli.quiet,
                &selected.title,
                RunInput::Url(selected.audio_url.clone()),
            )
            .await?;

            write_outputs(&transcript, &selected.title, output_dir.as_deref(), cli.quiet)?;
        }
        Commands::File {
            ref audio,
            ref output_dir,
        } => {
            let stem = audio
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "transcript".to_string());

            let transcript = run_with_progress(
                &config,
                cli.quiet,
                &stem,
                RunInput::File(audio.clone()),
            )
            .await?;

            write_outputs(&transcript, &stem, output_dir.as_deref(), cli.quiet)?;
        }
    }

    Ok(())
}

enum RunInput {
    Url(String),
    File(PathBuf),
}

/// Set up stderr logging; level follows -v/-q.
fn setup_logger(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("failed to initialize logger")?;

    Ok(())
}

fn load_config(cli: &Cli) -> Config {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);

    let mut config = Config::load_or_default(&path).with_env_overrides();

    if let Some(ref model) = cli.model {
        config.api.model = model.clone();
    }
    if let Some(ref language) = cli.language {
        config.api.language = Some(language.clone());
    }

    config
}

async fn list_episodes(feed_url: &str, all: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let episodes = feed::fetch_episodes(&client, feed_url).await?;

    let shown = if all {
        episodes.len()
    } else {
        episodes.len().min(EPISODE_LIST_LIMIT)
    };

    for episode in &episodes[..shown] {
        let published = episode.published.as_deref().unwrap_or("unknown date");
        println!(
            "{:>3}  {}  {}",
            episode.index,
            episode.title.bold(),
            format!("({published})").dimmed()
        );
    }

    if shown < episodes.len() {
        println!(
            "{}",
            format!(
                "... and {} more episodes (use --all to list them)",
                episodes.len() - shown
            )
            .dimmed()
        );
    }

    Ok(())
}

/// Run one episode while rendering tracker snapshots as a progress bar.
///
/// The run executes in its own task; this function is the concurrent
/// observer polling `snapshot()`.
async fn run_with_progress(
    config: &Config,
    quiet: bool,
    title: &str,
    input: RunInput,
) -> Result<Transcript> {
    let api_config = WhisperApiConfig::from_config(&config.api)?;
    let transcriber = WhisperApiClient::new(api_config);
    let segmenter = SegmenterConfig::with_max_bytes(config.segmenter.max_segment_bytes);
    let runner = EpisodeRunner::with_segmenter_config(transcriber, segmenter);

    let tracker = ProgressTracker::new();
    tracker.set_episode_title(title);

    let task_tracker = tracker.clone();
    let handle = tokio::spawn(async move {
        match input {
            RunInput::Url(url) => runner.transcribe_url(&url, &task_tracker).await,
            RunInput::File(path) => runner.transcribe_file(&path, &task_tracker).await,
        }
    });

    let bar = if quiet {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            // SAFETY: hardcoded template string, always valid
            #[allow(clippy::expect_used)]
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("hardcoded progress template"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Some(bar)
    };

    while !handle.is_finished() {
        if let Some(ref bar) = bar {
            bar.set_message(describe_phase(&tracker));
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let transcript = handle.await.context("transcription task panicked")??;
    Ok(transcript)
}

fn describe_phase(tracker: &ProgressTracker) -> String {
    let status = tracker.snapshot();
    match status.phase {
        RunPhase::Pending => "Starting...".to_string(),
        RunPhase::Downloading => match status.download_percent {
            Some(pct) => format!("Downloading audio: {pct:.1}%"),
            None => "Downloading audio...".to_string(),
        },
        RunPhase::Segmenting => "Decoding and segmenting audio...".to_string(),
        RunPhase::Transcribing { completed, total } => {
            format!(
                "Transcribing segment {} of {total}...",
                (completed + 1).min(total)
            )
        }
        RunPhase::Assembling => "Assembling transcript...".to_string(),
        RunPhase::Complete => "Done".to_string(),
        RunPhase::Failed => "Failed".to_string(),
    }
}

fn write_outputs(
    transcript: &Transcript,
    title: &str,
    output_dir: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let dir = output_dir.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let stem = sanitize_title(title);
    let txt_path = dir.join(format!("{stem}.txt"));
    let srt_path = dir.join(format!("{stem}.srt"));

    std::fs::write(&txt_path, format!("{}\n", transcript.full_text))
        .with_context(|| format!("failed to write {}", txt_path.display()))?;
    std::fs::write(&srt_path, transcript.to_srt())
        .with_context(|| format!("failed to write {}", srt_path.display()))?;

    if !quiet {
        println!("{} {}", "Transcript:".green().bold(), txt_path.display());
        println!("{} {}", "Subtitles: ".green().bold(), srt_path.display());
    }

    Ok(())
}

/// Turn an episode title into a safe filename stem.
fn sanitize_title(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "transcript".to_string()
    } else {
        stem
    }
}
