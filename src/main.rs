// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! moodpack: mood-filtered content packs
//!
//! Command-line front end for inspecting a pack, editing its active moods,
//! switching packs, editing settings and sampling content.

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use moodpack::config::sextoy::{register_device, setting_label, SETTING_GROUPS};
use moodpack::logging::init_logging;
use moodpack::watcher::{PackEvent, PackWatcher};
use moodpack::{Pack, PackError, Result, Settings};

/// moodpack CLI - mood-filtered content packs
#[derive(Parser, Debug)]
#[command(name = "moodpack")]
#[command(version)]
#[command(about = "Inspect, configure and sample mood-filtered content packs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to settings file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    settings: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show pack metadata and content counts
    Info,

    /// Draw random content from the active pack
    Sample {
        /// What to draw
        kind: SampleKind,

        /// Number of draws
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Media file the caption or click count is for
        #[arg(short, long)]
        media: Option<PathBuf>,

        /// Seed for reproducible draws
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Active mood selection
    Moods {
        #[command(subcommand)]
        action: MoodCommands,
    },

    /// Installed packs
    Packs {
        #[command(subcommand)]
        action: PackCommands,
    },

    /// Settings management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Vibration device settings
    Toys {
        #[command(subcommand)]
        action: ToyCommands,
    },

    /// Draw samples periodically, reloading when the pack or moods change
    Watch {
        /// Seconds between draws
        #[arg(short, long, default_value = "5")]
        interval: u64,

        /// Kinds to draw on each tick
        #[arg(short, long, value_delimiter = ',', default_values = ["image", "caption", "prompt"])]
        kinds: Vec<SampleKind>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SampleKind {
    Image,
    Video,
    Audio,
    Overlay,
    Caption,
    Clicks,
    Subliminal,
    Notification,
    Denial,
    Prompt,
    Web,
}

impl SampleKind {
    fn name(&self) -> &'static str {
        match self {
            SampleKind::Image => "image",
            SampleKind::Video => "video",
            SampleKind::Audio => "audio",
            SampleKind::Overlay => "overlay",
            SampleKind::Caption => "caption",
            SampleKind::Clicks => "clicks",
            SampleKind::Subliminal => "subliminal",
            SampleKind::Notification => "notification",
            SampleKind::Denial => "denial",
            SampleKind::Prompt => "prompt",
            SampleKind::Web => "web",
        }
    }
}

#[derive(Subcommand, Debug)]
enum MoodCommands {
    /// List the pack's moods and whether each is active
    List,

    /// Activate a mood
    Enable { mood: String },

    /// Deactivate a mood
    Disable { mood: String },

    /// Activate every mood
    Reset,
}

#[derive(Subcommand, Debug)]
enum PackCommands {
    /// List installed packs
    List,

    /// Switch to an installed pack
    Switch { name: String },

    /// Switch back to the default pack
    Default,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current settings
    Show,

    /// Generate default settings file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum ToyCommands {
    /// List known devices and their settings
    List,

    /// Register a device with default settings
    Add {
        /// Device index reported by Initface
        index: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Change one setting of a device
    Set {
        index: String,
        key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&cli.settings)?;

    let level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let log_file = init_logging(&settings.data_dirs().logs, "moodpack", level);
    debug!("Logging to {:?}", log_file);

    match cli.command {
        Some(Commands::Info) | None => run_info(&settings, &cli.format),
        Some(Commands::Sample { kind, count, media, seed }) => {
            run_sample(&settings, kind, count, media.as_deref(), seed, &cli.format)
        }
        Some(Commands::Moods { action }) => run_moods(&settings, action, &cli.format),
        Some(Commands::Packs { action }) => run_packs(settings, action, &cli.settings),
        Some(Commands::Config { action }) => run_config(&settings, action),
        Some(Commands::Toys { action }) => run_toys(settings, action, &cli.settings),
        Some(Commands::Watch { interval, kinds }) => run_watch(settings, interval, kinds).await,
    }
}

fn load_pack(settings: &Settings) -> Result<Pack> {
    let root = settings.pack_root();
    if !root.is_dir() {
        return Err(PackError::UnknownPack(root.display().to_string()));
    }
    Ok(Pack::load(&root, &settings.data_dirs().moods, &settings.assets()))
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Draw one item of the requested kind, `None` when the pack has nothing eligible
fn draw(
    pack: &Pack,
    settings: &Settings,
    kind: SampleKind,
    media: Option<&Path>,
    rng: &mut SmallRng,
) -> Option<String> {
    let path = |p: &Path| p.display().to_string();
    match kind {
        SampleKind::Image => pack.random_image(rng).map(path),
        SampleKind::Video => pack.random_video(rng).map(path),
        SampleKind::Audio => pack.random_audio(rng).map(path),
        SampleKind::Overlay => Some(path(pack.random_subliminal_overlay(rng))),
        SampleKind::Caption => pack.random_caption(settings, media, rng).map(String::from),
        SampleKind::Clicks => {
            let media = match media {
                Some(media) => media.to_path_buf(),
                None => pack.random_image(rng)?.to_path_buf(),
            };
            let clicks = pack.random_clicks_to_close(&media, rng);
            Some(format!("{} ({})", clicks, media.display()))
        }
        SampleKind::Subliminal => pack.random_subliminal_message(settings, rng).map(String::from),
        SampleKind::Notification => pack.random_notification(settings, rng).map(String::from),
        SampleKind::Denial => Some(pack.random_denial(rng).to_string()),
        SampleKind::Prompt => pack.random_prompt(rng),
        SampleKind::Web => pack.random_web(rng),
    }
}

/// Show pack information
fn run_info(settings: &Settings, format: &str) -> Result<()> {
    let pack = load_pack(settings)?;
    let moods = pack.moods();

    if format == "json" {
        let output = serde_json::json!({
            "info": pack.info,
            "mood_id": pack.paths.mood_id(),
            "discord": pack.discord.text,
            "images": pack.images.len(),
            "videos": pack.videos.len(),
            "audio": pack.audio.len(),
            "subliminal_overlays": pack.subliminal_overlays.len(),
            "caption_moods": pack.captions.moods.len(),
            "prompt_moods": pack.prompts.moods.len(),
            "web": pack.web.len(),
            "corruption_levels": pack.corruption_levels.len(),
            "moods": moods,
            "icon": pack.icon,
            "wallpaper": pack.wallpaper,
            "startup_splash": pack.startup_splash,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} v{} by {}", pack.info.name, pack.info.version, pack.info.creator);
    if !pack.info.description.is_empty() {
        println!("{}", pack.info.description);
    }
    println!("======================");
    println!("  Root: {}", pack.paths.root.display());
    println!("  Id: {} (mood id {})", pack.info.id, pack.paths.mood_id());
    println!("  Mood file: {}", pack.info.mood_file.display());
    println!("  Discord status: {}", pack.discord.text);
    println!("\nContent:");
    println!("  Images: {}", pack.images.len());
    println!("  Videos: {}", pack.videos.len());
    println!("  Audio: {}", pack.audio.len());
    println!("  Subliminal overlays: {}", pack.subliminal_overlays.len());
    println!("  Caption moods: {}", pack.captions.moods.len());
    println!("  Prompt moods: {}", pack.prompts.moods.len());
    println!("  Web links: {}", pack.web.len());
    println!("  Corruption levels: {}", pack.corruption_levels.len());
    println!("\nAssets:");
    println!("  Icon: {}", pack.icon.display());
    println!("  Wallpaper: {}", pack.wallpaper.display());
    println!("  Startup splash: {}", pack.startup_splash.display());
    println!("\nMoods ({}): {}", moods.len(), moods.join(", "));

    Ok(())
}

/// Draw samples and print them
fn run_sample(
    settings: &Settings,
    kind: SampleKind,
    count: usize,
    media: Option<&Path>,
    seed: Option<u64>,
    format: &str,
) -> Result<()> {
    let pack = load_pack(settings)?;
    let mut rng = make_rng(seed);

    let mut results = Vec::new();
    for _ in 0..count {
        match draw(&pack, settings, kind, media, &mut rng) {
            Some(value) => results.push(value),
            None => return Err(PackError::Empty(format!("no {} content for the active moods", kind.name()))),
        }
    }

    match format {
        "json" => {
            let output: Vec<serde_json::Value> = results
                .iter()
                .map(|value| serde_json::json!({ "kind": kind.name(), "value": value }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            for value in &results {
                println!("{}", value);
            }
        }
    }

    Ok(())
}

/// Run mood commands
fn run_moods(settings: &Settings, action: MoodCommands, format: &str) -> Result<()> {
    let mut pack = load_pack(settings)?;
    if pack.ensure_mood_file()? {
        info!("Created mood file {:?}", pack.info.mood_file);
    }

    match action {
        MoodCommands::List => {
            let moods = pack.moods();
            if format == "json" {
                let output: Vec<serde_json::Value> = moods
                    .iter()
                    .map(|m| serde_json::json!({ "mood": m, "active": pack.active_moods.media.contains(m) }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Moods of {}:", pack.info.name);
                for mood in moods {
                    let marker = if pack.active_moods.media.contains(&mood) { "x" } else { " " };
                    println!("  [{}] {}", marker, mood);
                }
            }
        }
        MoodCommands::Enable { mood } => {
            pack.set_mood_active(&mood, true)?;
            println!("Enabled {}", mood);
        }
        MoodCommands::Disable { mood } => {
            pack.set_mood_active(&mood, false)?;
            println!("Disabled {}", mood);
        }
        MoodCommands::Reset => {
            pack.reset_moods()?;
            println!("All moods enabled");
        }
    }

    Ok(())
}

/// Run pack commands
fn run_packs(mut settings: Settings, action: PackCommands, settings_path: &Path) -> Result<()> {
    match action {
        PackCommands::List => {
            let current = settings.pack_path.clone();
            let marker = |active: bool| if active { "→" } else { " " };
            println!("Installed packs:");
            println!("  {} (default) {}", marker(current.is_empty()), settings.default_pack_dir);
            for name in settings.data_dirs().installed_packs()? {
                println!("  {} {}", marker(name == current), name);
            }
        }
        PackCommands::Switch { name } => {
            settings.switch_pack(Some(&name))?;
            settings.save(settings_path)?;
            println!("Switched to {}", name);
        }
        PackCommands::Default => {
            settings.switch_pack(None)?;
            settings.save(settings_path)?;
            println!("Switched to the default pack");
        }
    }

    Ok(())
}

/// Run config commands
fn run_config(settings: &Settings, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(settings)?);
        }
        ConfigCommands::Generate { output } => {
            Settings::default().save(&output)?;
            println!("Generated settings at {:?}", output);
        }
    }

    Ok(())
}

/// Run device commands
fn run_toys(mut settings: Settings, action: ToyCommands, settings_path: &Path) -> Result<()> {
    match action {
        ToyCommands::List => {
            println!("Initface address: {}", settings.initface_address);
            if settings.sextoys.is_empty() {
                println!("No devices known");
            }
            for (index, device) in &settings.sextoys {
                println!("\n[{}] {}", index, device.sextoy_name);
                for (group, keys) in SETTING_GROUPS {
                    println!("  {}:", group);
                    for key in *keys {
                        if let Some(value) = device.get(key) {
                            println!("    {}: {}", setting_label(key), value);
                        }
                    }
                }
            }
        }
        ToyCommands::Add { index, name } => {
            if register_device(&mut settings.sextoys, &index, name.as_deref()) {
                settings.save(settings_path)?;
                println!("Added device {}", index);
            } else {
                println!("Device {} already known", index);
            }
        }
        ToyCommands::Set { index, key, value } => {
            let device = settings
                .sextoys
                .get_mut(&index)
                .ok_or_else(|| PackError::Config(format!("Unknown device {}", index)))?;
            let stored = device.set(&key, &value)?;
            settings.save(settings_path)?;
            println!("{} = {}", setting_label(&key), stored);
        }
    }

    Ok(())
}

/// Re-read the pack after its content changed, keeping the previous one when loading fails.
///
/// Returns whether the mood file path changed.
fn reload_pack(settings: &Settings, pack: &mut Pack) -> bool {
    match load_pack(settings) {
        Ok(fresh) => {
            let moved = fresh.info.mood_file != pack.info.mood_file;
            *pack = fresh;
            moved
        }
        Err(e) => {
            warn!("Reload failed, keeping the previous pack: {}", e);
            false
        }
    }
}

/// Sample on a timer until interrupted
async fn run_watch(settings: Settings, interval: u64, kinds: Vec<SampleKind>) -> Result<()> {
    let mut pack = load_pack(&settings)?;
    let mut watcher = PackWatcher::new(&pack.paths.root, &pack.info.mood_file)?;
    let mut rng = make_rng(None);

    // Setup graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = terminate => info!("Received SIGTERM, shutting down..."),
        }

        let _ = shutdown_tx.send(true);
    });

    info!("Sampling every {}s. Press Ctrl+C to stop.", interval);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        let events = watcher.drain();
        if events.iter().any(|e| matches!(e, PackEvent::ContentChanged(_))) {
            info!("Pack content changed, reloading");
            if reload_pack(&settings, &mut pack) {
                info!("Mood file moved to {:?}", pack.info.mood_file);
                match PackWatcher::new(&pack.paths.root, &pack.info.mood_file) {
                    Ok(fresh) => {
                        if let Err(e) = watcher.unwatch() {
                            warn!("Failed to stop watcher: {}", e);
                        }
                        watcher = fresh;
                    }
                    Err(e) => warn!("Failed to watch {:?}: {}", pack.info.mood_file, e),
                }
            }
        } else if events.contains(&PackEvent::MoodsChanged) {
            info!("Active moods changed, reloading");
            pack.reload_moods();
        }
        for event in &events {
            if let PackEvent::Error(e) = event {
                warn!("Watch error: {}", e);
            }
        }

        for kind in &kinds {
            match draw(&pack, &settings, *kind, None, &mut rng) {
                Some(value) => println!("{}: {}", kind.name(), value),
                None => debug!("Nothing to draw for {}", kind.name()),
            }
        }
    }

    if let Err(e) = watcher.unwatch() {
        warn!("Failed to stop watcher: {}", e);
    }
    info!("moodpack stopped.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["moodpack"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
        assert_eq!(cli.settings, PathBuf::from("config.json"));
    }

    #[test]
    fn test_cli_sample_command() {
        let cli = Cli::try_parse_from([
            "moodpack", "sample", "caption", "-n", "3", "--media", "img/goon_1.png", "--seed", "42",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Sample { kind, count, media, seed }) => {
                assert_eq!(kind, SampleKind::Caption);
                assert_eq!(count, 3);
                assert_eq!(media, Some(PathBuf::from("img/goon_1.png")));
                assert_eq!(seed, Some(42));
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_cli_watch_kinds() {
        let cli = Cli::try_parse_from(["moodpack", "watch", "--kinds", "web,denial"]).unwrap();

        match cli.command {
            Some(Commands::Watch { interval, kinds }) => {
                assert_eq!(interval, 5);
                assert_eq!(kinds, vec![SampleKind::Web, SampleKind::Denial]);
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_toys_set() {
        let cli = Cli::try_parse_from([
            "moodpack", "--format", "json", "toys", "set", "0", "sextoy_caption_chance", "30",
        ])
        .unwrap();
        assert_eq!(cli.format, "json");
        assert!(matches!(
            cli.command,
            Some(Commands::Toys { action: ToyCommands::Set { .. } })
        ));
    }

    #[test]
    fn test_draw_from_empty_pack() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            default_pack_dir: dir.path().to_string_lossy().to_string(),
            data_dir: dir.path().join("data").to_string_lossy().to_string(),
            ..Settings::default()
        };
        let pack = load_pack(&settings).unwrap();
        let mut rng = make_rng(Some(1));

        assert_eq!(draw(&pack, &settings, SampleKind::Image, None, &mut rng), None);
        assert_eq!(draw(&pack, &settings, SampleKind::Clicks, None, &mut rng), None);
        assert!(draw(&pack, &settings, SampleKind::Denial, None, &mut rng).is_some());
        assert!(draw(&pack, &settings, SampleKind::Caption, None, &mut rng).is_some());
    }

    #[test]
    fn test_missing_pack_is_error() {
        let settings = Settings {
            default_pack_dir: "/nonexistent/moodpack/pack".to_string(),
            ..Settings::default()
        };
        assert!(matches!(load_pack(&settings), Err(PackError::UnknownPack(_))));
    }

    #[test]
    fn test_reload_pack() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pack");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("info.json"), r#"{"name": "First", "id": "first"}"#).unwrap();
        let settings = Settings {
            default_pack_dir: root.to_string_lossy().to_string(),
            data_dir: dir.path().join("data").to_string_lossy().to_string(),
            ..Settings::default()
        };
        let mut pack = load_pack(&settings).unwrap();

        std::fs::write(root.join("info.json"), r#"{"name": "Renamed", "id": "first"}"#).unwrap();
        assert!(!reload_pack(&settings, &mut pack));
        assert_eq!(pack.info.name, "Renamed");

        // A new id moves the mood file
        std::fs::write(root.join("info.json"), r#"{"name": "Second", "id": "second"}"#).unwrap();
        assert!(reload_pack(&settings, &mut pack));
        assert!(pack.info.mood_file.ends_with("second.json"));

        // A vanished pack keeps the previous one loaded
        std::fs::remove_dir_all(&root).unwrap();
        assert!(!reload_pack(&settings, &mut pack));
        assert_eq!(pack.info.name, "Second");
    }
}
