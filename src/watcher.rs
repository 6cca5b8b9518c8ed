// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Watches a pack and its mood file so a running sampler picks up edits

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::Duration;
use tracing::{debug, info};

use crate::Result;

/// What changed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackEvent {
    /// The active moods file was written
    MoodsChanged,
    /// Something inside the pack directory changed
    ContentChanged(PathBuf),
    /// Watcher error
    Error(String),
}

/// File system watcher for one pack
pub struct PackWatcher {
    watcher: RecommendedWatcher,
    pack_root: PathBuf,
    mood_file: PathBuf,
    event_rx: Receiver<notify::Result<Event>>,
}

impl PackWatcher {
    /// Watch `pack_root` recursively and the directory holding `mood_file`.
    ///
    /// Both are canonicalized so they compare equal to the absolute paths
    /// some backends report.
    pub fn new(pack_root: &Path, mood_file: &Path) -> Result<Self> {
        let (tx, rx) = channel();

        let config = Config::default()
            .with_poll_interval(Duration::from_secs(2));

        let mut watcher = RecommendedWatcher::new(tx, config)?;

        let pack_root = pack_root.canonicalize()?;
        watcher.watch(&pack_root, RecursiveMode::Recursive)?;
        info!("Watching pack: {:?}", pack_root);

        let moods_dir = match mood_file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // Mood directory may not exist yet on first run
        if !moods_dir.exists() {
            std::fs::create_dir_all(&moods_dir)?;
            info!("Created moods directory: {:?}", moods_dir);
        }
        let moods_dir = moods_dir.canonicalize()?;
        watcher.watch(&moods_dir, RecursiveMode::NonRecursive)?;
        info!("Watching moods: {:?}", moods_dir);

        let mood_file = match mood_file.file_name() {
            Some(name) => moods_dir.join(name),
            None => mood_file.to_path_buf(),
        };

        Ok(Self {
            watcher,
            pack_root,
            mood_file,
            event_rx: rx,
        })
    }

    /// Drain everything queued so a burst of writes triggers one reload
    pub fn drain(&self) -> Vec<PackEvent> {
        let mut events = Vec::new();
        loop {
            match self.event_rx.try_recv() {
                Ok(Ok(event)) => events.extend(self.convert_event(event)),
                Ok(Err(e)) => events.push(PackEvent::Error(e.to_string())),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    events.push(PackEvent::Error("Watcher disconnected".to_string()));
                    break;
                }
            }
        }
        events
    }

    /// Convert notify event to our event type
    fn convert_event(&self, event: Event) -> Option<PackEvent> {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
                let path = event.paths.first()?;
                classify(path, &self.pack_root, &self.mood_file)
            }
            _ => None,
        }
    }

    /// Stop watching the pack directory
    pub fn unwatch(&mut self) -> Result<()> {
        self.watcher.unwatch(&self.pack_root)?;
        debug!("Stopped watching: {:?}", self.pack_root);
        Ok(())
    }
}

/// Map a changed path to an event, ignoring unrelated files next to the mood file
pub fn classify(path: &Path, pack_root: &Path, mood_file: &Path) -> Option<PackEvent> {
    if path == mood_file {
        Some(PackEvent::MoodsChanged)
    } else if path.starts_with(pack_root) && crate::pack::media::should_include(path) {
        Some(PackEvent::ContentChanged(path.to_path_buf()))
    } else {
        None
    }
}
