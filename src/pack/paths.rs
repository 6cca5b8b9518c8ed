// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Layout of a pack directory

use std::path::{Path, PathBuf};

/// Splash screen extensions, in lookup order
pub const SPLASH_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg", "bmp"];

/// Resolved locations of every file and directory a pack may contain
#[derive(Debug, Clone)]
pub struct PackPaths {
    pub root: PathBuf,

    // Media directories
    pub image: PathBuf,
    pub video: PathBuf,
    pub audio: PathBuf,
    pub subliminals: PathBuf,

    // Data files
    pub captions: PathBuf,
    pub corruption: PathBuf,
    pub discord: PathBuf,
    pub info: PathBuf,
    pub media: PathBuf,
    pub prompt: PathBuf,
    pub web: PathBuf,

    // Assets
    pub icon: PathBuf,
    pub wallpaper: PathBuf,
    pub splash: Vec<PathBuf>,
}

impl PackPaths {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            image: root.join("img"),
            video: root.join("vid"),
            audio: root.join("aud"),
            subliminals: root.join("subliminals"),
            captions: root.join("captions.json"),
            corruption: root.join("corruption.json"),
            discord: root.join("discord.dat"),
            info: root.join("info.json"),
            media: root.join("media.json"),
            prompt: root.join("prompt.json"),
            web: root.join("web.json"),
            icon: root.join("icon.ico"),
            wallpaper: root.join("wallpaper.png"),
            splash: SPLASH_EXTENSIONS
                .iter()
                .map(|ext| root.join(format!("loading_splash.{}", ext)))
                .collect(),
        }
    }

    /// Identifier derived from the pack's shape, used when `info.json` carries no id.
    ///
    /// Entry counts of the image, audio and video directories followed by one
    /// presence flag each for wallpaper, splash, discord, icon and corruption.
    /// The splash slot is always `s`, whether or not a splash file exists, so
    /// ids stay stable for mood files already on disk.
    pub fn mood_id(&self) -> String {
        let count = |dir: &Path| -> usize {
            std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
        };
        let flag = |present: bool, c: char| if present { c } else { 'x' };

        let mut id = format!("{}{}{}", count(&self.image), count(&self.audio), count(&self.video));
        id.push(flag(self.wallpaper.is_file(), 'w'));
        id.push('s');
        id.push(flag(self.discord.is_file(), 'd'));
        id.push(flag(self.icon.is_file(), 'i'));
        id.push(flag(self.corruption.is_file(), 'c'));
        id
    }
}
