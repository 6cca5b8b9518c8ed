// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Pack content model.
//!
//! A [`Pack`] aggregates everything loaded from a pack directory, filters it
//! by the user's active moods and hands out random picks. All sampling takes
//! the caller's RNG.

pub mod data;
pub mod load;
pub mod media;
pub mod paths;

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{Assets, Settings};
use crate::{PackError, Result};
use data::{
    ActiveMoods, CaptionMood, Captions, CorruptionLevel, Discord, Info, MediaItem, MoodFile,
    PromptMood, Prompts, Web, DEFAULT_DENIAL,
};
use media::MediaKind;
use paths::PackPaths;

/// A loaded pack
#[derive(Debug, Clone)]
pub struct Pack {
    pub paths: PackPaths,

    // Pack files
    pub captions: Captions,
    pub corruption_levels: Vec<CorruptionLevel>,
    pub discord: Discord,
    pub info: Info,
    pub media_moods: HashMap<String, String>,
    pub prompts: Prompts,
    pub web: Vec<Web>,

    // Data files
    pub active_moods: ActiveMoods,

    // Media
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
    pub audio: Vec<MediaItem>,
    pub subliminal_overlays: Vec<MediaItem>,

    // Assets, resolved against fallbacks
    pub icon: PathBuf,
    pub wallpaper: PathBuf,
    pub startup_splash: PathBuf,
    fallback_overlay: PathBuf,
}

impl Pack {
    /// Load the pack rooted at `root`, keeping its mood file in `moods_dir`
    pub fn load(root: &Path, moods_dir: &Path, assets: &Assets) -> Self {
        let paths = PackPaths::new(root);
        info!("Loading pack from {:?}", root);

        let captions = load::load_captions(&paths);
        let corruption_levels = load::load_corruption(&paths);
        let discord = load::load_discord(&paths);
        let info = load::load_info(&paths, moods_dir);
        let media_moods = load::load_media(&paths);
        let prompts = load::load_prompt(&paths);
        let web = load::load_web(&paths);

        let active_moods = load::load_moods(&info.mood_file);

        let images = media::list_media(&paths.image, Some(MediaKind::Image), &media_moods);
        let videos = media::list_media(&paths.video, Some(MediaKind::Video), &media_moods);
        let audio = media::list_media(&paths.audio, Some(MediaKind::Audio), &media_moods);
        let subliminal_overlays =
            media::list_media(&paths.subliminals, Some(MediaKind::Image), &HashMap::new());

        let icon = if paths.icon.is_file() { paths.icon.clone() } else { assets.icon() };
        let wallpaper = if paths.wallpaper.is_file() {
            paths.wallpaper.clone()
        } else {
            assets.wallpaper()
        };
        let startup_splash = paths
            .splash
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .unwrap_or_else(|| assets.startup_splash());

        info!(
            "Pack '{}' loaded: {} images, {} videos, {} audio, {} caption moods, {} prompt moods, {} web links",
            info.name,
            images.len(),
            videos.len(),
            audio.len(),
            captions.moods.len(),
            prompts.moods.len(),
            web.len()
        );

        Self {
            paths,
            captions,
            corruption_levels,
            discord,
            info,
            media_moods,
            prompts,
            web,
            active_moods,
            images,
            videos,
            audio,
            subliminal_overlays,
            icon,
            wallpaper,
            startup_splash,
            fallback_overlay: assets.subliminal_overlay(),
        }
    }

    /// Every mood named anywhere in the pack, sorted
    pub fn moods(&self) -> Vec<String> {
        let mut moods: BTreeSet<&str> = BTreeSet::new();
        moods.extend(self.media_moods.values().map(String::as_str));
        moods.extend(self.captions.moods.iter().map(|c| c.mood.as_str()));
        moods.extend(self.prompts.moods.iter().map(|p| p.mood.as_str()));
        moods.extend(self.web.iter().filter_map(|w| w.mood.as_deref()));
        moods.into_iter().map(String::from).collect()
    }

    /// Write a mood file enabling every mood when none is usable yet.
    ///
    /// Returns whether a file was written.
    pub fn ensure_mood_file(&mut self) -> Result<bool> {
        if self.info.mood_file.is_file() && self.active_moods.exists && !self.active_moods.is_universal() {
            return Ok(false);
        }
        info!("Generating mood file {:?}", self.info.mood_file);
        self.write_moods(MoodFile::new(self.moods()))?;
        Ok(true)
    }

    /// Enable or disable a single mood in the mood file
    pub fn set_mood_active(&mut self, mood: &str, active: bool) -> Result<()> {
        if !self.moods().iter().any(|m| m == mood) {
            return Err(PackError::UnknownMood(mood.to_string()));
        }

        let mut file = if self.active_moods.exists {
            std::fs::read_to_string(&self.info.mood_file)
                .ok()
                .and_then(|content| serde_json::from_str::<MoodFile>(&content).ok())
                .unwrap_or_else(|| MoodFile::new(self.moods()))
        } else {
            MoodFile::new(self.moods())
        };

        let lists = [
            Some(&mut file.active),
            file.media.as_mut(),
            file.captions.as_mut(),
            file.prompts.as_mut(),
            file.web.as_mut(),
        ];
        for list in lists.into_iter().flatten() {
            if active {
                list.insert(mood.to_string());
            } else {
                list.remove(mood);
            }
        }

        info!("Mood '{}' {}", mood, if active { "enabled" } else { "disabled" });
        self.write_moods(file)
    }

    /// Enable every mood again
    pub fn reset_moods(&mut self) -> Result<()> {
        self.write_moods(MoodFile::new(self.moods()))
    }

    fn write_moods(&mut self, file: MoodFile) -> Result<()> {
        file.save(&self.info.mood_file)?;
        self.active_moods = file.to_active_moods();
        Ok(())
    }

    /// Re-read the mood file, e.g. after another process edited it
    pub fn reload_moods(&mut self) {
        self.active_moods = load::load_moods(&self.info.mood_file);
        debug!("Reloaded active moods from {:?}", self.info.mood_file);
    }

    // Media

    pub fn filter_media<'a>(&self, media_list: &'a [MediaItem]) -> Vec<&'a MediaItem> {
        if !self.active_moods.exists {
            return media_list.iter().collect();
        }
        media_list
            .iter()
            .filter(|m| match &m.mood {
                None => true,
                Some(mood) => self.active_moods.media.contains(mood),
            })
            .collect()
    }

    fn random_media<'a, R: Rng + ?Sized>(&self, list: &'a [MediaItem], rng: &mut R) -> Option<&'a Path> {
        self.filter_media(list).choose(rng).copied().map(|m| m.path.as_path())
    }

    pub fn has_image(&self) -> bool {
        !self.filter_media(&self.images).is_empty()
    }

    pub fn random_image<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Path> {
        self.random_media(&self.images, rng)
    }

    pub fn has_video(&self) -> bool {
        !self.filter_media(&self.videos).is_empty()
    }

    pub fn random_video<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Path> {
        self.random_media(&self.videos, rng)
    }

    pub fn has_audio(&self) -> bool {
        !self.filter_media(&self.audio).is_empty()
    }

    pub fn random_audio<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Path> {
        self.random_media(&self.audio, rng)
    }

    /// Overlays are not mood-filtered; the fallback asset is used when the pack has none
    pub fn random_subliminal_overlay<R: Rng + ?Sized>(&self, rng: &mut R) -> &Path {
        self.subliminal_overlays
            .choose(rng)
            .map(|m| m.path.as_path())
            .unwrap_or(self.fallback_overlay.as_path())
    }

    // Captions

    pub fn filter_captions(&self) -> Vec<&CaptionMood> {
        self.captions
            .moods
            .iter()
            .filter(|c| !self.active_moods.exists || self.active_moods.captions.contains(&c.mood))
            .collect()
    }

    /// The first active caption mood whose name prefixes the media file name
    pub fn caption_mood_of_media(&self, media: &Path) -> Option<&CaptionMood> {
        let name = media.file_name()?.to_str()?;
        self.filter_captions()
            .into_iter()
            .find(|c| name.starts_with(c.mood.as_str()))
    }

    /// Captions eligible for a popup.
    ///
    /// With filename caption moods enabled and a media file given, only that
    /// file's mood captions are used (or the defaults when it has none).
    /// Otherwise the defaults plus every active mood's captions.
    pub fn find_caption_list(&self, settings: &Settings, media: Option<&Path>) -> Vec<&str> {
        if let (Some(media), true) = (media, settings.filename_caption_moods) {
            let list = match self.caption_mood_of_media(media) {
                Some(mood) => &mood.captions,
                None => &self.captions.default,
            };
            return list.iter().map(String::as_str).collect();
        }

        self.captions
            .default
            .iter()
            .chain(self.filter_captions().into_iter().flat_map(|c| c.captions.iter()))
            .map(String::as_str)
            .collect()
    }

    pub fn has_captions(&self, settings: &Settings, media: Option<&Path>) -> bool {
        !self.find_caption_list(settings, media).is_empty()
    }

    pub fn random_caption<R: Rng + ?Sized>(
        &self,
        settings: &Settings,
        media: Option<&Path>,
        rng: &mut R,
    ) -> Option<&str> {
        self.find_caption_list(settings, media).choose(rng).copied()
    }

    /// Clicks needed to close a popup showing `media`
    pub fn random_clicks_to_close<R: Rng + ?Sized>(&self, media: &Path, rng: &mut R) -> u32 {
        match self.caption_mood_of_media(media) {
            Some(mood) => rng.gen_range(1..=mood.max_clicks.max(1)),
            None => 1,
        }
    }

    pub fn has_subliminal_messages(&self, settings: &Settings) -> bool {
        if settings.subliminal_caption_mood {
            !self.captions.subliminal.is_empty()
        } else {
            self.has_captions(settings, None)
        }
    }

    pub fn random_subliminal_message<R: Rng + ?Sized>(&self, settings: &Settings, rng: &mut R) -> Option<&str> {
        if settings.subliminal_caption_mood {
            self.captions.subliminal.choose(rng).map(String::as_str)
        } else {
            self.random_caption(settings, None, rng)
        }
    }

    pub fn has_notifications(&self, settings: &Settings) -> bool {
        if settings.notification_mood {
            !self.captions.notification.is_empty()
        } else {
            self.has_captions(settings, None)
        }
    }

    pub fn random_notification<R: Rng + ?Sized>(&self, settings: &Settings, rng: &mut R) -> Option<&str> {
        if settings.notification_mood {
            self.captions.notification.choose(rng).map(String::as_str)
        } else {
            self.random_caption(settings, None, rng)
        }
    }

    pub fn random_denial<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // Loading guarantees a non-empty list
        self.captions
            .denial
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(DEFAULT_DENIAL)
    }

    // Prompts

    pub fn filter_prompts(&self) -> Vec<&PromptMood> {
        self.prompts
            .moods
            .iter()
            .filter(|p| !self.active_moods.exists || self.active_moods.prompts.contains(&p.mood))
            .collect()
    }

    pub fn has_prompts(&self) -> bool {
        self.filter_prompts().iter().any(|p| !p.prompts.is_empty())
    }

    /// Build a prompt from one weighted-random mood.
    ///
    /// The prompt is between `min_length` and `max_length` sentences drawn
    /// from that mood, joined by single spaces.
    pub fn random_prompt<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let moods: Vec<&PromptMood> = self
            .filter_prompts()
            .into_iter()
            .filter(|p| !p.prompts.is_empty())
            .collect();
        if moods.is_empty() {
            return None;
        }

        // Summed as u64 so large frequencies cannot overflow
        let mood = match WeightedIndex::new(moods.iter().map(|p| u64::from(p.weight))) {
            Ok(dist) => moods[dist.sample(rng)],
            Err(e) => {
                warn!("Prompt weights unusable ({}), picking uniformly", e);
                *moods.choose(rng)?
            }
        };

        let length = rng.gen_range(self.prompts.min_length..=self.prompts.max_length);
        let words: Vec<&str> = (0..length)
            .filter_map(|_| mood.prompts.choose(rng).map(String::as_str))
            .collect();
        Some(words.join(" ").trim().to_string())
    }

    // Web

    pub fn filter_web(&self) -> Vec<&Web> {
        if !self.active_moods.exists {
            return self.web.iter().collect();
        }
        self.web
            .iter()
            .filter(|w| match &w.mood {
                None => true,
                Some(mood) => self.active_moods.web.contains(mood),
            })
            .collect()
    }

    pub fn has_web(&self) -> bool {
        !self.filter_web().is_empty()
    }

    pub fn random_web<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let web = *self.filter_web().choose(rng)?;
        let arg = web.args.choose(rng).map(String::as_str).unwrap_or("");
        Some(format!("{}{}", web.url, arg))
    }
}
