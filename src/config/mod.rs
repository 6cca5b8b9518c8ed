// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for moodpack

pub mod sextoy;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sextoy::DeviceSettings;

/// Main application settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Installed pack to load, relative to `<dataDir>/packs` (empty = default pack)
    pub pack_path: String,

    /// Root of the per-user data directory (packs, moods, logs, custom assets)
    pub data_dir: String,

    /// Pack shipped with the application
    pub default_pack_dir: String,

    /// Bundled fallback assets
    pub assets_dir: String,

    /// Pick captions by matching a mood prefix against the media file name
    pub filename_caption_moods: bool,

    /// Draw subliminal messages from the pack's dedicated subliminal list
    pub subliminal_caption_mood: bool,

    /// Draw notifications from the pack's dedicated notification list
    pub notification_mood: bool,

    /// Address of the Initface server
    pub initface_address: String,

    /// Known devices keyed by device index
    pub sextoys: BTreeMap<String, DeviceSettings>,
}

fn default_data_dir() -> String { "data".to_string() }
fn default_pack_dir() -> String { "resource".to_string() }
fn default_assets_dir() -> String { "assets".to_string() }
fn default_initface_address() -> String { "ws://127.0.0.1:12345".to_string() }

impl Default for Settings {
    fn default() -> Self {
        Self {
            pack_path: String::new(),
            data_dir: default_data_dir(),
            default_pack_dir: default_pack_dir(),
            assets_dir: default_assets_dir(),
            filename_caption_moods: false,
            subliminal_caption_mood: false,
            notification_mood: false,
            initface_address: default_initface_address(),
            sextoys: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Self = serde_json::from_str(&content)
                .map_err(|e| crate::PackError::Config(format!("Failed to parse settings: {}", e)))?;
            Ok(settings)
        } else {
            tracing::info!("Settings file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn data_dirs(&self) -> DataDirs {
        DataDirs::new(PathBuf::from(&self.data_dir))
    }

    pub fn assets(&self) -> Assets {
        Assets::new(PathBuf::from(&self.assets_dir), self.data_dirs().custom)
    }

    /// Root directory of the pack currently selected
    pub fn pack_root(&self) -> PathBuf {
        if self.pack_path.is_empty() {
            PathBuf::from(&self.default_pack_dir)
        } else {
            self.data_dirs().packs.join(&self.pack_path)
        }
    }

    /// Switch to an installed pack; `None` selects the default pack
    pub fn switch_pack(&mut self, name: Option<&str>) -> crate::Result<()> {
        match name {
            None => self.pack_path.clear(),
            Some(name) => {
                let installed = self.data_dirs().installed_packs()?;
                if !installed.iter().any(|p| p == name) {
                    return Err(crate::PackError::UnknownPack(name.to_string()));
                }
                self.pack_path = name.to_string();
            }
        }
        tracing::info!("Active pack set to {:?}", self.pack_root());
        Ok(())
    }
}

/// Per-user data directory layout
#[derive(Debug, Clone)]
pub struct DataDirs {
    pub root: PathBuf,
    pub packs: PathBuf,
    pub moods: PathBuf,
    pub logs: PathBuf,
    pub custom: PathBuf,
}

impl DataDirs {
    pub fn new(root: PathBuf) -> Self {
        Self {
            packs: root.join("packs"),
            moods: root.join("moods"),
            logs: root.join("logs"),
            custom: root.join("custom"),
            root,
        }
    }

    /// Names of the packs installed under `packs/`, sorted
    pub fn installed_packs(&self) -> crate::Result<Vec<String>> {
        if !self.packs.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = std::fs::read_dir(&self.packs)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Fallback assets used when a pack does not ship its own.
///
/// A file placed in the user's `custom/` directory takes precedence over the
/// bundled copy.
#[derive(Debug, Clone)]
pub struct Assets {
    bundled: PathBuf,
    custom: PathBuf,
}

impl Assets {
    pub const ICON: &'static str = "default_icon.ico";
    pub const WALLPAPER: &'static str = "default_wallpaper.png";
    pub const SPLASH: &'static str = "loading_splash.png";
    pub const SUBLIMINAL_OVERLAY: &'static str = "default_spiral.gif";

    pub fn new(bundled: PathBuf, custom: PathBuf) -> Self {
        Self { bundled, custom }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let custom = self.custom.join(name);
        if custom.is_file() {
            custom
        } else {
            self.bundled.join(name)
        }
    }

    pub fn icon(&self) -> PathBuf {
        self.resolve(Self::ICON)
    }

    /// The bundled wallpaper is not user-overridable
    pub fn wallpaper(&self) -> PathBuf {
        self.bundled.join(Self::WALLPAPER)
    }

    pub fn startup_splash(&self) -> PathBuf {
        self.resolve(Self::SPLASH)
    }

    pub fn subliminal_overlay(&self) -> PathBuf {
        self.resolve(Self::SUBLIMINAL_OVERLAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pack_root(), PathBuf::from("resource"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"packPath": "hypno", "notificationMood": true}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.notification_mood);
        assert!(!settings.subliminal_caption_mood);
        assert_eq!(settings.pack_root(), PathBuf::from("data/packs/hypno"));
    }

    #[test]
    fn test_save_keeps_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.filename_caption_moods = true;
        settings.sextoys.insert("0".to_string(), DeviceSettings::named("Lush"));
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(Settings::load(&path), Err(crate::PackError::Config(_))));
    }

    #[test]
    fn test_switch_pack() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings {
            data_dir: dir.path().to_string_lossy().to_string(),
            ..Settings::default()
        };
        std::fs::create_dir_all(dir.path().join("packs/beta")).unwrap();
        std::fs::create_dir_all(dir.path().join("packs/alpha")).unwrap();

        assert_eq!(settings.data_dirs().installed_packs().unwrap(), vec!["alpha", "beta"]);

        settings.switch_pack(Some("beta")).unwrap();
        assert_eq!(settings.pack_root(), dir.path().join("packs/beta"));

        assert!(matches!(
            settings.switch_pack(Some("gamma")),
            Err(crate::PackError::UnknownPack(_))
        ));

        settings.switch_pack(None).unwrap();
        assert_eq!(settings.pack_root(), PathBuf::from("resource"));
    }

    #[test]
    fn test_custom_asset_overrides_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("assets");
        let custom = dir.path().join("custom");
        std::fs::create_dir_all(&custom).unwrap();

        let assets = Assets::new(bundled.clone(), custom.clone());
        assert_eq!(assets.icon(), bundled.join(Assets::ICON));

        std::fs::write(custom.join(Assets::ICON), b"ico").unwrap();
        assert_eq!(assets.icon(), custom.join(Assets::ICON));
        assert_eq!(assets.wallpaper(), bundled.join(Assets::WALLPAPER));
    }
}
