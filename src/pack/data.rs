// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Typed pack content

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A media file with its optional mood
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub path: PathBuf,
    pub mood: Option<String>,
}

/// Captions belonging to one mood
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionMood {
    pub mood: String,
    /// Upper bound of clicks needed to close a popup of this mood
    pub max_clicks: u32,
    pub captions: Vec<String>,
}

pub const DEFAULT_CAPTION: &str = "Look at this~";
pub const DEFAULT_CLOSE_TEXT: &str = "I Submit <3";
pub const DEFAULT_DENIAL: &str = "Not for you~";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Captions {
    pub moods: Vec<CaptionMood>,
    /// Never empty once loaded
    pub default: Vec<String>,
    pub close_text: String,
    /// Never empty once loaded
    pub denial: Vec<String>,
    pub subliminal: Vec<String>,
    pub notification: Vec<String>,
}

impl Default for Captions {
    fn default() -> Self {
        Self {
            moods: Vec::new(),
            default: vec![DEFAULT_CAPTION.to_string()],
            close_text: DEFAULT_CLOSE_TEXT.to_string(),
            denial: vec![DEFAULT_DENIAL.to_string()],
            subliminal: Vec::new(),
            notification: Vec::new(),
        }
    }
}

/// Prompts belonging to one mood
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMood {
    pub mood: String,
    /// Relative selection weight
    pub weight: u32,
    pub prompts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompts {
    pub moods: Vec<PromptMood>,
    /// Fewest prompt sentences joined into one prompt
    pub min_length: usize,
    pub max_length: usize,
    pub command_text: String,
    pub submit_text: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            moods: Vec::new(),
            min_length: 1,
            max_length: 1,
            command_text: "Type for me~".to_string(),
            submit_text: "I Submit <3".to_string(),
        }
    }
}

/// A web link template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Web {
    pub url: String,
    /// Query suffixes appended to `url`; holds `""` when the pack gives none
    pub args: Vec<String>,
    pub mood: Option<String>,
}

/// Pack metadata from `info.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Info {
    pub name: String,
    pub id: String,
    pub creator: String,
    pub version: String,
    pub description: String,
    /// Where this pack's active moods are stored
    pub mood_file: PathBuf,
}

/// Discord rich presence status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discord {
    pub text: String,
}

impl Default for Discord {
    fn default() -> Self {
        Self {
            text: "Browsing a pack".to_string(),
        }
    }
}

/// One corruption step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CorruptionLevel {
    pub add_moods: Vec<String>,
    pub remove_moods: Vec<String>,
    pub wallpaper: Option<String>,
}

/// A selection of moods, or every mood
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MoodSet {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl MoodSet {
    pub fn contains(&self, mood: &str) -> bool {
        match self {
            MoodSet::All => true,
            MoodSet::Only(set) => set.contains(mood),
        }
    }

    pub fn is_universal(&self) -> bool {
        matches!(self, MoodSet::All)
    }
}

impl<S: Into<String>> FromIterator<S> for MoodSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        MoodSet::Only(iter.into_iter().map(Into::into).collect())
    }
}

/// The user's mood selection for the current pack
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveMoods {
    /// False when no readable mood file exists; filtering is then disabled
    pub exists: bool,
    pub media: MoodSet,
    pub captions: MoodSet,
    pub prompts: MoodSet,
    pub web: MoodSet,
}

impl ActiveMoods {
    /// True when any category still selects every mood
    pub fn is_universal(&self) -> bool {
        self.media.is_universal()
            || self.captions.is_universal()
            || self.prompts.is_universal()
            || self.web.is_universal()
    }
}

/// On-disk shape of the mood file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoodFile {
    pub active: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<BTreeSet<String>>,
}

impl MoodFile {
    pub fn new(active: impl IntoIterator<Item = String>) -> Self {
        Self {
            active: active.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Per-category lists override `active` for their category
    pub fn to_active_moods(&self) -> ActiveMoods {
        let pick = |category: &Option<BTreeSet<String>>| {
            MoodSet::Only(category.clone().unwrap_or_else(|| self.active.clone()))
        };
        ActiveMoods {
            exists: true,
            media: pick(&self.media),
            captions: pick(&self.captions),
            prompts: pick(&self.prompts),
            web: pick(&self.web),
        }
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_set_contains() {
        assert!(MoodSet::All.contains("anything"));
        let set: MoodSet = ["bimbo", "goon"].into_iter().collect();
        assert!(set.contains("goon"));
        assert!(!set.contains("hypno"));
    }

    #[test]
    fn test_mood_file_category_override() {
        let file: MoodFile =
            serde_json::from_str(r#"{"active": ["a", "b"], "web": ["c"]}"#).unwrap();
        let active = file.to_active_moods();
        assert!(active.exists);
        assert!(active.media.contains("a"));
        assert!(!active.web.contains("a"));
        assert!(active.web.contains("c"));
        assert!(!active.is_universal());
    }

    #[test]
    fn test_mood_file_writes_active_only() {
        let file = MoodFile::new(vec!["b".to_string(), "a".to_string()]);
        assert_eq!(serde_json::to_string(&file).unwrap(), r#"{"active":["a","b"]}"#);
    }
}
