// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Loaders for the files that make up a pack.
//!
//! Every loader is best-effort: a missing file yields the default value and a
//! malformed one is logged and ignored, so a broken pack still opens.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

use super::data::{
    ActiveMoods, CaptionMood, Captions, CorruptionLevel, Discord, Info, MoodFile, PromptMood,
    Prompts, Web,
};
use super::paths::PackPaths;

/// Read and parse a JSON file, logging instead of failing
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.is_file() {
        debug!("Optional pack file missing: {:?}", path);
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse {:?}: {}", path, e);
            None
        }
    }
}

fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Deserialize, Default)]
struct PrefixSettings {
    #[serde(default)]
    max: Option<u32>,
}

#[derive(Deserialize)]
struct RawCaptions {
    #[serde(default)]
    prefix: Vec<String>,
    #[serde(default)]
    prefix_settings: HashMap<String, PrefixSettings>,
    #[serde(default)]
    default: Vec<String>,
    #[serde(default)]
    subtext: Option<String>,
    #[serde(default)]
    denial: Vec<String>,
    #[serde(default)]
    subliminal: Vec<String>,
    #[serde(default)]
    notification: Vec<String>,
    /// Caption lists keyed by mood name
    #[serde(flatten)]
    rest: HashMap<String, serde_json::Value>,
}

/// Load `captions.json`.
///
/// Moods are listed under `prefix`, each mood's captions live under a key of
/// the same name and its click limit under `prefix_settings.<mood>.max`.
pub fn load_captions(paths: &PackPaths) -> Captions {
    let defaults = Captions::default();
    let Some(raw) = read_json::<RawCaptions>(&paths.captions) else {
        return defaults;
    };

    let moods = raw
        .prefix
        .iter()
        .map(|mood| CaptionMood {
            mood: mood.clone(),
            max_clicks: raw
                .prefix_settings
                .get(mood)
                .and_then(|s| s.max)
                .unwrap_or(1)
                .max(1),
            captions: string_list(raw.rest.get(mood)),
        })
        .collect();

    // Default and denial lists must never be empty
    let default = if raw.default.is_empty() { defaults.default } else { raw.default };
    let denial = if raw.denial.is_empty() { defaults.denial } else { raw.denial };

    Captions {
        moods,
        default,
        close_text: raw.subtext.unwrap_or(defaults.close_text),
        denial,
        subliminal: raw.subliminal,
        notification: raw.notification,
    }
}

#[derive(Deserialize)]
struct RawPrompts {
    #[serde(default)]
    moods: Vec<String>,
    #[serde(default, rename = "freqList")]
    freq_list: Vec<u32>,
    #[serde(default, rename = "minLen")]
    min_len: Option<usize>,
    #[serde(default, rename = "maxLen")]
    max_len: Option<usize>,
    #[serde(default)]
    subtext: Option<String>,
    #[serde(default)]
    commandtext: Option<String>,
    #[serde(flatten)]
    rest: HashMap<String, serde_json::Value>,
}

/// Load `prompt.json`.
///
/// `moods` and `freqList` are parallel; a mood without a frequency gets weight 1.
pub fn load_prompt(paths: &PackPaths) -> Prompts {
    let defaults = Prompts::default();
    let Some(raw) = read_json::<RawPrompts>(&paths.prompt) else {
        return defaults;
    };

    let moods = raw
        .moods
        .iter()
        .enumerate()
        .map(|(i, mood)| PromptMood {
            mood: mood.clone(),
            weight: raw.freq_list.get(i).copied().unwrap_or(1),
            prompts: string_list(raw.rest.get(mood)),
        })
        .collect();

    let min = raw.min_len.unwrap_or(defaults.min_length).max(1);
    let max = raw.max_len.unwrap_or(defaults.max_length).max(1);

    Prompts {
        moods,
        min_length: min.min(max),
        max_length: min.max(max),
        command_text: raw.commandtext.unwrap_or(defaults.command_text),
        submit_text: raw.subtext.unwrap_or(defaults.submit_text),
    }
}

#[derive(Deserialize)]
struct RawWeb {
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    moods: Vec<String>,
}

/// Load `web.json`.
///
/// `urls`, `args` and `moods` are parallel lists. Each `args` entry is a
/// comma-separated list of suffix variants.
pub fn load_web(paths: &PackPaths) -> Vec<Web> {
    let Some(raw) = read_json::<RawWeb>(&paths.web) else {
        return Vec::new();
    };

    raw.urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let mut args: Vec<String> = raw
                .args
                .get(i)
                .map(|a| a.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or_default();
            if args.is_empty() {
                args.push(String::new());
            }
            let mood = raw.moods.get(i).filter(|m| !m.is_empty()).cloned();
            Web { url: url.clone(), args, mood }
        })
        .collect()
}

/// Load `media.json` as a map from file name to mood
pub fn load_media(paths: &PackPaths) -> HashMap<String, String> {
    let Some(raw) = read_json::<BTreeMap<String, Vec<String>>>(&paths.media) else {
        return HashMap::new();
    };

    let mut media_moods = HashMap::new();
    for (mood, files) in raw {
        for file in files {
            if let Some(previous) = media_moods.insert(file.clone(), mood.clone()) {
                warn!("{} listed under moods {} and {}; keeping {}", file, previous, mood, mood);
            }
        }
    }
    media_moods
}

#[derive(Deserialize, Default)]
struct RawInfo {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    creator: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Load `info.json`; the mood file lives in `moods_dir` under the pack id
pub fn load_info(paths: &PackPaths, moods_dir: &Path) -> Info {
    let raw = read_json::<RawInfo>(&paths.info).unwrap_or_default();

    let id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| paths.mood_id());
    let name = raw.name.unwrap_or_else(|| {
        paths
            .root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unnamed pack")
            .to_string()
    });

    Info {
        mood_file: moods_dir.join(format!("{}.json", id)),
        name,
        id,
        creator: raw.creator.unwrap_or_else(|| "Anonymous".to_string()),
        version: raw.version.unwrap_or_else(|| "1.0".to_string()),
        description: raw.description.unwrap_or_default(),
    }
}

/// Load `discord.dat`; the first non-empty line is the status text
pub fn load_discord(paths: &PackPaths) -> Discord {
    if !paths.discord.is_file() {
        return Discord::default();
    }
    match std::fs::read_to_string(&paths.discord) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|text| Discord { text: text.to_string() })
            .unwrap_or_default(),
        Err(e) => {
            warn!("Failed to read {:?}: {}", paths.discord, e);
            Discord::default()
        }
    }
}

#[derive(Deserialize, Default)]
struct RawMoodChange {
    #[serde(default)]
    add: Vec<String>,
    #[serde(default)]
    remove: Vec<String>,
}

#[derive(Deserialize)]
struct RawCorruption {
    #[serde(default)]
    moods: BTreeMap<String, RawMoodChange>,
    #[serde(default)]
    wallpapers: BTreeMap<String, String>,
}

/// Load `corruption.json`, ordered by level number
pub fn load_corruption(paths: &PackPaths) -> Vec<CorruptionLevel> {
    let Some(mut raw) = read_json::<RawCorruption>(&paths.corruption) else {
        return Vec::new();
    };

    let mut levels: Vec<(u32, RawMoodChange)> = Vec::new();
    for (key, change) in std::mem::take(&mut raw.moods) {
        match key.trim().parse::<u32>() {
            Ok(level) => levels.push((level, change)),
            Err(_) => warn!("Ignoring corruption level with non-numeric key {:?}", key),
        }
    }
    levels.sort_by_key(|(level, _)| *level);

    levels
        .into_iter()
        .map(|(level, change)| CorruptionLevel {
            add_moods: change.add,
            remove_moods: change.remove,
            wallpaper: raw.wallpapers.get(&level.to_string()).cloned(),
        })
        .collect()
}

/// Load the active moods file.
///
/// A missing or unreadable file disables filtering.
pub fn load_moods(mood_file: &Path) -> ActiveMoods {
    match read_json::<MoodFile>(mood_file) {
        Some(file) => file.to_active_moods(),
        None => ActiveMoods::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack_with(files: &[(&str, &str)]) -> (tempfile::TempDir, PackPaths) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let paths = PackPaths::new(dir.path());
        (dir, paths)
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let (dir, paths) = pack_with(&[]);
        assert_eq!(load_captions(&paths), Captions::default());
        assert_eq!(load_prompt(&paths), Prompts::default());
        assert!(load_web(&paths).is_empty());
        assert!(load_media(&paths).is_empty());
        assert!(load_corruption(&paths).is_empty());
        assert_eq!(load_discord(&paths), Discord::default());
        assert!(!load_moods(&dir.path().join("moods.json")).exists);
    }

    #[test]
    fn test_load_captions() {
        let (_dir, paths) = pack_with(&[(
            "captions.json",
            r#"{
                "prefix": ["bimbo", "goon"],
                "prefix_settings": {"goon": {"max": 4}},
                "default": ["hi"],
                "bimbo": ["giggle"],
                "goon": ["pump", "stroke"],
                "subtext": "Okay",
                "subliminal": ["obey"]
            }"#,
        )]);

        let captions = load_captions(&paths);
        assert_eq!(captions.moods.len(), 2);
        assert_eq!(captions.moods[0].max_clicks, 1);
        assert_eq!(captions.moods[1].max_clicks, 4);
        assert_eq!(captions.moods[1].captions, vec!["pump", "stroke"]);
        assert_eq!(captions.default, vec!["hi"]);
        assert_eq!(captions.close_text, "Okay");
        assert_eq!(captions.subliminal, vec!["obey"]);
        assert!(captions.notification.is_empty());
        // Empty denial list is replaced
        assert_eq!(captions.denial, Captions::default().denial);
    }

    #[test]
    fn test_malformed_captions_fall_back() {
        let (_dir, paths) = pack_with(&[("captions.json", "[1, 2")]);
        assert_eq!(load_captions(&paths), Captions::default());
    }

    #[test]
    fn test_load_prompt() {
        let (_dir, paths) = pack_with(&[(
            "prompt.json",
            r#"{
                "moods": ["default", "worship"],
                "freqList": [3],
                "minLen": 4,
                "maxLen": 2,
                "default": ["a", "b"],
                "worship": ["c"]
            }"#,
        )]);

        let prompts = load_prompt(&paths);
        assert_eq!(prompts.moods[0].weight, 3);
        assert_eq!(prompts.moods[1].weight, 1);
        assert_eq!(prompts.moods[1].prompts, vec!["c"]);
        assert_eq!((prompts.min_length, prompts.max_length), (2, 4));
    }

    #[test]
    fn test_load_web() {
        let (_dir, paths) = pack_with(&[(
            "web.json",
            r#"{
                "urls": ["https://example.com/?q=", "https://example.org/"],
                "args": ["red, blue,", ""],
                "moods": ["", "feet"]
            }"#,
        )]);

        let web = load_web(&paths);
        assert_eq!(web[0].args, vec!["red", "blue"]);
        assert_eq!(web[0].mood, None);
        assert_eq!(web[1].args, vec![""]);
        assert_eq!(web[1].mood.as_deref(), Some("feet"));
    }

    #[test]
    fn test_load_media() {
        let (_dir, paths) =
            pack_with(&[("media.json", r#"{"feet": ["a.png", "b.mp4"], "goon": ["c.gif"]}"#)]);
        let media = load_media(&paths);
        assert_eq!(media.get("b.mp4").map(String::as_str), Some("feet"));
        assert_eq!(media.get("c.gif").map(String::as_str), Some("goon"));
        assert_eq!(media.len(), 3);
    }

    #[test]
    fn test_load_info_uses_mood_id_without_id() {
        let (dir, paths) = pack_with(&[("info.json", r#"{"name": "Test Pack"}"#)]);
        let info = load_info(&paths, &dir.path().join("moods"));
        assert_eq!(info.name, "Test Pack");
        assert_eq!(info.id, "000xsxxx");
        assert_eq!(info.mood_file, dir.path().join("moods").join("000xsxxx.json"));

        let (dir, paths) = pack_with(&[("info.json", r#"{"id": "hypno-v2"}"#)]);
        let info = load_info(&paths, dir.path());
        assert_eq!(info.mood_file, dir.path().join("hypno-v2.json"));
    }

    #[test]
    fn test_load_discord() {
        let (_dir, paths) = pack_with(&[("discord.dat", "\n  Edging again  \nignored")]);
        assert_eq!(load_discord(&paths).text, "Edging again");
    }

    #[test]
    fn test_load_corruption_orders_levels() {
        let (_dir, paths) = pack_with(&[(
            "corruption.json",
            r#"{
                "moods": {"10": {"add": ["c"]}, "2": {"add": ["b"], "remove": ["a"]}, "x": {}},
                "wallpapers": {"2": "wall2.png"}
            }"#,
        )]);

        let levels = load_corruption(&paths);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].add_moods, vec!["b"]);
        assert_eq!(levels[0].remove_moods, vec!["a"]);
        assert_eq!(levels[0].wallpaper.as_deref(), Some("wall2.png"));
        assert_eq!(levels[1].add_moods, vec!["c"]);
        assert_eq!(levels[1].wallpaper, None);
    }

    #[test]
    fn test_load_moods() {
        let (dir, _paths) = pack_with(&[
            ("good.json", r#"{"active": ["feet"]}"#),
            ("bad.json", r#"{"active": 3}"#),
        ]);

        let active = load_moods(&dir.path().join("good.json"));
        assert!(active.exists);
        assert!(active.media.contains("feet"));
        assert!(!active.captions.contains("goon"));

        let active = load_moods(&dir.path().join("bad.json"));
        assert!(!active.exists);
        assert!(active.is_universal());
    }
}
