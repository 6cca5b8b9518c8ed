// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Media type detection and directory listing

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::data::MediaItem;

/// Leading bytes read when sniffing a file's type
const SNIFF_LEN: u64 = 8192;

/// Category of a media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// Extensions used when a file's content cannot be read
    pub fn supported_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif", "avif", "ico"],
            MediaKind::Video => &["mp4", "mkv", "webm", "avi", "mov", "m4v", "wmv", "flv", "mpg", "mpeg"],
            MediaKind::Audio => &["mp3", "wav", "flac", "ogg", "m4a", "aac", "wma", "opus", "aiff"],
        }
    }

    /// Classify by file extension alone
    pub fn from_extension(path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?;
        [MediaKind::Image, MediaKind::Video, MediaKind::Audio]
            .into_iter()
            .find(|kind| kind.supported_extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Classify the leading bytes of a file
    pub fn sniff(header: &[u8]) -> Option<MediaKind> {
        if image::guess_format(header).is_ok() {
            return Some(MediaKind::Image);
        }
        match infer::get(header)?.matcher_type() {
            infer::MatcherType::Image => Some(MediaKind::Image),
            infer::MatcherType::Video => Some(MediaKind::Video),
            infer::MatcherType::Audio => Some(MediaKind::Audio),
            _ => None,
        }
    }

    /// Classify a file by its content.
    ///
    /// Falls back to the extension only when the file cannot be read.
    pub fn detect(path: &Path) -> Option<MediaKind> {
        match read_header(path) {
            Ok(header) => Self::sniff(&header),
            Err(e) => {
                debug!("Cannot sniff {:?} ({}), using extension", path, e);
                Self::from_extension(path)
            }
        }
    }

    /// Check whether a file belongs to this category
    pub fn matches(&self, path: &Path) -> bool {
        Self::detect(path) == Some(*self)
    }
}

fn read_header(path: &Path) -> io::Result<Vec<u8>> {
    let mut header = Vec::new();
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut header)?;
    Ok(header)
}

/// Check if a file should be considered pack content at all
pub fn should_include(path: &Path) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };

    // Skip hidden files
    if filename.starts_with('.') {
        return false;
    }

    // Skip system files
    let skip_names = ["desktop.ini", "thumbs.db"];
    !skip_names.iter().any(|n| filename.eq_ignore_ascii_case(n))
}

/// Walk directory recursively
fn walkdir(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let p = entry.path();
            if p.is_dir() {
                files.extend(walkdir(&p));
            } else if p.is_file() {
                files.push(p);
            }
        }
    }

    files
}

/// List the media of one kind under `dir`, tagging each file with its mood.
///
/// `moods` maps a file name to the mood it was assigned in `media.json`.
/// Passing `None` for `kind` accepts any image, video or audio file.
/// A missing directory yields an empty list.
pub fn list_media(
    dir: &Path,
    kind: Option<MediaKind>,
    moods: &HashMap<String, String>,
) -> Vec<MediaItem> {
    if !dir.is_dir() {
        debug!("Media directory not present: {:?}", dir);
        return Vec::new();
    }

    let mut items: Vec<MediaItem> = walkdir(dir)
        .into_iter()
        .filter(|p| should_include(p))
        .filter(|p| match kind {
            Some(kind) => kind.matches(p),
            None => MediaKind::detect(p).is_some(),
        })
        .map(|path| {
            let mood = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| moods.get(n))
                .cloned();
            MediaItem { path, mood }
        })
        .collect();

    items.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(
        "Found {} {} files in {:?}",
        items.len(),
        kind.map(|k| k.name()).unwrap_or("media"),
        dir
    );
    items
}

/// Minimal file headers for building packs in tests
#[cfg(test)]
pub(crate) mod samples {
    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
    pub const JPEG: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0\x01\x01";
    pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0\x80\0\0";
    pub const FLV: &[u8] = b"FLV\x01\x05\0\0\0\x09\0\0\0\0";
    pub const MP3: &[u8] = b"ID3\x04\0\0\0\0\0\0\xff\xfb\x90\x64";
}
