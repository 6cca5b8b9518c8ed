// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for moodpack

use thiserror::Error;

/// Result type alias for moodpack operations
pub type Result<T> = std::result::Result<T, PackError>;

/// moodpack error types
#[derive(Error, Debug)]
pub enum PackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Pack not found: {0}")]
    UnknownPack(String),

    #[error("Mood not found in pack: {0}")]
    UnknownMood(String),

    #[error("Unknown device setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },

    #[error("Nothing to sample: {0}")]
    Empty(String),
}
