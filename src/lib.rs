// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! moodpack: mood-filtered content packs
//!
//! Loads a pack of images, videos, audio, captions, prompts and web links,
//! filters it by the user's active moods and samples it at random.

pub mod config;
pub mod error;
pub mod logging;
pub mod pack;
pub mod watcher;

pub use config::Settings;
pub use error::{PackError, Result};
pub use pack::Pack;
