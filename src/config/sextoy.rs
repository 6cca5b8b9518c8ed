// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Per-device vibration settings for the Initface integration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{PackError, Result};

/// Value domain of a device setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    /// Integer in 0..=100
    Percentage,
    /// Seconds in 0.0..=3.0
    Float,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Percentage(u8),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Percentage(v) => write!(f, "{}%", v),
            SettingValue::Float(v) => write!(f, "{:.1}s", v),
            SettingValue::Boolean(v) => write!(f, "{}", if *v { "on" } else { "off" }),
        }
    }
}

pub const MAX_VIBRATION_LENGTH: f64 = 3.0;

/// Every setting key with its value domain
pub const SETTINGS: &[(&str, SettingKind)] = &[
    ("sextoy_general_vibration_force", SettingKind::Percentage),
    ("sextoy_image_open_chance", SettingKind::Percentage),
    ("sextoy_image_open_vibration_force", SettingKind::Percentage),
    ("sextoy_image_open_vibration_length", SettingKind::Float),
    ("sextoy_image_close_chance", SettingKind::Percentage),
    ("sextoy_image_close_vibration_force", SettingKind::Percentage),
    ("sextoy_image_close_vibration_length", SettingKind::Float),
    ("sextoy_video_open_chance", SettingKind::Percentage),
    ("sextoy_video_open_vibration_force", SettingKind::Percentage),
    ("sextoy_video_open_vibration_length", SettingKind::Float),
    ("sextoy_video_close_chance", SettingKind::Percentage),
    ("sextoy_video_close_vibration_force", SettingKind::Percentage),
    ("sextoy_video_close_vibration_length", SettingKind::Float),
    ("sextoy_caption_chance", SettingKind::Percentage),
    ("sextoy_caption_vibration_force", SettingKind::Percentage),
    ("sextoy_caption_vibration_length", SettingKind::Float),
    ("sextoy_display_notification_chance", SettingKind::Percentage),
    ("sextoy_display_notification_vibration_force", SettingKind::Percentage),
    ("sextoy_display_notification_vibration_length", SettingKind::Float),
    ("sextoy_prompt_enabled", SettingKind::Boolean),
    ("sextoy_prompt_vibration_force", SettingKind::Percentage),
];

/// Display grouping of the settings
pub const SETTING_GROUPS: &[(&str, &[&str])] = &[
    ("General Vibration", &["sextoy_general_vibration_force"]),
    ("Image Open Popup", &[
        "sextoy_image_open_chance",
        "sextoy_image_open_vibration_force",
        "sextoy_image_open_vibration_length",
    ]),
    ("Image Close Popup", &[
        "sextoy_image_close_chance",
        "sextoy_image_close_vibration_force",
        "sextoy_image_close_vibration_length",
    ]),
    ("Video Open Popup", &[
        "sextoy_video_open_chance",
        "sextoy_video_open_vibration_force",
        "sextoy_video_open_vibration_length",
    ]),
    ("Video Close Popup", &[
        "sextoy_video_close_chance",
        "sextoy_video_close_vibration_force",
        "sextoy_video_close_vibration_length",
    ]),
    ("Captions", &[
        "sextoy_caption_chance",
        "sextoy_caption_vibration_force",
        "sextoy_caption_vibration_length",
    ]),
    ("Notifications", &[
        "sextoy_display_notification_chance",
        "sextoy_display_notification_vibration_force",
        "sextoy_display_notification_vibration_length",
    ]),
    ("Prompts", &["sextoy_prompt_enabled", "sextoy_prompt_vibration_force"]),
];

/// Human readable label for a setting key
pub fn setting_label(key: &str) -> String {
    key.trim_start_matches("sextoy_")
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn setting_kind(key: &str) -> Option<SettingKind> {
    SETTINGS.iter().find(|(k, _)| *k == key).map(|(_, kind)| *kind)
}

/// Vibration settings of a single device
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DeviceSettings {
    pub sextoy_name: String,
    pub sextoy_general_vibration_force: u8,
    pub sextoy_image_open_chance: u8,
    pub sextoy_image_open_vibration_force: u8,
    pub sextoy_image_open_vibration_length: f64,
    pub sextoy_image_close_chance: u8,
    pub sextoy_image_close_vibration_force: u8,
    pub sextoy_image_close_vibration_length: f64,
    pub sextoy_video_open_chance: u8,
    pub sextoy_video_open_vibration_force: u8,
    pub sextoy_video_open_vibration_length: f64,
    pub sextoy_video_close_chance: u8,
    pub sextoy_video_close_vibration_force: u8,
    pub sextoy_video_close_vibration_length: f64,
    pub sextoy_caption_chance: u8,
    pub sextoy_caption_vibration_force: u8,
    pub sextoy_caption_vibration_length: f64,
    pub sextoy_display_notification_chance: u8,
    pub sextoy_display_notification_vibration_force: u8,
    pub sextoy_display_notification_vibration_length: f64,
    pub sextoy_prompt_enabled: bool,
    pub sextoy_prompt_vibration_force: u8,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            sextoy_name: String::new(),
            sextoy_general_vibration_force: 50,
            sextoy_image_open_chance: 0,
            sextoy_image_open_vibration_force: 50,
            sextoy_image_open_vibration_length: 0.5,
            sextoy_image_close_chance: 0,
            sextoy_image_close_vibration_force: 50,
            sextoy_image_close_vibration_length: 0.5,
            sextoy_video_open_chance: 0,
            sextoy_video_open_vibration_force: 50,
            sextoy_video_open_vibration_length: 0.5,
            sextoy_video_close_chance: 0,
            sextoy_video_close_vibration_force: 50,
            sextoy_video_close_vibration_length: 0.5,
            sextoy_caption_chance: 0,
            sextoy_caption_vibration_force: 50,
            sextoy_caption_vibration_length: 0.5,
            sextoy_display_notification_chance: 0,
            sextoy_display_notification_vibration_force: 50,
            sextoy_display_notification_vibration_length: 0.5,
            sextoy_prompt_enabled: false,
            sextoy_prompt_vibration_force: 50,
        }
    }
}

impl DeviceSettings {
    pub fn named(name: &str) -> Self {
        Self {
            sextoy_name: name.to_string(),
            ..Self::default()
        }
    }

    /// Read a setting by key
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        let kind = setting_kind(key)?;
        let fields = serde_json::to_value(self).ok()?;
        let field = fields.get(key)?;
        match kind {
            SettingKind::Percentage => field
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .map(SettingValue::Percentage),
            SettingKind::Float => field.as_f64().map(SettingValue::Float),
            SettingKind::Boolean => field.as_bool().map(SettingValue::Boolean),
        }
    }

    /// Parse and store a setting, clamping to its domain
    pub fn set(&mut self, key: &str, raw: &str) -> Result<SettingValue> {
        let kind = setting_kind(key).ok_or_else(|| PackError::UnknownSetting(key.to_string()))?;
        let invalid = || PackError::InvalidSetting {
            key: key.to_string(),
            value: raw.to_string(),
        };

        let value = match kind {
            SettingKind::Percentage => {
                let value: i64 = raw.trim().trim_end_matches('%').parse().map_err(|_| invalid())?;
                SettingValue::Percentage(value.clamp(0, 100) as u8)
            }
            SettingKind::Float => {
                let value: f64 = raw.trim().trim_end_matches('s').parse().map_err(|_| invalid())?;
                if !value.is_finite() {
                    return Err(invalid());
                }
                SettingValue::Float(value.clamp(0.0, MAX_VIBRATION_LENGTH))
            }
            SettingKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => SettingValue::Boolean(true),
                "0" | "false" | "off" | "no" => SettingValue::Boolean(false),
                _ => return Err(invalid()),
            },
        };

        // Fields are addressed by their serialized names, which are the setting keys
        let mut fields = serde_json::to_value(&*self)?;
        let slot = fields.get_mut(key).ok_or_else(invalid)?;
        *slot = match value {
            SettingValue::Percentage(v) => serde_json::Value::from(v),
            SettingValue::Float(v) => serde_json::Value::from(v),
            SettingValue::Boolean(v) => serde_json::Value::from(v),
        };
        *self = serde_json::from_value(fields)?;
        Ok(value)
    }
}

/// Register a discovered device with default settings.
///
/// Returns `false` when the index is already known; its settings are left untouched.
pub fn register_device(
    devices: &mut BTreeMap<String, DeviceSettings>,
    index: &str,
    name: Option<&str>,
) -> bool {
    if devices.contains_key(index) {
        return false;
    }
    let name = name
        .map(String::from)
        .unwrap_or_else(|| format!("Device {}", index));
    tracing::info!("Registered device {} ({})", index, name);
    devices.insert(index.to_string(), DeviceSettings::named(&name));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_grouped_key_is_known() {
        for (_, keys) in SETTING_GROUPS {
            for key in *keys {
                assert!(setting_kind(key).is_some(), "{key}");
                assert!(DeviceSettings::default().get(key).is_some(), "{key}");
            }
        }
        let grouped: usize = SETTING_GROUPS.iter().map(|(_, keys)| keys.len()).sum();
        assert_eq!(grouped, SETTINGS.len());
    }

    #[test]
    fn test_every_key_can_be_set() {
        for (key, kind) in SETTINGS {
            let mut device = DeviceSettings::named("Lush");
            let (raw, expected) = match kind {
                SettingKind::Percentage => ("73", SettingValue::Percentage(73)),
                SettingKind::Float => ("1.5", SettingValue::Float(1.5)),
                SettingKind::Boolean => ("on", SettingValue::Boolean(true)),
            };
            assert_eq!(device.set(key, raw).unwrap(), expected, "{key}");
            assert_eq!(device.get(key), Some(expected), "{key}");
            assert_eq!(device.sextoy_name, "Lush");

            // Only the addressed field changes
            let changed: Vec<&str> = SETTINGS
                .iter()
                .map(|(other, _)| *other)
                .filter(|other| device.get(other) != DeviceSettings::default().get(other))
                .collect();
            assert_eq!(changed, vec![*key]);
        }
    }

    #[test]
    fn test_set_clamps_and_parses() {
        let mut device = DeviceSettings::default();

        assert_eq!(
            device.set("sextoy_caption_chance", "150").unwrap(),
            SettingValue::Percentage(100)
        );
        assert_eq!(device.sextoy_caption_chance, 100);

        assert_eq!(
            device.set("sextoy_video_open_vibration_length", "7.5").unwrap(),
            SettingValue::Float(3.0)
        );
        assert_eq!(device.sextoy_video_open_vibration_length, 3.0);

        device.set("sextoy_prompt_enabled", "on").unwrap();
        assert!(device.sextoy_prompt_enabled);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut device = DeviceSettings::default();
        assert!(matches!(
            device.set("sextoy_warp_drive", "1"),
            Err(PackError::UnknownSetting(_))
        ));
        assert!(matches!(
            device.set("sextoy_prompt_enabled", "maybe"),
            Err(PackError::InvalidSetting { .. })
        ));
        assert!(matches!(
            device.set("sextoy_caption_vibration_length", "NaN"),
            Err(PackError::InvalidSetting { .. })
        ));
        assert_eq!(device, DeviceSettings::default());
    }

    #[test]
    fn test_register_keeps_existing() {
        let mut devices = BTreeMap::new();
        assert!(register_device(&mut devices, "0", Some("Lush")));
        devices.get_mut("0").unwrap().sextoy_caption_chance = 40;

        assert!(!register_device(&mut devices, "0", Some("Renamed")));
        assert_eq!(devices["0"].sextoy_name, "Lush");
        assert_eq!(devices["0"].sextoy_caption_chance, 40);

        assert!(register_device(&mut devices, "3", None));
        assert_eq!(devices["3"].sextoy_name, "Device 3");
    }

    #[test]
    fn test_partial_device_json_uses_defaults() {
        let device: DeviceSettings =
            serde_json::from_str(r#"{"sextoy_name": "Edge", "sextoy_caption_chance": 20}"#).unwrap();
        assert_eq!(device.sextoy_caption_chance, 20);
        assert_eq!(device.sextoy_general_vibration_force, 50);
        assert_eq!(device.sextoy_caption_vibration_length, 0.5);
    }

    #[test]
    fn test_setting_label() {
        assert_eq!(setting_label("sextoy_image_open_chance"), "Image Open Chance");
    }
}
