//! Application-level configuration loading, including the station layout
//! and the action-button label sets.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{
    coordinator::TurnCoordinator,
    session::{ButtonLabels, ParticipantSession, ScreenSlot},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "STORY_WEAVE_BACK_CONFIG_PATH";
/// Each action panel carries exactly this many buttons.
const PANEL_BUTTON_COUNT: usize = 3;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    stations: Vec<StationConfig>,
    labels: ButtonLabels,
}

/// One configured keyboard station.
#[derive(Debug, Clone)]
pub struct StationConfig {
    /// Identifier presentation clients use in commands.
    pub id: String,
    /// Fixed slot around the shared table.
    pub slot: ScreenSlot,
    /// Identity used when logging in as a guest at this station.
    pub guest_name: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// baked-in four-station table.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        stations = app_config.stations.len(),
                        "loaded station layout from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// The configured stations in table order.
    pub fn stations(&self) -> &[StationConfig] {
        &self.stations
    }

    /// Build the turn coordinator over the configured stations.
    pub fn build_coordinator(&self) -> TurnCoordinator {
        let sessions = self
            .stations
            .iter()
            .map(|station| {
                ParticipantSession::new(
                    station.id.clone(),
                    station.slot,
                    station.guest_name.clone(),
                )
            })
            .collect();
        TurnCoordinator::new(sessions, self.labels.clone())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stations: default_stations(),
            labels: ButtonLabels::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    stations: Vec<RawStation>,
    #[serde(default)]
    buttons: Option<RawButtons>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single station entry.
struct RawStation {
    id: String,
    slot: String,
    guest_name: String,
}

#[derive(Debug, Deserialize)]
/// JSON representation of the two action-button label sets.
struct RawButtons {
    left: Vec<String>,
    right: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let mut stations = Vec::with_capacity(value.stations.len());
        for raw in value.stations {
            let Some(slot) = parse_slot(&raw.slot) else {
                warn!(station = %raw.id, slot = %raw.slot, "unknown screen slot; skipping station");
                continue;
            };
            if stations
                .iter()
                .any(|existing: &StationConfig| existing.id == raw.id)
            {
                warn!(station = %raw.id, "duplicate station id; skipping entry");
                continue;
            }
            stations.push(StationConfig {
                id: raw.id,
                slot,
                guest_name: raw.guest_name,
            });
        }

        if stations.is_empty() {
            warn!("config declared no usable stations; using built-in defaults");
            stations = default_stations();
        }

        let labels = value
            .buttons
            .and_then(|buttons| build_labels(buttons))
            .unwrap_or_default();

        Self { stations, labels }
    }
}

/// Validate a configured label set, refusing wrong arity or blank labels.
fn build_labels(buttons: RawButtons) -> Option<ButtonLabels> {
    let valid = |set: &[String]| {
        set.len() == PANEL_BUTTON_COUNT && set.iter().all(|label| !label.trim().is_empty())
    };

    if !valid(&buttons.left) || !valid(&buttons.right) {
        warn!("button label sets must hold exactly three non-empty labels; using defaults");
        return None;
    }

    let into_triple = |mut set: Vec<String>| {
        let third = set.pop()?;
        let second = set.pop()?;
        let first = set.pop()?;
        Some([first, second, third])
    };

    Some(ButtonLabels {
        left: into_triple(buttons.left)?,
        right: into_triple(buttons.right)?,
    })
}

fn parse_slot(value: &str) -> Option<ScreenSlot> {
    match value {
        "bottom-left" => Some(ScreenSlot::BottomLeft),
        "bottom-right" => Some(ScreenSlot::BottomRight),
        "top-left" => Some(ScreenSlot::TopLeft),
        "top-right" => Some(ScreenSlot::TopRight),
        _ => None,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in four-keyboard table layout shipped with the binary.
fn default_stations() -> Vec<StationConfig> {
    vec![
        StationConfig {
            id: "kb-1".into(),
            slot: ScreenSlot::BottomLeft,
            guest_name: "Guest1".into(),
        },
        StationConfig {
            id: "kb-2".into(),
            slot: ScreenSlot::TopLeft,
            guest_name: "Guest2".into(),
        },
        StationConfig {
            id: "kb-3".into(),
            slot: ScreenSlot::TopRight,
            guest_name: "Guest3".into(),
        },
        StationConfig {
            id: "kb-4".into(),
            slot: ScreenSlot::BottomRight,
            guest_name: "Guest4".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_parses_slots_and_skips_unknown() {
        let raw = RawConfig {
            stations: vec![
                RawStation {
                    id: "a".into(),
                    slot: "top-left".into(),
                    guest_name: "GuestA".into(),
                },
                RawStation {
                    id: "b".into(),
                    slot: "sideways".into(),
                    guest_name: "GuestB".into(),
                },
            ],
            buttons: None,
        };

        let config: AppConfig = raw.into();
        assert_eq!(config.stations().len(), 1);
        assert_eq!(config.stations()[0].slot, ScreenSlot::TopLeft);
    }

    #[test]
    fn invalid_button_labels_fall_back_to_defaults() {
        let raw = RawConfig {
            stations: vec![RawStation {
                id: "a".into(),
                slot: "bottom-left".into(),
                guest_name: "GuestA".into(),
            }],
            buttons: Some(RawButtons {
                left: vec!["ONLY".into(), "TWO".into()],
                right: vec!["".into(), "B".into(), "C".into()],
            }),
        };

        let config: AppConfig = raw.into();
        assert_eq!(config.labels.left[2], "PARTICIPATE");
        assert_eq!(config.labels.right[0], "FINISH STORY");
    }
}
