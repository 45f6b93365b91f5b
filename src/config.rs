//! Configuration for the bridge
//!
//! Loaded from a YAML file: mixer address and sync id, MIDI port name
//! patterns for the control surface, and the transport-button behavior
//! switches the operator can customize.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    pub mixer: MixerConfig,
    pub midi: MidiConfig,
    #[serde(default)]
    pub buttons: ButtonConfig,
}

/// Mixer-side connection parameters. The network transport itself lives
/// outside this crate; these values are handed to it verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MixerConfig {
    /// Ui24R address, e.g. "192.168.1.123".
    pub address: String,
    #[serde(default = "default_sync_id")]
    pub sync_id: String,
}

/// MIDI port configuration for the control surface. Names are matched by
/// case-insensitive substring.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    pub input_port: String,
    pub output_port: String,
}

/// Behavior switches for the surface's transport and record buttons.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ButtonConfig {
    #[serde(default)]
    pub rec: RecButtonBehavior,
    #[serde(default)]
    pub channel_rec: ChannelRecButtonBehavior,
    #[serde(default)]
    pub aux: AuxButtonBehavior,
}

/// What the global record button toggles on the mixer.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecButtonBehavior {
    OnlyTwoTrack,
    OnlyMultitrack,
    #[default]
    TwoTrackAndMultitrack,
}

/// What a channel strip's record button controls.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRecButtonBehavior {
    #[default]
    Rec,
    Phantom,
}

/// Whether aux-select buttons latch or release.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuxButtonBehavior {
    #[default]
    Release,
    Lock,
}

fn default_sync_id() -> String {
    "SYNC_ID".to_string()
}

impl BridgeConfig {
    /// Load and parse a YAML configuration file.
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: BridgeConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }
}
