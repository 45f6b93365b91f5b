//! UI24R Bridge
//!
//! Bridges a Behringer X-Touch (MCU mode) control surface to a Soundcraft
//! Ui24R mixer: decodes the surface's 3-byte frames into logical mixer
//! events, resolves physical fader slots to mixer channels through the
//! bank/layer matrix, and drives motorized faders and LEDs from mixer state.

pub mod bridge;
pub mod config;
pub mod fader_cache;
pub mod layers;
pub mod mcu;
pub mod mixer;
pub mod surface;

pub use bridge::{Bridge, BridgeEvent, FrameOutcome};
pub use config::BridgeConfig;
pub use layers::{LayerMatrix, UserLayerRow, MASTER_CHANNEL};
pub use mcu::{Frame, SurfaceEvent};
pub use mixer::{ConsoleLink, MixerLink};
pub use surface::{Surface, SurfaceError, SurfaceFrame};
