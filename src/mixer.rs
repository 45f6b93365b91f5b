//! Mixer-side command surface
//!
//! The Ui24R speaks a textual socket protocol handled entirely outside this
//! crate. The bridge only hands opaque command tokens and resolved channel
//! values to a [`MixerLink`]; it never builds or parses mixer messages.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::config::RecButtonBehavior;

/// Opaque Ui24R command tokens, passed to the transport verbatim.
pub mod tokens {
    pub const MTK_RECORD_TOGGLE: &str = "3:::MTK_REC_TOGGLE";
    pub const RECORD_TOGGLE: &str = "3:::RECTOGGLE";
    pub const MEDIA_PLAY: &str = "3:::MEDIA_PLAY";
    pub const MEDIA_STOP: &str = "3:::MEDIA_STOP";
    pub const MEDIA_NEXT: &str = "3:::MEDIA_NEXT";
    pub const MEDIA_PREV: &str = "3:::MEDIA_PREV";
}

/// Tokens the record button fires under a given behavior setting.
pub fn record_toggle_tokens(behavior: RecButtonBehavior) -> &'static [&'static str] {
    match behavior {
        RecButtonBehavior::OnlyTwoTrack => &[tokens::RECORD_TOGGLE],
        RecButtonBehavior::OnlyMultitrack => &[tokens::MTK_RECORD_TOGGLE],
        RecButtonBehavior::TwoTrackAndMultitrack => {
            &[tokens::RECORD_TOGGLE, tokens::MTK_RECORD_TOGGLE]
        }
    }
}

/// Sink for logical events flowing toward the mixer.
///
/// Implementations use interior mutability so they can be shared behind an
/// `Arc` across the event loop and feedback tasks.
#[async_trait]
pub trait MixerLink: Send + Sync {
    /// Send an opaque command token.
    async fn send_command(&self, token: &str) -> Result<()>;

    /// Set a logical channel's fader level (normalized).
    async fn set_fader_level(&self, channel: u16, value: f64) -> Result<()>;

    /// Trim a logical channel's input gain by signed ticks.
    async fn trim_gain(&self, channel: u16, direction: i8) -> Result<()>;

    /// Mark a logical channel as the selected one.
    async fn select_channel(&self, channel: u16) -> Result<()>;
}

/// Logs every mixer-bound event instead of sending it anywhere. Useful for
/// running against the surface without a mixer on the network.
pub struct ConsoleLink;

#[async_trait]
impl MixerLink for ConsoleLink {
    async fn send_command(&self, token: &str) -> Result<()> {
        info!("mixer command: {}", token);
        Ok(())
    }

    async fn set_fader_level(&self, channel: u16, value: f64) -> Result<()> {
        info!("mixer fader: ch {} => {:.4}", channel, value);
        Ok(())
    }

    async fn trim_gain(&self, channel: u16, direction: i8) -> Result<()> {
        info!("mixer gain: ch {} {:+}", channel, direction);
        Ok(())
    }

    async fn select_channel(&self, channel: u16) -> Result<()> {
        info!("mixer select: ch {}", channel);
        Ok(())
    }
}
