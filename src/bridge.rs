//! Bridge core - wires the frame codec to the layer matrix and fader cache
//!
//! Inbound raw frames are decoded, resolved against the current layer, and
//! surfaced as logical mixer events. Feedback commands (fader motors, LEDs)
//! are encoded back into frames. The fader cache and layer matrix share one
//! mutex so inbound processing and asynchronous mixer feedback never
//! interleave mid-update.

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::fader_cache::FaderCache;
use crate::layers::{LayerMatrix, UserLayerRow};
use crate::mcu::{self, Frame, SurfaceEvent};

/// Logical event emitted toward the mixer side. Channels are logical mixer
/// channel ids, already resolved through the layer matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BridgeEvent {
    /// A fader now represents this level for a logical channel.
    FaderLevel { channel: u16, value: f64 },
    /// Gain trim ticks for a logical channel.
    GainTrim { channel: u16, direction: i8 },
    /// Operator selected a logical channel.
    ChannelSelected { channel: u16 },
    /// Navigation moved to a different layer.
    LayerChanged { glyph: char, layer: usize },
}

/// Result of processing one inbound frame: logical events for the mixer
/// side, plus feedback frames to send back to the surface.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameOutcome {
    pub events: Vec<BridgeEvent>,
    pub feedback: Vec<Frame>,
}

struct BridgeState {
    faders: FaderCache,
    layers: LayerMatrix,
}

/// Composition root of the protocol bridge.
///
/// All state mutation goes through a single lock; every operation is pure
/// in-memory computation, so the lock is held only briefly.
pub struct Bridge {
    state: Mutex<BridgeState>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BridgeState {
                faders: FaderCache::new(),
                layers: LayerMatrix::new(),
            }),
        }
    }

    /// Process one raw frame from the surface.
    pub fn handle_frame(&self, raw: &[u8]) -> FrameOutcome {
        let event = mcu::decode(raw);
        trace!("decoded {:02X?} => {:?}", raw, event);

        let mut state = self.state.lock();
        let mut outcome = FrameOutcome::default();

        match event {
            SurfaceEvent::FaderMove { channel, value } => {
                state.faders.set(channel, value);
                if let Some(logical) = state.layers.channel_at_slot(channel as i32) {
                    outcome.events.push(BridgeEvent::FaderLevel {
                        channel: logical,
                        value,
                    });
                }
            }
            SurfaceEvent::FaderRelease { channel } => {
                // Re-assert the motor to the last known value; the release
                // itself carries no new position.
                if let Some(value) = state.faders.get(channel) {
                    if let Some(frame) = mcu::encode_fader_set(channel, value) {
                        outcome.feedback.push(frame);
                    }
                }
            }
            SurfaceEvent::PresetUp => {
                state.layers.step_layer_up();
                let (glyph, layer) = state.layers.layer_label();
                debug!("layer up => {}{}", glyph, layer);
                outcome.events.push(BridgeEvent::LayerChanged { glyph, layer });
            }
            SurfaceEvent::PresetDown => {
                state.layers.step_layer_down();
                let (glyph, layer) = state.layers.layer_label();
                debug!("layer down => {}{}", glyph, layer);
                outcome.events.push(BridgeEvent::LayerChanged { glyph, layer });
            }
            SurfaceEvent::SelectPress { channel } => {
                if let Some(logical) = state.layers.channel_at_slot(channel as i32) {
                    outcome
                        .events
                        .push(BridgeEvent::ChannelSelected { channel: logical });
                }
            }
            SurfaceEvent::KnobTurn { channel, direction } => {
                if let Some(logical) = state.layers.channel_at_slot(channel as i32) {
                    outcome.events.push(BridgeEvent::GainTrim {
                        channel: logical,
                        direction,
                    });
                }
            }
            SurfaceEvent::Unrecognized => {}
        }

        outcome
    }

    /// Drive a fader motor and remember the value, so a later touch-release
    /// re-asserts the mixer's position instead of a stale surface one.
    /// Returns `None` for out-of-range channels; nothing is cached then.
    pub fn set_fader(&self, channel: u8, value: f64) -> Option<Frame> {
        let frame = mcu::encode_fader_set(channel, value)?;
        self.state.lock().faders.set(channel, value);
        Some(frame)
    }

    /// Set a gain LED ring from a normalized value.
    pub fn set_gain_led(&self, channel: u8, value: f64) -> Option<Frame> {
        mcu::encode_gain_led(channel, value)
    }

    /// Light one select LED (clearing all others first), or clear them all.
    pub fn set_select_led(&self, channel: u8, on: bool) -> Vec<Frame> {
        mcu::encode_select_led(channel, on)
    }

    /// Replace the user bank from an externally loaded table.
    pub fn bulk_set_user_bank(&self, rows: &[UserLayerRow]) {
        self.state.lock().layers.bulk_set_user_bank(rows);
    }

    /// Snapshot the user bank for the external settings store.
    pub fn user_bank_rows(&self) -> Vec<UserLayerRow> {
        self.state.lock().layers.user_bank_rows()
    }

    /// Assign a channel to a bank/layer/slot (silent no-op out of range).
    pub fn set_bank_layer_position(
        &self,
        channel: Option<u16>,
        bank: usize,
        layer: usize,
        position: usize,
    ) {
        self.state
            .lock()
            .layers
            .set_bank_layer_position(channel, bank, layer, position);
    }

    pub fn step_layer_up(&self) -> (char, usize) {
        let mut state = self.state.lock();
        state.layers.step_layer_up();
        state.layers.layer_label()
    }

    pub fn step_layer_down(&self) -> (char, usize) {
        let mut state = self.state.lock();
        state.layers.step_layer_down();
        state.layers.layer_label()
    }

    pub fn step_bank_up(&self) -> (char, usize) {
        let mut state = self.state.lock();
        state.layers.step_bank_up();
        state.layers.layer_label()
    }

    pub fn step_bank_down(&self) -> (char, usize) {
        let mut state = self.state.lock();
        state.layers.step_bank_down();
        state.layers.layer_label()
    }

    pub fn layer_label(&self) -> (char, usize) {
        self.state.lock().layers.layer_label()
    }

    /// Slot assignments of the current layer.
    pub fn current_layer(&self) -> [Option<u16>; crate::layers::NUM_FADERS] {
        self.state.lock().layers.current_layer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::MASTER_CHANNEL;

    #[test]
    fn fader_move_resolves_logical_channel() {
        let bridge = Bridge::new();
        let outcome = bridge.handle_frame(&[0xE3, 0x7F, 0x3F]);
        assert!(outcome.feedback.is_empty());
        assert_eq!(outcome.events.len(), 1);
        match outcome.events[0] {
            BridgeEvent::FaderLevel { channel, value } => {
                // Initial layer 1 maps slot 3 to channel 3
                assert_eq!(channel, 3);
                assert!(value > 0.0 && value < 1.0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn master_fader_resolves_master_channel() {
        let bridge = Bridge::new();
        let outcome = bridge.handle_frame(&[0xE8, 0x00, 0x40]);
        assert_eq!(outcome.events.len(), 1);
        assert!(matches!(
            outcome.events[0],
            BridgeEvent::FaderLevel {
                channel: MASTER_CHANNEL,
                ..
            }
        ));
    }

    #[test]
    fn release_reasserts_cached_value() {
        let bridge = Bridge::new();
        bridge.handle_frame(&[0xE2, 0x10, 0x20]);
        let outcome = bridge.handle_frame(&[0x90, 0x6A, 0x00]);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.feedback, vec![[0xE2, 0x10, 0x20]]);
    }

    #[test]
    fn release_without_history_is_silent() {
        let bridge = Bridge::new();
        let outcome = bridge.handle_frame(&[0x90, 0x6A, 0x00]);
        assert_eq!(outcome, FrameOutcome::default());
    }

    #[test]
    fn release_reasserts_administrative_value() {
        let bridge = Bridge::new();
        // Mixer feedback moved the fader; operator then touches and releases
        let frame = bridge.set_fader(5, 0.25).unwrap();
        let outcome = bridge.handle_frame(&[0x90, 0x6D, 0x00]);
        assert_eq!(outcome.feedback, vec![frame]);
    }

    #[test]
    fn preset_buttons_navigate_layers() {
        let bridge = Bridge::new();
        let up = bridge.handle_frame(&[0x90, 0x2F, 0x7F]);
        assert_eq!(
            up.events,
            vec![BridgeEvent::LayerChanged {
                glyph: 'I',
                layer: 2
            }]
        );
        let down = bridge.handle_frame(&[0x90, 0x2E, 0x7F]);
        assert_eq!(
            down.events,
            vec![BridgeEvent::LayerChanged {
                glyph: 'I',
                layer: 1
            }]
        );
    }

    #[test]
    fn fader_moves_follow_layer_changes() {
        let bridge = Bridge::new();
        bridge.handle_frame(&[0x90, 0x2F, 0x7F]);
        let outcome = bridge.handle_frame(&[0xE0, 0x00, 0x40]);
        // Initial layer 2 maps slot 0 to channel 8
        assert!(matches!(
            outcome.events[0],
            BridgeEvent::FaderLevel { channel: 8, .. }
        ));
    }

    #[test]
    fn select_and_knob_resolve_channels() {
        let bridge = Bridge::new();
        let select = bridge.handle_frame(&[0x90, 0x19, 0x7F]);
        assert_eq!(
            select.events,
            vec![BridgeEvent::ChannelSelected { channel: 1 }]
        );

        let knob = bridge.handle_frame(&[0xB0, 0x12, 0x42]);
        assert_eq!(
            knob.events,
            vec![BridgeEvent::GainTrim {
                channel: 2,
                direction: -2
            }]
        );
    }

    #[test]
    fn events_on_empty_slots_are_dropped() {
        let bridge = Bridge::new();
        bridge.set_bank_layer_position(Some(30), 1, 0, 0);
        bridge.step_bank_up();
        assert_eq!(bridge.layer_label(), ('V', 1));

        // Slot 0 is assigned, slot 1 is not
        let assigned = bridge.handle_frame(&[0xE0, 0x00, 0x40]);
        assert_eq!(assigned.events.len(), 1);
        let unassigned = bridge.handle_frame(&[0xE1, 0x00, 0x40]);
        assert!(unassigned.events.is_empty());
    }

    #[test]
    fn unrecognized_frames_produce_nothing() {
        let bridge = Bridge::new();
        assert_eq!(bridge.handle_frame(&[0xF8]), FrameOutcome::default());
        assert_eq!(
            bridge.handle_frame(&[0xA0, 0x01, 0x02]),
            FrameOutcome::default()
        );
    }

    #[test]
    fn command_surface_encodes_feedback() {
        let bridge = Bridge::new();
        assert_eq!(bridge.set_fader(9, 0.5), None);
        assert_eq!(bridge.set_gain_led(0, 0.0), Some([0xB0, 0x30, 0x01]));
        assert_eq!(bridge.set_select_led(1, true).len(), 9);
        assert_eq!(bridge.set_select_led(0, false).len(), 8);
    }

    #[test]
    fn bank_stepping_over_command_surface() {
        let bridge = Bridge::new();
        assert_eq!(bridge.step_bank_up(), ('V', 1));
        assert_eq!(bridge.step_bank_up(), ('U', 1));
        assert_eq!(bridge.step_bank_up(), ('I', 1));
        assert_eq!(bridge.step_bank_down(), ('U', 1));
    }
}
