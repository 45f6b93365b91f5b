//! MCU-protocol frame codec for the X-Touch control surface
//!
//! Translates the surface's 3-byte MIDI frames into semantic events and
//! semantic feedback commands back into frames. Stateless; all context is
//! passed in by the caller.

/// A fixed 3-byte control-surface message.
pub type Frame = [u8; 3];

/// Number of physical faders: 8 channel strips plus the master strip.
pub const FADER_COUNT: u8 = 9;

/// Full scale of the 14-bit fader value encoding.
pub const FADER_RESOLUTION: f64 = 16383.0;

/// Semantic event decoded from a surface frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// Fader moved by the operator. `value` is normalized to [0.0, 1.0]
    /// from the 14-bit pitch-bend encoding (byte1 low 7 bits, byte2 high 7).
    FaderMove { channel: u8, value: f64 },

    /// Touch-release on a motorized fader. The correct response is to
    /// re-assert the last cached value, not to treat this as a new position.
    FaderRelease { channel: u8 },

    /// Fader-bank right button.
    PresetUp,

    /// Fader-bank left button.
    PresetDown,

    /// Channel select button press.
    SelectPress { channel: u8 },

    /// Gain knob turned; direction is a signed tick count in
    /// {-3..-1, 1..3}.
    KnobTurn { channel: u8, direction: i8 },

    /// Frame matched no known pattern (or was shorter than 3 bytes).
    /// Never an error; the frame simply produces no action.
    Unrecognized,
}

/// Decode a raw frame into a [`SurfaceEvent`].
///
/// Patterns are tried in a fixed priority order (fader release, preset
/// buttons, select press, fader move, knob turn) because status bytes
/// partially overlap across categories. The data-byte ranges keep the
/// categories disjoint, so the first match is the only match.
pub fn decode(data: &[u8]) -> SurfaceEvent {
    if data.len() < 3 {
        return SurfaceEvent::Unrecognized;
    }
    let (status, d1, d2) = (data[0], data[1], data[2]);

    if status == 0x90 {
        // Fader release: 0x90 [0x68-0x70] 0x00
        if d2 == 0x00 && (0x68..=0x70).contains(&d1) {
            return SurfaceEvent::FaderRelease { channel: d1 - 0x68 };
        }
        // Fader bank right / left
        if d1 == 0x2F && d2 == 0x7F {
            return SurfaceEvent::PresetUp;
        }
        if d1 == 0x2E && d2 == 0x7F {
            return SurfaceEvent::PresetDown;
        }
        // Select button: 0x90 [0x18-0x1F] 0x7F
        if (0x18..=0x1F).contains(&d1) && d2 == 0x7F {
            return SurfaceEvent::SelectPress { channel: d1 - 0x18 };
        }
    } else if (0xE0..=0xE8).contains(&status) {
        // Fader move, 14-bit pitch-bend style encoding
        let raw = ((d2 as u16) << 7) + d1 as u16;
        return SurfaceEvent::FaderMove {
            channel: status - 0xE0,
            value: raw as f64 / FADER_RESOLUTION,
        };
    } else if status == 0xB0 && (0x10..=0x17).contains(&d1) {
        let channel = d1 - 0x10;
        if (0x01..=0x03).contains(&d2) {
            return SurfaceEvent::KnobTurn {
                channel,
                direction: d2 as i8,
            };
        }
        if (0x41..=0x43).contains(&d2) {
            return SurfaceEvent::KnobTurn {
                channel,
                direction: -((d2 & 0x03) as i8),
            };
        }
    }

    SurfaceEvent::Unrecognized
}

/// Encode a motorized-fader position command.
///
/// Returns `None` for channels outside the 9 physical faders; no frame is
/// emitted in that case.
pub fn encode_fader_set(channel: u8, value: f64) -> Option<Frame> {
    if channel >= FADER_COUNT {
        return None;
    }
    let raw = (value * FADER_RESOLUTION).round().clamp(0.0, FADER_RESOLUTION) as u16;
    let lower = (raw & 0x7F) as u8;
    let upper = (raw >> 7) as u8;
    Some([0xE0 + channel, lower, upper])
}

/// Encode a gain-LED ring command.
///
/// The normalized value maps onto segments 1..=11: the extremes are pulled
/// in one segment so the ring is never fully dark or fully lit, which on
/// the hardware would be indistinguishable from "no data".
pub fn encode_gain_led(channel: u8, value: f64) -> Option<Frame> {
    if channel >= FADER_COUNT {
        return None;
    }
    let mut segment = (value * 12.0).round().clamp(0.0, 12.0) as u8;
    if segment == 0 {
        segment = 1;
    }
    if segment == 0x0C {
        segment = 0x0B;
    }
    Some([0xB0, 0x30 + channel, segment])
}

/// Encode a select-LED update as a frame sequence.
///
/// Always clears all eight select LEDs first, then lights the requested one
/// if `on` is set. The clear-all-then-set-one protocol enforces the
/// single-select invariant on the surface itself, so callers never need to
/// track the previous selection. Out-of-range channels with `on` set emit
/// nothing.
pub fn encode_select_led(channel: u8, on: bool) -> Vec<Frame> {
    if on && channel >= FADER_COUNT {
        return Vec::new();
    }
    let mut frames: Vec<Frame> = (0..8).map(|i| [0x90, 0x18 + i, 0x00]).collect();
    if on {
        frames.push([0x90, 0x18 + channel, 0x7F]);
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_fader_move() {
        let event = decode(&[0xE3, 0x7F, 0x3F]);
        let expected = (((0x3F_u16) << 7) + 0x7F) as f64 / FADER_RESOLUTION;
        match event {
            SurfaceEvent::FaderMove { channel, value } => {
                assert_eq!(channel, 3);
                assert!((value - expected).abs() < f64::EPSILON);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn decode_fader_move_extremes() {
        assert_eq!(
            decode(&[0xE0, 0x00, 0x00]),
            SurfaceEvent::FaderMove {
                channel: 0,
                value: 0.0
            }
        );
        assert_eq!(
            decode(&[0xE8, 0x7F, 0x7F]),
            SurfaceEvent::FaderMove {
                channel: 8,
                value: 1.0
            }
        );
    }

    #[test]
    fn decode_fader_release() {
        assert_eq!(
            decode(&[0x90, 0x68, 0x00]),
            SurfaceEvent::FaderRelease { channel: 0 }
        );
        assert_eq!(
            decode(&[0x90, 0x70, 0x00]),
            SurfaceEvent::FaderRelease { channel: 8 }
        );
    }

    #[test]
    fn decode_preset_buttons() {
        assert_eq!(decode(&[0x90, 0x2F, 0x7F]), SurfaceEvent::PresetUp);
        assert_eq!(decode(&[0x90, 0x2E, 0x7F]), SurfaceEvent::PresetDown);
    }

    #[test]
    fn decode_select_press() {
        assert_eq!(
            decode(&[0x90, 0x18, 0x7F]),
            SurfaceEvent::SelectPress { channel: 0 }
        );
        assert_eq!(
            decode(&[0x90, 0x1F, 0x7F]),
            SurfaceEvent::SelectPress { channel: 7 }
        );
        // Select needs full velocity; release-velocity frames don't match
        assert_eq!(decode(&[0x90, 0x18, 0x00]), SurfaceEvent::Unrecognized);
    }

    #[test]
    fn decode_knob_turn() {
        assert_eq!(
            decode(&[0xB0, 0x12, 0x42]),
            SurfaceEvent::KnobTurn {
                channel: 2,
                direction: -2
            }
        );
        assert_eq!(
            decode(&[0xB0, 0x10, 0x01]),
            SurfaceEvent::KnobTurn {
                channel: 0,
                direction: 1
            }
        );
        assert_eq!(
            decode(&[0xB0, 0x17, 0x43]),
            SurfaceEvent::KnobTurn {
                channel: 7,
                direction: -3
            }
        );
        // Zero delta is not a turn
        assert_eq!(decode(&[0xB0, 0x12, 0x00]), SurfaceEvent::Unrecognized);
    }

    #[test]
    fn decode_rejects_short_and_unknown_frames() {
        assert_eq!(decode(&[]), SurfaceEvent::Unrecognized);
        assert_eq!(decode(&[0x90]), SurfaceEvent::Unrecognized);
        assert_eq!(decode(&[0x90, 0x2F]), SurfaceEvent::Unrecognized);
        assert_eq!(decode(&[0xA0, 0x00, 0x00]), SurfaceEvent::Unrecognized);
        assert_eq!(decode(&[0x90, 0x40, 0x7F]), SurfaceEvent::Unrecognized);
    }

    #[test]
    fn fader_release_wins_over_note_patterns() {
        // 0x68 with zero velocity is a release, never a select or preset
        for note in 0x68..=0x70u8 {
            assert_eq!(
                decode(&[0x90, note, 0x00]),
                SurfaceEvent::FaderRelease {
                    channel: note - 0x68
                }
            );
        }
    }

    #[test]
    fn encode_fader_set_frames() {
        assert_eq!(encode_fader_set(0, 0.0), Some([0xE0, 0x00, 0x00]));
        assert_eq!(encode_fader_set(8, 1.0), Some([0xE8, 0x7F, 0x7F]));
        assert_eq!(encode_fader_set(9, 0.5), None);
        // Out-of-range values are clamped onto the wire range
        assert_eq!(encode_fader_set(0, 2.0), Some([0xE0, 0x7F, 0x7F]));
        assert_eq!(encode_fader_set(0, -1.0), Some([0xE0, 0x00, 0x00]));
    }

    #[test]
    fn encode_gain_led_never_fully_dark_or_lit() {
        assert_eq!(encode_gain_led(0, 0.0), Some([0xB0, 0x30, 0x01]));
        assert_eq!(encode_gain_led(0, 1.0), Some([0xB0, 0x30, 0x0B]));
        assert_eq!(encode_gain_led(3, 0.5), Some([0xB0, 0x33, 0x06]));
        assert_eq!(encode_gain_led(9, 0.5), None);
    }

    #[test]
    fn encode_select_led_clears_then_sets() {
        let frames = encode_select_led(2, true);
        assert_eq!(frames.len(), 9);
        for (i, frame) in frames.iter().take(8).enumerate() {
            assert_eq!(*frame, [0x90, 0x18 + i as u8, 0x00]);
        }
        assert_eq!(frames[8], [0x90, 0x1A, 0x7F]);

        let frames = encode_select_led(0, false);
        assert_eq!(frames.len(), 8);
        assert!(frames.iter().all(|f| f[2] == 0x00));

        assert!(encode_select_led(9, true).is_empty());
    }

    proptest! {
        #[test]
        fn fader_value_roundtrip_within_one_step(value in 0.0f64..=1.0) {
            let frame = encode_fader_set(4, value).unwrap();
            match decode(&frame) {
                SurfaceEvent::FaderMove { channel, value: decoded } => {
                    prop_assert_eq!(channel, 4);
                    prop_assert!((decoded - value).abs() < 1.0 / FADER_RESOLUTION);
                }
                other => prop_assert!(false, "unexpected event: {:?}", other),
            }
        }

        #[test]
        fn decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..8)) {
            let _ = decode(&data);
        }
    }
}
