//! Bank/layer channel mapping and navigation
//!
//! The surface has 9 physical fader slots; the mixer has far more channels.
//! A `Layer` assigns a logical channel to each slot, layers are grouped into
//! three banks (initial, view, user), and navigation steps through them with
//! wraparound, skipping layers that have nothing assigned.

use serde::{Deserialize, Serialize};

pub const NUM_BANKS: usize = 3;
pub const LAYERS_PER_BANK: usize = 6;
pub const NUM_FADERS: usize = 9;
const NUM_LAYERS: usize = NUM_BANKS * LAYERS_PER_BANK;

/// Logical mixer channel id of the fixed master slot (slot 8).
pub const MASTER_CHANNEL: u16 = 54;

/// Internal sentinel for an unassigned slot. A layer is empty iff its slot 0
/// holds this value. The public API exposes unassigned slots as `None`.
const EMPTY: i32 = -1;

/// One user-bank layer row as supplied by an external settings loader.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserLayerRow(pub Vec<i32>);

/// Parse a user-bank table from the JSON array-of-arrays format the
/// external settings store uses.
pub fn user_bank_rows_from_json(json: &str) -> serde_json::Result<Vec<UserLayerRow>> {
    serde_json::from_str(json)
}

/// The 3 x 6 x 9 slot-to-channel grid plus the navigation cursor.
///
/// Bank 0 is the factory layout (sequential channels), bank 1 the view
/// layout (empty until populated externally), bank 2 the user layout
/// (editable, persisted externally). `selected_layer` is the absolute layer
/// index in 0..18; the bank index is always `selected_layer / 6`.
#[derive(Debug)]
pub struct LayerMatrix {
    layers: [[i32; NUM_FADERS]; NUM_LAYERS],
    selected_layer: usize,
    selected_bank: usize,
}

impl Default for LayerMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerMatrix {
    pub fn new() -> Self {
        let mut layers = [[EMPTY; NUM_FADERS]; NUM_LAYERS];

        // Initial and user banks: sequential channel numbering, 8 channels
        // per layer. The view bank stays unassigned apart from the master.
        for bank in [0, 2] {
            for layer in 0..LAYERS_PER_BANK {
                for slot in 0..NUM_FADERS - 1 {
                    layers[bank * LAYERS_PER_BANK + layer][slot] =
                        (slot + layer * (NUM_FADERS - 1)) as i32;
                }
            }
        }
        // Slot 8 is the master fader in every layer of every bank.
        for layer in layers.iter_mut() {
            layer[NUM_FADERS - 1] = MASTER_CHANNEL as i32;
        }

        Self {
            layers,
            selected_layer: 0,
            selected_bank: 0,
        }
    }

    /// Assign a channel to a slot of any bank/layer. Out-of-range indices
    /// are silent no-ops, and slot 8 (the master) is never writable.
    pub fn set_bank_layer_position(
        &mut self,
        channel: Option<u16>,
        bank: usize,
        layer: usize,
        position: usize,
    ) {
        if bank >= NUM_BANKS || layer >= LAYERS_PER_BANK || position >= NUM_FADERS - 1 {
            return;
        }
        self.layers[bank * LAYERS_PER_BANK + layer][position] =
            channel.map_or(EMPTY, |ch| ch as i32);
    }

    /// Overwrite the user bank (bank 2) from an externally loaded table.
    ///
    /// Rows beyond 6 and columns beyond 8 are ignored; shorter input leaves
    /// the remaining slots untouched. Negative entries mark a slot
    /// unassigned.
    pub fn bulk_set_user_bank(&mut self, rows: &[UserLayerRow]) {
        for (layer, row) in rows.iter().enumerate().take(LAYERS_PER_BANK) {
            let base = 2 * LAYERS_PER_BANK + layer;
            for (slot, &value) in row.0.iter().enumerate().take(NUM_FADERS - 1) {
                self.layers[base][slot] = if value < 0 { EMPTY } else { value };
            }
        }
    }

    /// Snapshot of the user bank in the same row shape `bulk_set_user_bank`
    /// accepts, for handing back to the external settings store.
    pub fn user_bank_rows(&self) -> Vec<UserLayerRow> {
        (0..LAYERS_PER_BANK)
            .map(|layer| {
                UserLayerRow(
                    self.layers[2 * LAYERS_PER_BANK + layer][..NUM_FADERS - 1].to_vec(),
                )
            })
            .collect()
    }

    /// Slot assignments of the currently selected layer.
    pub fn current_layer(&self) -> [Option<u16>; NUM_FADERS] {
        let mut out = [None; NUM_FADERS];
        for (slot, value) in self.layers[self.selected_layer].iter().enumerate() {
            if *value >= 0 {
                out[slot] = Some(*value as u16);
            }
        }
        out
    }

    /// Channel assigned to a physical slot under the current layer.
    ///
    /// The slot is taken modulo 9 and clamped to zero first, so upstream
    /// index arithmetic never needs bounds checks.
    pub fn channel_at_slot(&self, slot: i32) -> Option<u16> {
        let mut slot = slot % NUM_FADERS as i32;
        if slot < 0 {
            slot = 0;
        }
        let value = self.layers[self.selected_layer][slot as usize];
        (value >= 0).then_some(value as u16)
    }

    /// Display glyph for a bank: 'I'nitial, 'V'iew, 'U'ser.
    pub fn bank_glyph(bank: usize) -> char {
        match bank {
            0 => 'I',
            1 => 'V',
            _ => 'U',
        }
    }

    /// Current position as (bank glyph, 1-based layer number).
    pub fn layer_label(&self) -> (char, usize) {
        (
            Self::bank_glyph(self.selected_bank),
            self.selected_layer % LAYERS_PER_BANK + 1,
        )
    }

    pub fn selected_bank(&self) -> usize {
        self.selected_bank
    }

    /// Layer index within the current bank.
    pub fn selected_layer(&self) -> usize {
        self.selected_layer % LAYERS_PER_BANK
    }

    pub fn step_layer_up(&mut self) {
        self.selected_layer =
            (self.selected_layer + 1) % LAYERS_PER_BANK + LAYERS_PER_BANK * self.selected_bank;
        self.skip_empty_up();
    }

    pub fn step_layer_down(&mut self) {
        self.selected_layer = (self.selected_layer + LAYERS_PER_BANK - 1) % LAYERS_PER_BANK
            + LAYERS_PER_BANK * self.selected_bank;
        self.skip_empty_down();
    }

    pub fn step_bank_up(&mut self) {
        self.selected_bank = (self.selected_bank + 1) % NUM_BANKS;
        self.selected_layer = self.selected_bank * LAYERS_PER_BANK;
        self.skip_empty_up();
    }

    pub fn step_bank_down(&mut self) {
        self.selected_bank = (self.selected_bank + NUM_BANKS - 1) % NUM_BANKS;
        self.selected_layer = self.selected_bank * LAYERS_PER_BANK;
        self.skip_empty_down();
    }

    fn layer_is_empty(&self, absolute: usize) -> bool {
        self.layers[absolute][0] == EMPTY
    }

    /// Advance past empty layers, wrapping across the whole bank x layer
    /// space. Hitting a bank's layer-0 boundary means the scan has lapped the
    /// remainder of the current bank without finding anything; the cursor is
    /// then forced to the current bank's first layer and the scan stops,
    /// accepting an empty layer when the whole bank is unassigned. Terminates
    /// in at most 18 steps.
    fn skip_empty_up(&mut self) {
        while self.layer_is_empty(self.selected_layer) {
            self.selected_layer = (self.selected_layer + 1) % NUM_LAYERS;
            if self.selected_layer % LAYERS_PER_BANK == 0 {
                self.selected_layer = self.selected_bank * LAYERS_PER_BANK;
                break;
            }
        }
        self.selected_bank = self.selected_layer / LAYERS_PER_BANK;
    }

    /// Mirror of [`skip_empty_up`](Self::skip_empty_up); the boundary is a
    /// bank's last layer when scanning downward.
    fn skip_empty_down(&mut self) {
        while self.layer_is_empty(self.selected_layer) {
            self.selected_layer = (NUM_LAYERS + self.selected_layer - 1) % NUM_LAYERS;
            if self.selected_layer % LAYERS_PER_BANK == LAYERS_PER_BANK - 1 {
                self.selected_layer = self.selected_bank * LAYERS_PER_BANK;
                break;
            }
        }
        self.selected_bank = self.selected_layer / LAYERS_PER_BANK;
    }
}
