//! Control-surface MIDI transport
//!
//! Owns the midir connections to the X-Touch. Incoming raw frames are pushed
//! onto an mpsc channel for the bridge loop; outgoing feedback frames are
//! written to the output port. Ports are matched by case-insensitive
//! substring, which copes with the numbered port names Windows produces.

use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::mcu::Frame;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("MIDI init failed: {0}")]
    Init(#[from] midir::InitError),
    #[error("MIDI port '{0}' not found")]
    PortNotFound(String),
    #[error("failed to open MIDI port: {0}")]
    Connect(String),
    #[error("MIDI send failed: {0}")]
    Send(#[from] midir::SendError),
    #[error("not connected to surface output")]
    NotConnected,
}

/// Raw frame received from the surface.
#[derive(Debug, Clone)]
pub struct SurfaceFrame {
    pub timestamp: Instant,
    pub data: Vec<u8>,
}

/// MIDI connection to the control surface.
pub struct Surface {
    input_conn: Option<MidiInputConnection<()>>,
    output_conn: Option<Arc<Mutex<MidiOutputConnection>>>,
    frame_tx: mpsc::Sender<SurfaceFrame>,
    frame_rx: Option<mpsc::Receiver<SurfaceFrame>>,
    input_port_name: String,
    output_port_name: String,
}

impl Surface {
    pub fn new(config: &BridgeConfig) -> Self {
        let (frame_tx, frame_rx) = mpsc::channel(1000);
        Self {
            input_conn: None,
            output_conn: None,
            frame_tx,
            frame_rx: Some(frame_rx),
            input_port_name: config.midi.input_port.clone(),
            output_port_name: config.midi.output_port.clone(),
        }
    }

    /// List available MIDI input port names.
    pub fn list_input_ports() -> Result<Vec<String>, SurfaceError> {
        let midi_in = MidiInput::new("UI24R-Bridge-Scanner")?;
        Ok(midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect())
    }

    /// List available MIDI output port names.
    pub fn list_output_ports() -> Result<Vec<String>, SurfaceError> {
        let midi_out = MidiOutput::new("UI24R-Bridge-Scanner")?;
        Ok(midi_out
            .ports()
            .iter()
            .filter_map(|port| midi_out.port_name(port).ok())
            .collect())
    }

    fn find_input_port(
        midi_in: &MidiInput,
        pattern: &str,
    ) -> Option<(midir::MidiInputPort, String)> {
        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                if name.to_lowercase().contains(&pattern.to_lowercase()) {
                    debug!("Found input port '{}' matching '{}'", name, pattern);
                    return Some((port, name));
                }
            }
        }
        None
    }

    fn find_output_port(
        midi_out: &MidiOutput,
        pattern: &str,
    ) -> Option<(midir::MidiOutputPort, String)> {
        for port in midi_out.ports() {
            if let Ok(name) = midi_out.port_name(&port) {
                if name.to_lowercase().contains(&pattern.to_lowercase()) {
                    debug!("Found output port '{}' matching '{}'", name, pattern);
                    return Some((port, name));
                }
            }
        }
        None
    }

    /// Open the surface's input and output ports.
    pub fn connect(&mut self) -> Result<(), SurfaceError> {
        self.disconnect();

        info!(
            "Connecting to surface - input: '{}', output: '{}'",
            self.input_port_name, self.output_port_name
        );

        let midi_in = MidiInput::new("UI24R-Bridge-Input")?;
        let (in_port, in_name) = Self::find_input_port(&midi_in, &self.input_port_name)
            .ok_or_else(|| SurfaceError::PortNotFound(self.input_port_name.clone()))?;

        let frame_tx = self.frame_tx.clone();
        let input_conn = midi_in
            .connect(
                &in_port,
                "UI24R-Bridge",
                move |_timestamp, data, _| {
                    let frame = SurfaceFrame {
                        timestamp: Instant::now(),
                        data: data.to_vec(),
                    };
                    // Drop frames rather than block inside the MIDI callback
                    let _ = frame_tx.try_send(frame);
                },
                (),
            )
            .map_err(|e| SurfaceError::Connect(e.to_string()))?;
        self.input_conn = Some(input_conn);
        info!("Connected to input port: {}", in_name);

        let midi_out = MidiOutput::new("UI24R-Bridge-Output")?;
        let (out_port, out_name) = Self::find_output_port(&midi_out, &self.output_port_name)
            .ok_or_else(|| SurfaceError::PortNotFound(self.output_port_name.clone()))?;

        let output_conn = midi_out
            .connect(&out_port, "UI24R-Bridge")
            .map_err(|e| SurfaceError::Connect(e.to_string()))?;
        self.output_conn = Some(Arc::new(Mutex::new(output_conn)));
        info!("Connected to output port: {}", out_name);

        Ok(())
    }

    pub fn disconnect(&mut self) {
        let was_connected = self.is_connected();
        self.input_conn = None;
        self.output_conn = None;
        if was_connected {
            info!("Surface disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.input_conn.is_some() && self.output_conn.is_some()
    }

    /// Send one feedback frame to the surface.
    pub fn send_frame(&self, frame: Frame) -> Result<(), SurfaceError> {
        let output = self.output_conn.as_ref().ok_or(SurfaceError::NotConnected)?;
        output.lock().send(&frame)?;
        debug!("sent {:02X?}", frame);
        Ok(())
    }

    /// Send a frame sequence in order (e.g. select-LED clear-then-set).
    pub fn send_frames(&self, frames: &[Frame]) -> Result<(), SurfaceError> {
        for frame in frames {
            self.send_frame(*frame)?;
        }
        Ok(())
    }

    /// Take the frame receiver; the bridge loop consumes it.
    pub fn take_frame_receiver(&mut self) -> Option<mpsc::Receiver<SurfaceFrame>> {
        self.frame_rx.take()
    }
}

/// Print port names for `--list-ports`.
pub fn list_ports_formatted() {
    println!("\n=== MIDI Input Ports ===");
    match Surface::list_input_ports() {
        Ok(ports) => {
            for (i, name) in ports.iter().enumerate() {
                println!("  {}: {}", i, name);
            }
        }
        Err(e) => println!("  error: {}", e),
    }

    println!("\n=== MIDI Output Ports ===");
    match Surface::list_output_ports() {
        Ok(ports) => {
            for (i, name) in ports.iter().enumerate() {
                println!("  {}: {}", i, name);
            }
        }
        Err(e) => println!("  error: {}", e),
    }
    println!();
}
