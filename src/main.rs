//! UI24R Bridge - binary entrypoint
//!
//! Connects the X-Touch surface, runs the frame-processing loop, and sinks
//! logical events into a mixer link.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ui24r_bridge::bridge::{Bridge, BridgeEvent};
use ui24r_bridge::config::BridgeConfig;
use ui24r_bridge::mixer::{record_toggle_tokens, ConsoleLink, MixerLink};
use ui24r_bridge::surface::{self, Surface};

/// UI24R Bridge - control a Soundcraft Ui24R from a Behringer X-Touch
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_ports {
        surface::list_ports_formatted();
        return Ok(());
    }

    info!("Starting UI24R Bridge...");
    info!("Configuration file: {}", args.config);

    let config = BridgeConfig::load(&args.config).await?;
    info!(
        "Mixer at {} (sync id '{}'), record behavior fires {:?}",
        config.mixer.address,
        config.mixer.sync_id,
        record_toggle_tokens(config.buttons.rec)
    );

    let mut surface = Surface::new(&config);
    surface.connect()?;

    let mut frame_rx = surface
        .take_frame_receiver()
        .ok_or_else(|| anyhow::anyhow!("Frame receiver already taken"))?;

    let bridge = Bridge::new();
    let link: Arc<dyn MixerLink> = Arc::new(ConsoleLink);

    let (glyph, layer) = bridge.layer_label();
    info!("Active layer: {}{}", glyph, layer);

    loop {
        tokio::select! {
            maybe_frame = frame_rx.recv() => {
                let Some(frame) = maybe_frame else {
                    warn!("Surface frame channel closed");
                    break;
                };
                let outcome = bridge.handle_frame(&frame.data);

                if let Err(e) = surface.send_frames(&outcome.feedback) {
                    warn!("Failed to send feedback to surface: {}", e);
                }

                for event in outcome.events {
                    if let Err(e) = dispatch_event(&*link, event).await {
                        warn!("Mixer link rejected event: {}", e);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    surface.disconnect();
    info!("UI24R Bridge shutdown complete");
    Ok(())
}

async fn dispatch_event(link: &dyn MixerLink, event: BridgeEvent) -> Result<()> {
    match event {
        BridgeEvent::FaderLevel { channel, value } => link.set_fader_level(channel, value).await,
        BridgeEvent::GainTrim { channel, direction } => link.trim_gain(channel, direction).await,
        BridgeEvent::ChannelSelected { channel } => link.select_channel(channel).await,
        BridgeEvent::LayerChanged { glyph, layer } => {
            info!("Active layer: {}{}", glyph, layer);
            Ok(())
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
