//! Lifecycle event → LED command sequences.
//!
//! Each event maps to a fixed list of [`Step`]s. [`run_steps`] executes them
//! in order on the calling task, so a wait only holds up the session that is
//! running it.

use std::time::Duration;

use tracing::warn;
use wyoming_transport::EventKind;

use crate::xvf::{DeviceCommand, LedEffect, Xvf};

use DeviceCommand::{Brightness, Color, Effect, Gammify, Speed};
use Step::{Issue, Wait};

pub const BRIGHTNESS_FULL: i64 = 255;
pub const BRIGHTNESS_IDLE: i64 = 175;

pub const COLOR_AZURE: i64 = 0x0080FF;
pub const COLOR_CYAN: i64 = 0x00FFFF;
pub const COLOR_GREEN: i64 = 0x00FF00;
pub const COLOR_RED: i64 = 0xFF0000;

/// Device warm-up before the server starts accepting clients.
pub const STARTUP_DELAY: Duration = Duration::from_secs(1);

/// One entry of a dispatch sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Issue(DeviceCommand),
    Wait(Duration),
}

/// Steps for a lifecycle event. Unknown events map to nothing.
pub fn plan(event: &EventKind) -> Vec<Step> {
    match event {
        EventKind::Detection => vec![
            Issue(Effect(LedEffect::Doa)),
            Issue(Brightness(BRIGHTNESS_FULL)),
        ],
        EventKind::VoiceStarted => vec![
            Issue(Effect(LedEffect::Breath)),
            Issue(Brightness(BRIGHTNESS_FULL)),
            Issue(Color(COLOR_AZURE)),
            Issue(Speed(1)),
        ],
        EventKind::VoiceStopped => vec![
            Issue(Effect(LedEffect::Steady)),
            Issue(Brightness(BRIGHTNESS_FULL)),
            Issue(Color(COLOR_CYAN)),
            Wait(Duration::from_millis(500)),
            Issue(Effect(LedEffect::Off)),
        ],
        EventKind::StreamingStopped | EventKind::Played => vec![Issue(Effect(LedEffect::Off))],
        EventKind::SatelliteConnected => vec![
            Issue(Effect(LedEffect::Steady)),
            Issue(Brightness(BRIGHTNESS_FULL)),
            Issue(Color(COLOR_GREEN)),
            Issue(Speed(5)),
            Wait(Duration::from_secs(2)),
            Issue(Effect(LedEffect::Off)),
        ],
        EventKind::SatelliteDisconnected => vec![
            Issue(Effect(LedEffect::Steady)),
            Issue(Color(COLOR_RED)),
            Issue(Speed(8)),
            Wait(Duration::from_secs(10)),
            Issue(Brightness(BRIGHTNESS_IDLE)),
        ],
        EventKind::StreamingStarted | EventKind::Other(_) => Vec::new(),
    }
}

/// Power the LEDs up in the idle color, then let the device settle.
pub fn startup_steps() -> Vec<Step> {
    vec![
        Issue(Effect(LedEffect::Steady)),
        Issue(Brightness(BRIGHTNESS_FULL)),
        Issue(Gammify(true)),
        Issue(Color(COLOR_AZURE)),
        Wait(STARTUP_DELAY),
    ]
}

pub fn shutdown_steps() -> Vec<Step> {
    vec![Issue(Effect(LedEffect::Off))]
}

/// Execute steps in order.
///
/// A rejected command is logged and skipped; the rest of the sequence still
/// runs.
pub async fn run_steps(xvf: &Xvf, steps: &[Step]) {
    for step in steps {
        match *step {
            Issue(command) => {
                if let Err(e) = xvf.send(command).await {
                    warn!("Skipping LED command: {}", e);
                }
            }
            Wait(duration) => tokio::time::sleep(duration).await,
        }
    }
}
