//! Periodic readout of the latest pressed button and left thumbstick

use std::io::Write;
use std::time::Duration;

use color_eyre::Result;
use tracing::{debug, info};

use crate::controller::event_collector::{Collecting, EventCollector};

fn slot(value: Option<i16>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Poll every `interval` until a poll drains a press of the exit button
pub fn run<W: Write>(
    collector: &mut EventCollector<Collecting>,
    out: &mut W,
    exit_button: u8,
    interval: Duration,
) -> Result<()> {
    info!("Starting poller with {:?} interval", interval);
    let mut last_axes = (None, None);

    loop {
        let exit_pressed = collector.drain_watching(exit_button)?;
        let button = collector.take_pressed_button();
        let axes = collector.state().current_axes();
        debug!("Polled button {:?}, axes {:?}", button, axes);

        if axes != last_axes {
            writeln!(out, "Axes: {}, {}", slot(axes.0), slot(axes.1))?;
            last_axes = axes;
        }
        if let Some(index) = button {
            writeln!(out, "Button {}", index)?;
        }
        out.flush()?;

        if exit_pressed {
            info!("Exit button pressed");
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}
