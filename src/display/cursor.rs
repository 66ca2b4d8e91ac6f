//! Left thumbstick cursor visualizer
//!
//! Draws a `#` at the screen position of the left thumbstick. Three loop
//! shapes are offered: redraw on every blocking read, redraw on axis events
//! from a non-blocking poll loop, or read on a blocking thread and redraw on
//! a fixed interval.

use std::time::Duration;

use color_eyre::{eyre::WrapErr, Result};
use tracing::{debug, info, warn};

use crate::controller::event::{EventKind, RawEvent, AXIS_MIN, AXIS_SPAN};
use crate::controller::event_collector::{
    Collecting, CollectorHandle, CollectorSettings, EventCollector,
};
use crate::controller::state::ControllerState;
use crate::display::screen::Screen;

const CURSOR: char = '#';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CursorMode {
    /// Block on every read and redraw after each event
    #[default]
    Blocking,
    /// Poll without blocking and redraw on axis events
    Nonblocking,
    /// Read on a separate thread and redraw on a timer
    Threaded,
}

/// Map raw stick values onto a screen of `width` x `height` cells, returning
/// `(row, col)`
pub fn cursor_position(x: i16, y: i16, width: u16, height: u16) -> (u16, u16) {
    (scale(y, height), scale(x, width))
}

// (cells - 1) * (value + 32767) / 65534 with floor division, kept on screen
fn scale(value: i16, cells: u16) -> u16 {
    let max = i64::from(cells.saturating_sub(1));
    let scaled = (max * (i64::from(value) - i64::from(AXIS_MIN))).div_euclid(i64::from(AXIS_SPAN));
    scaled.clamp(0, max) as u16
}

fn is_exit(event: &RawEvent, exit_button: u8) -> bool {
    event.is_press() && event.index == exit_button
}

fn draw_state<S: Screen>(screen: &mut S, state: &ControllerState) -> Result<()> {
    if let (Some(x), Some(y)) = state.current_axes() {
        let (width, height) = screen.size().wrap_err("Failed to query screen size")?;
        let (row, col) = cursor_position(x, y, width, height);
        screen.clear()?;
        screen.draw_char(row, col, CURSOR)?;
        screen.refresh().wrap_err("Failed to refresh screen")?;
    }
    Ok(())
}

pub fn run_blocking<S: Screen>(
    collector: &mut EventCollector<Collecting>,
    screen: &mut S,
    exit_button: u8,
) -> Result<()> {
    info!("Starting blocking cursor visualizer");
    while let Some(event) = collector.collect_next_event(true)? {
        draw_state(screen, collector.state())?;
        if is_exit(&event, exit_button) {
            info!("Exit button pressed");
            break;
        }
    }
    Ok(())
}

pub fn run_nonblocking<S: Screen>(
    collector: &mut EventCollector<Collecting>,
    screen: &mut S,
    exit_button: u8,
    idle: Duration,
) -> Result<()> {
    info!("Starting non-blocking cursor visualizer");
    loop {
        match collector.collect_next_event(false)? {
            Some(event) => {
                if event.kind == EventKind::Axis {
                    draw_state(screen, collector.state())?;
                }
                if is_exit(&event, exit_button) {
                    info!("Exit button pressed");
                    return Ok(());
                }
            }
            None => std::thread::sleep(idle),
        }
    }
}

pub async fn run_threaded<S: Screen>(
    collector: EventCollector<Collecting>,
    screen: &mut S,
    settings: CollectorSettings,
    render_interval: Duration,
) -> Result<()> {
    info!(
        "Starting threaded cursor visualizer, redrawing every {:?}",
        render_interval
    );
    let handle = CollectorHandle::spawn(collector, settings);
    let mut receiver = handle.subscribe();
    let mut ticker = tokio::time::interval(render_interval);

    let rendered = loop {
        ticker.tick().await;
        // Sender drops once the collector stops; draw the final state first
        let finished = receiver.has_changed().is_err();
        let state = receiver.borrow_and_update().clone();
        if let Err(e) = draw_state(screen, &state) {
            break Err(e);
        }
        if finished {
            debug!("Collector finished, leaving render loop");
            break Ok(());
        }
    };

    // A collector still blocked on the device is left behind
    if let Err(e) = rendered {
        warn!("Rendering failed, abandoning collector: {}", e);
        return Err(e);
    }
    handle.join().await?;
    Ok(())
}
