use chrono::Local;
use statum::{machine, state};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info};

use crate::controller::device::{DeviceError, EventSource};
use crate::controller::event::RawEvent;
use crate::controller::state::ControllerState;

// Collector settings
#[derive(Clone, Debug)]
pub struct CollectorSettings {
    pub exit_button: u8,
    pub stats_interval_secs: u32,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            exit_button: 7,
            stats_interval_secs: 10,
        }
    }
}

// Collector errors
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Device error: {0}")]
    DeviceError(#[from] DeviceError),

    #[error("Collector task failed: {0}")]
    TaskError(String),
}

#[state]
#[derive(Debug, Clone)]
pub enum CollectionState {
    Initializing,
    Collecting,
}

#[machine]
#[derive(Debug)]
pub struct EventCollector<S: CollectionState> {
    // Device or scripted event source
    source: Box<dyn EventSource>,

    // Latest value per axis and button slot
    controller_state: ControllerState,
}

impl<S: CollectionState> EventCollector<S> {
    pub fn state(&self) -> &ControllerState {
        &self.controller_state
    }
}

impl EventCollector<Initializing> {
    pub fn create(source: Box<dyn EventSource>) -> Self {
        debug!("Creating Event Collector");
        Self::new(source, ControllerState::default())
    }

    // Size the state from the device and start collecting
    pub fn initialize(mut self) -> EventCollector<Collecting> {
        let axis_count = self.source.axis_count();
        let button_count = self.source.button_count();
        info!(
            "Initializing Event Collector for {} axes and {} buttons",
            axis_count, button_count
        );

        self.controller_state = ControllerState::new(axis_count, button_count);
        self.transition()
    }
}

impl EventCollector<Collecting> {
    // Retrieve one event and fold it into the state
    pub fn collect_next_event(&mut self, blocking: bool) -> Result<Option<RawEvent>, DeviceError> {
        let event = self.source.next_event(blocking)?;
        if let Some(event) = &event {
            debug!("Collected event: {} (t={}ms)", event, event.timestamp);
            self.controller_state.apply_event(event);
        }
        Ok(event)
    }

    // Apply every buffered event without blocking
    pub fn drain_pending(&mut self) -> Result<usize, DeviceError> {
        let mut drained = 0;
        while self.collect_next_event(false)?.is_some() {
            drained += 1;
        }
        if drained > 0 {
            debug!("Drained {} pending events", drained);
        }
        Ok(drained)
    }

    pub fn poll_axes(&mut self) -> Result<(Option<i16>, Option<i16>), DeviceError> {
        self.drain_pending()?;
        Ok(self.controller_state.current_axes())
    }

    pub fn poll_button(&mut self) -> Result<Option<u8>, DeviceError> {
        self.drain_pending()?;
        Ok(self.take_pressed_button())
    }

    /// Drain like [`Self::drain_pending`], returning whether `button` was
    /// pressed by any of the drained events. A later press of another button
    /// replaces the latest press but not this answer.
    pub fn drain_watching(&mut self, button: u8) -> Result<bool, DeviceError> {
        let mut pressed = false;
        while let Some(event) = self.collect_next_event(false)? {
            pressed |= event.is_press() && event.index == button;
        }
        Ok(pressed)
    }

    // Latest press since the previous call, without reading the source
    pub fn take_pressed_button(&mut self) -> Option<u8> {
        self.controller_state.latest_pressed_button()
    }
}

/// Runs blocking collection on its own thread and publishes the latest state.
///
/// The thread is detached: dropping the handle never waits for it, so a
/// collector parked in a blocking read cannot hold up shutdown.
pub struct CollectorHandle {
    state_receiver: watch::Receiver<ControllerState>,
    result_receiver: oneshot::Receiver<Result<(), CollectorError>>,
}

impl CollectorHandle {
    pub fn spawn(collector: EventCollector<Collecting>, settings: CollectorSettings) -> Self {
        info!("Spawning Event Collector with settings: {:?}", settings);

        let (state_sender, state_receiver) = watch::channel(collector.state().clone());
        let (result_sender, result_receiver) = oneshot::channel();
        std::thread::spawn(move || {
            let result = run_collection_loop(collector, state_sender, &settings);
            if let Err(e) = &result {
                error!("Collector task terminated with error: {}", e);
            }
            // Nobody left to tell if the handle was dropped
            let _ = result_sender.send(result);
        });

        Self {
            state_receiver,
            result_receiver,
        }
    }

    // Get a receiver for the controller state
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state_receiver.clone()
    }

    pub async fn join(self) -> Result<(), CollectorError> {
        self.result_receiver
            .await
            .map_err(|e| CollectorError::TaskError(e.to_string()))?
    }
}

fn run_collection_loop(
    mut collector: EventCollector<Collecting>,
    state_sender: watch::Sender<ControllerState>,
    settings: &CollectorSettings,
) -> Result<(), CollectorError> {
    info!("Starting Event Collector loop");

    let mut event_count = 0u64;
    let mut last_log_time = Local::now();
    let log_interval = chrono::Duration::seconds(i64::from(settings.stats_interval_secs));

    loop {
        let Some(event) = collector.collect_next_event(true)? else {
            info!("Event source finished, stopping collector");
            return Ok(());
        };
        event_count += 1;

        state_sender.send_replace(collector.state().clone());

        if event.is_press() && event.index == settings.exit_button {
            info!("Exit button {} pressed, stopping collector", event.index);
            return Ok(());
        }

        if state_sender.is_closed() {
            info!("No state subscribers left, stopping collector");
            return Ok(());
        }

        let now = Local::now();
        if now - last_log_time > log_interval {
            info!(
                "Event Collector stats: {} events in last {} seconds",
                event_count,
                log_interval.num_seconds()
            );
            event_count = 0;
            last_log_time = now;
        }
    }
}
