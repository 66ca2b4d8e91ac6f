//! Latest known value per axis and button slot

use tracing::trace;

use crate::controller::event::{EventKind, RawEvent};

/// Current best-known controller state
///
/// Sized once from the device's axis and button counts. Every slot starts
/// unset and is overwritten by the most recent event for its index. Events
/// with an index outside the device's counts are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerState {
    axis_values: Vec<Option<i16>>,
    button_values: Vec<Option<i16>>,
    // Most recent press since the last `latest_pressed_button` call
    pending_press: Option<u8>,
}

impl ControllerState {
    pub fn new(axis_count: usize, button_count: usize) -> Self {
        Self {
            axis_values: vec![None; axis_count],
            button_values: vec![None; button_count],
            pending_press: None,
        }
    }

    pub fn apply_event(&mut self, event: &RawEvent) {
        let index = event.index as usize;
        match event.kind {
            EventKind::Axis if index < self.axis_values.len() => {
                self.axis_values[index] = Some(event.value);
            }
            EventKind::Button if index < self.button_values.len() => {
                self.button_values[index] = Some(event.value);
                if event.value != 0 {
                    self.pending_press = Some(event.index);
                }
            }
            _ => trace!("Dropping out-of-range or unknown event: {:?}", event),
        }
    }

    /// Left thumbstick X and Y, unset until the first event for each arrives
    pub fn current_axes(&self) -> (Option<i16>, Option<i16>) {
        (self.axis(0), self.axis(1))
    }

    /// Most recently pressed button since the previous call
    pub fn latest_pressed_button(&mut self) -> Option<u8> {
        self.pending_press.take()
    }

    pub fn axis(&self, index: usize) -> Option<i16> {
        self.axis_values.get(index).copied().flatten()
    }

    pub fn button(&self, index: usize) -> Option<i16> {
        self.button_values.get(index).copied().flatten()
    }

    pub fn axes(&self) -> &[Option<i16>] {
        &self.axis_values
    }

    pub fn buttons(&self) -> &[Option<i16>] {
        &self.button_values
    }

    pub fn axis_count(&self) -> usize {
        self.axis_values.len()
    }

    pub fn button_count(&self) -> usize {
        self.button_values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let mut state = ControllerState::new(8, 11);
        assert_eq!(state.axis_count(), 8);
        assert_eq!(state.button_count(), 11);
        assert!(state.axes().iter().all(Option::is_none));
        assert!(state.buttons().iter().all(Option::is_none));
        assert_eq!(state.current_axes(), (None, None));
        assert_eq!(state.latest_pressed_button(), None);
    }

    #[test]
    fn last_write_wins_per_axis() {
        let mut state = ControllerState::new(8, 11);
        let events = [
            RawEvent::axis(0, 100, 1),
            RawEvent::axis(3, -20, 2),
            RawEvent::axis(0, -300, 3),
            RawEvent::axis(3, 7, 4),
            RawEvent::axis(0, 12, 5),
        ];
        for event in &events {
            state.apply_event(event);
        }
        assert_eq!(state.axis(0), Some(12));
        assert_eq!(state.axis(3), Some(7));
        assert_eq!(state.axis(1), None);
    }

    #[test]
    fn out_of_range_events_change_nothing() {
        let mut state = ControllerState::new(2, 2);
        state.apply_event(&RawEvent::axis(1, 5, 1));
        let before = state.clone();

        state.apply_event(&RawEvent::axis(2, 99, 2));
        state.apply_event(&RawEvent::button(2, 1, 3));
        state.apply_event(&RawEvent {
            kind: EventKind::Unknown(4),
            index: 0,
            value: 1,
            timestamp: 4,
            init: false,
        });

        assert_eq!(state, before);
        assert_eq!(state.latest_pressed_button(), None);
    }

    #[test]
    fn latest_press_is_most_recent_and_cleared() {
        let mut state = ControllerState::new(8, 11);
        state.apply_event(&RawEvent::button(9, 1, 1));
        state.apply_event(&RawEvent::button(2, 1, 2));
        state.apply_event(&RawEvent::button(2, 0, 3));

        assert_eq!(state.latest_pressed_button(), Some(2));
        assert_eq!(state.latest_pressed_button(), None);
        assert_eq!(state.button(2), Some(0));
        assert_eq!(state.button(9), Some(1));
    }

    #[test]
    fn end_to_end_snapshot() {
        let mut state = ControllerState::new(8, 11);
        for event in [
            RawEvent::axis(0, -32767, 10),
            RawEvent::axis(1, 0, 11),
            RawEvent::button(7, 1, 12),
        ] {
            state.apply_event(&event);
        }
        assert_eq!(state.current_axes(), (Some(-32767), Some(0)));
        assert_eq!(state.latest_pressed_button(), Some(7));
    }
}
