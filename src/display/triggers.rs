//! Trigger percentage readout

use std::io::Write;

use color_eyre::Result;
use tracing::info;

use crate::controller::event::{AxisRole, EventKind, RawEvent, AXIS_MIN, AXIS_SPAN};
use crate::controller::event_collector::{Collecting, EventCollector};

pub const LEFT_TRIGGER_AXIS: u8 = 2;
pub const RIGHT_TRIGGER_AXIS: u8 = 5;

/// `((raw + 32767) * 100) / 65534` with floor division
pub fn trigger_percent(raw: i16) -> i32 {
    ((i32::from(raw) - AXIS_MIN) * 100).div_euclid(AXIS_SPAN)
}

/// Remembers the last printed percentage per trigger
#[derive(Debug, Default)]
pub struct TriggerTracker {
    last_left: Option<i32>,
    last_right: Option<i32>,
}

impl TriggerTracker {
    /// Line to print for this event, if a trigger's percentage changed
    pub fn update(&mut self, event: &RawEvent) -> Option<String> {
        if event.kind != EventKind::Axis {
            return None;
        }

        let (last, role) = match event.index {
            LEFT_TRIGGER_AXIS => (&mut self.last_left, AxisRole::LeftTrigger),
            RIGHT_TRIGGER_AXIS => (&mut self.last_right, AxisRole::RightTrigger),
            _ => return None,
        };

        let percent = trigger_percent(event.value);
        if *last == Some(percent) {
            return None;
        }
        *last = Some(percent);
        Some(format!("{}: {}%", role.label(), percent))
    }
}

pub fn run<W: Write>(
    collector: &mut EventCollector<Collecting>,
    out: &mut W,
    exit_button: u8,
) -> Result<()> {
    info!("Starting trigger readout");
    let mut tracker = TriggerTracker::default();

    while let Some(event) = collector.collect_next_event(true)? {
        if let Some(line) = tracker.update(&event) {
            writeln!(out, "{}", line)?;
        }
        if event.is_press() && event.index == exit_button {
            info!("Exit button pressed");
            break;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::device::testing::ScriptedSource;

    #[test]
    fn percent_bounds() {
        assert_eq!(trigger_percent(-32767), 0);
        assert_eq!(trigger_percent(32767), 100);
        assert_eq!(trigger_percent(0), 50);
        assert_eq!(trigger_percent(-32768), -1);
    }

    #[test]
    fn prints_only_changes_per_trigger() {
        let mut tracker = TriggerTracker::default();
        assert_eq!(
            tracker.update(&RawEvent::axis(2, -32767, 1)).as_deref(),
            Some("Left trigger: 0%")
        );
        assert_eq!(tracker.update(&RawEvent::axis(2, -32760, 2)), None);
        assert_eq!(
            tracker.update(&RawEvent::axis(5, -32767, 3)).as_deref(),
            Some("Right trigger: 0%")
        );
        assert_eq!(
            tracker.update(&RawEvent::axis(2, 32767, 4)).as_deref(),
            Some("Left trigger: 100%")
        );
        assert_eq!(tracker.update(&RawEvent::axis(0, 32767, 5)), None);
        assert_eq!(tracker.update(&RawEvent::button(2, 1, 6)), None);
    }

    #[test]
    fn run_writes_lines_until_exit() {
        let source = ScriptedSource::new(8, 11).with_events([
            RawEvent::axis(5, 0, 1),
            RawEvent::axis(5, 1, 2),
            RawEvent::axis(2, 32767, 3),
            RawEvent::button(7, 1, 4),
            RawEvent::axis(2, -32767, 5),
        ]);
        let mut collector = EventCollector::create(Box::new(source)).initialize();
        let mut out = Vec::new();

        run(&mut collector, &mut out, 7).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Right trigger: 50%\nLeft trigger: 100%\n"
        );
    }
}
