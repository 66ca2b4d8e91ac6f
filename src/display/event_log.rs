//! Raw event log
//!
//! Prints the decoded label of every event, separating events that carry
//! different kernel timestamps with a blank line.

use std::io::Write;

use color_eyre::Result;
use tracing::info;

use crate::controller::event::{EventKind, RawEvent};
use crate::controller::event_collector::{Collecting, EventCollector};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum KindFilter {
    Axis,
    Button,
}

/// Restricts which events are printed. Unset fields match everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventFilter {
    pub kind: Option<KindFilter>,
    pub index: Option<u8>,
}

impl EventFilter {
    pub fn matches(&self, event: &RawEvent) -> bool {
        let kind_matches = match self.kind {
            None => true,
            Some(KindFilter::Axis) => event.kind == EventKind::Axis,
            Some(KindFilter::Button) => event.kind == EventKind::Button,
        };
        kind_matches && self.index.map_or(true, |index| index == event.index)
    }
}

/// Log events until the source ends
pub fn run<W: Write>(
    collector: &mut EventCollector<Collecting>,
    out: &mut W,
    filter: EventFilter,
) -> Result<()> {
    info!("Starting event log with filter {:?}", filter);
    let mut last_timestamp = 0;

    while let Some(event) = collector.collect_next_event(true)? {
        if event.timestamp != last_timestamp {
            writeln!(out)?;
        }
        if filter.matches(&event) {
            writeln!(out, "{}", event)?;
        }
        last_timestamp = event.timestamp;
        out.flush()?;
    }
    Ok(())
}
