//! Controller subsystem for joystick input handling
//!
//! Implements the pipeline from device to snapshot:
//!
//! 1. [`device`] - Kernel joystick device access behind the [`device::EventSource`] trait
//! 2. [`event`] - Raw event records and their decoded labels
//! 3. [`state`] - Latest value per axis and button slot
//! 4. [`event_collector`] - Typestate collector tying a source to its state
//!
//! # Architecture
//!
//! ```text
//! /dev/input/jsN ──► EventSource ──► EventCollector ──► ControllerState
//!                    (RawEvent)      (decode + apply)   (snapshot / watch channel)
//! ```
//!
//! [`sixaxis`] reads the motion sensor report of Sixaxis pads separately.

pub mod device;
pub mod event;
pub mod event_collector;
pub mod sixaxis;
pub mod state;
