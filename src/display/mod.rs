//! Display and consumption modes built on the controller subsystem

pub mod cursor;
pub mod device_info;
pub mod event_log;
pub mod motion;
pub mod poller;
pub mod screen;
pub mod triggers;
