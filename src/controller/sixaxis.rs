//! Sixaxis motion sensor readout from the controller's hidraw node

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::controller::device::DeviceError;

const REPORT_BUFFER: usize = 128;

/// Accelerometer reading. Each axis is -1 when the report layout is unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Motion {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Motion {
    const UNKNOWN: Motion = Motion { x: -1, y: -1, z: -1 };

    /// Parse a raw input report. USB reports are 49 bytes (leading report
    /// id), Bluetooth reports 48.
    pub fn from_report(report: &[u8]) -> Self {
        let offset = match report.len() {
            48 => 40,
            49 => 41,
            other => {
                debug!("Unrecognised sixaxis report length {}", other);
                return Self::UNKNOWN;
            }
        };

        let word = |at: usize| i32::from(u16::from_be_bytes([report[at], report[at + 1]]));
        Motion {
            x: word(offset),
            y: word(offset + 2),
            z: word(offset + 4),
        }
    }
}

pub struct SixAxis {
    file: File,
    path: PathBuf,
}

impl SixAxis {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|source| DeviceError::DeviceOpenError {
                path: path.clone(),
                source,
            })?;
        debug!("Opened sixaxis report node {}", path.display());
        Ok(Self { file, path })
    }

    /// Block until the next report arrives and parse it
    pub fn read_motion(&mut self) -> Result<Motion, DeviceError> {
        let mut buffer = [0u8; REPORT_BUFFER];
        let length = self
            .file
            .read(&mut buffer)
            .map_err(DeviceError::DeviceReadError)?;

        if length == 0 {
            warn!("Sixaxis node {} returned no data", self.path.display());
            return Err(DeviceError::DeviceReadError(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "sixaxis device closed",
            )));
        }

        Ok(Motion::from_report(&buffer[..length]))
    }
}
