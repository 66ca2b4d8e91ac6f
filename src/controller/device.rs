//! Linux joystick device access
//!
//! Talks to the kernel joystick interface (`/dev/input/jsN`): device details
//! are queried once with the `JSIOCG*` ioctls when the device is opened,
//! events are read as fixed size `js_event` records either blocking or
//! non-blocking.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use tracing::{debug, error, info};

use crate::controller::event::{RawEvent, EVENT_SIZE};

const NAME_LENGTH: usize = 128;

nix::ioctl_read!(jsiocgversion, b'j', 0x01, u32);
nix::ioctl_read!(jsiocgaxes, b'j', 0x11, u8);
nix::ioctl_read!(jsiocgbuttons, b'j', 0x12, u8);
nix::ioctl_read_buf!(jsiocgname, b'j', 0x13, u8);

/// Errors surfaced by a device event source. Both are fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device could not be opened or queried
    #[error("Failed to open joystick device {}: {source}", .path.display())]
    DeviceOpenError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the next event failed or the device went away
    #[error("Failed to read joystick event: {0}")]
    DeviceReadError(#[source] io::Error),
}

/// Anything that yields raw controller events
pub trait EventSource: Send + fmt::Debug {
    /// Retrieve the next event.
    ///
    /// In non-blocking mode `Ok(None)` means no event is pending. A blocking
    /// call only returns `Ok(None)` when the source has no further events.
    fn next_event(&mut self, blocking: bool) -> Result<Option<RawEvent>, DeviceError>;

    fn axis_count(&self) -> usize;

    fn button_count(&self) -> usize;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn next_event(&mut self, blocking: bool) -> Result<Option<RawEvent>, DeviceError> {
        (**self).next_event(blocking)
    }

    fn axis_count(&self) -> usize {
        (**self).axis_count()
    }

    fn button_count(&self) -> usize {
        (**self).button_count()
    }
}

/// Static details reported by the driver
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub version: u32,
    pub axis_count: usize,
    pub button_count: usize,
}

impl DeviceInfo {
    pub fn version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            self.version >> 16,
            (self.version >> 8) & 0xff,
            self.version & 0xff
        )
    }
}

/// An open joystick device. The file is closed on drop.
#[derive(Debug)]
pub struct JoystickDevice {
    file: File,
    path: PathBuf,
    info: DeviceInfo,
    nonblocking: bool,
}

impl JoystickDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening joystick device {}", path.display());

        let open_error = |source: io::Error| DeviceError::DeviceOpenError {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(open_error)?;
        let info = query_info(&file).map_err(open_error)?;

        info!(
            "Opened {} ({}, driver {}): {} axes, {} buttons",
            path.display(),
            info.name,
            info.version_string(),
            info.axis_count,
            info.button_count
        );

        Ok(Self {
            file,
            path,
            info,
            nonblocking: false,
        })
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        if self.nonblocking == nonblocking {
            return Ok(());
        }

        let fd = self.file.as_raw_fd();
        let mut flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
        flags.set(OFlag::O_NONBLOCK, nonblocking);
        fcntl(fd, FcntlArg::F_SETFL(flags))?;

        debug!("Switched {} to nonblocking={}", self.path.display(), nonblocking);
        self.nonblocking = nonblocking;
        Ok(())
    }
}

impl EventSource for JoystickDevice {
    fn next_event(&mut self, blocking: bool) -> Result<Option<RawEvent>, DeviceError> {
        self.set_nonblocking(!blocking)
            .map_err(DeviceError::DeviceReadError)?;

        let mut buffer = [0u8; EVENT_SIZE];
        loop {
            match self.file.read(&mut buffer) {
                Ok(EVENT_SIZE) => return Ok(Some(RawEvent::from_bytes(&buffer))),
                Ok(0) => {
                    error!("Joystick device {} reached end of file", self.path.display());
                    return Err(DeviceError::DeviceReadError(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "joystick device closed",
                    )));
                }
                Ok(length) => {
                    return Err(DeviceError::DeviceReadError(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("short joystick event of {} bytes", length),
                    )));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if !blocking && e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) => {
                    error!("Failed to read from {}: {}", self.path.display(), e);
                    return Err(DeviceError::DeviceReadError(e));
                }
            }
        }
    }

    fn axis_count(&self) -> usize {
        self.info.axis_count
    }

    fn button_count(&self) -> usize {
        self.info.button_count
    }
}

fn query_info(file: &File) -> io::Result<DeviceInfo> {
    let fd = file.as_raw_fd();

    let mut version: u32 = 0;
    let mut axes: u8 = 0;
    let mut buttons: u8 = 0;
    let mut name = [0u8; NAME_LENGTH];

    // SAFETY: each pointer refers to a live local of the size the request encodes
    unsafe {
        jsiocgversion(fd, &mut version)?;
        jsiocgaxes(fd, &mut axes)?;
        jsiocgbuttons(fd, &mut buttons)?;
        jsiocgname(fd, &mut name)?;
    }

    let end = name.iter().position(|&b| b == 0).unwrap_or(NAME_LENGTH);
    Ok(DeviceInfo {
        name: String::from_utf8_lossy(&name[..end]).into_owned(),
        version,
        axis_count: axes as usize,
        button_count: buttons as usize,
    })
}
