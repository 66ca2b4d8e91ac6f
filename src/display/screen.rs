//! Terminal drawing surface used by the cursor visualizer

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::{debug, warn};

pub trait Screen {
    /// Width and height in character cells
    fn size(&self) -> io::Result<(u16, u16)>;

    fn clear(&mut self) -> io::Result<()>;

    fn draw_char(&mut self, row: u16, col: u16, ch: char) -> io::Result<()>;

    fn refresh(&mut self) -> io::Result<()>;
}

/// Full screen terminal with echo and the cursor disabled. Restored on drop.
pub struct TerminalScreen {
    stdout: Stdout,
}

impl TerminalScreen {
    pub fn init() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        debug!("Terminal screen initialized");
        Ok(Self { stdout })
    }
}

impl Screen for TerminalScreen {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::All))
    }

    fn draw_char(&mut self, row: u16, col: u16, ch: char) -> io::Result<()> {
        queue!(self.stdout, MoveTo(col, row), Print(ch))
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        if let Err(e) = execute!(self.stdout, Show, LeaveAlternateScreen) {
            warn!("Failed to leave alternate screen: {}", e);
        }
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Failed to disable raw mode: {}", e);
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::io;

    use super::Screen;

    /// Records every frame drawn since the last clear
    #[derive(Debug, Default)]
    pub struct RecordingScreen {
        pub width: u16,
        pub height: u16,
        pending: Vec<(u16, u16, char)>,
        pub frames: Vec<Vec<(u16, u16, char)>>,
        fail_refresh: bool,
    }

    impl RecordingScreen {
        pub fn new(width: u16, height: u16) -> Self {
            Self {
                width,
                height,
                ..Default::default()
            }
        }

        /// Every refresh fails, as when the terminal has gone away
        pub fn failing_refresh(mut self) -> Self {
            self.fail_refresh = true;
            self
        }

        pub fn last_frame(&self) -> Option<&[(u16, u16, char)]> {
            self.frames.last().map(Vec::as_slice)
        }
    }

    impl Screen for RecordingScreen {
        fn size(&self) -> io::Result<(u16, u16)> {
            Ok((self.width, self.height))
        }

        fn clear(&mut self) -> io::Result<()> {
            self.pending.clear();
            Ok(())
        }

        fn draw_char(&mut self, row: u16, col: u16, ch: char) -> io::Result<()> {
            self.pending.push((row, col, ch));
            Ok(())
        }

        fn refresh(&mut self) -> io::Result<()> {
            if self.fail_refresh {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"));
            }
            self.frames.push(self.pending.clone());
            Ok(())
        }
    }
}
