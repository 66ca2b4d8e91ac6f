//! Sixaxis accelerometer readout

use std::io::Write;

use color_eyre::Result;
use tracing::info;

use crate::controller::sixaxis::{Motion, SixAxis};

pub fn format_motion(motion: &Motion) -> String {
    format!("x: {:5} y: {:5} z: {:5}", motion.x, motion.y, motion.z)
}

/// Print readings until `count` reports were read, or forever without a count
pub fn run<W: Write>(sixaxis: &mut SixAxis, out: &mut W, count: Option<usize>) -> Result<()> {
    info!("Starting motion readout");
    let mut read = 0;
    while count.map_or(true, |count| read < count) {
        let motion = sixaxis.read_motion()?;
        writeln!(out, "{}", format_motion(&motion))?;
        out.flush()?;
        read += 1;
    }
    Ok(())
}
