//! One-shot device description

use std::io::Write;
use std::path::Path;

use color_eyre::Result;

use crate::controller::device::DeviceInfo;

pub fn write_info<W: Write>(path: &Path, info: &DeviceInfo, out: &mut W) -> Result<()> {
    writeln!(out, "Device:  {}", path.display())?;
    writeln!(out, "Name:    {}", info.name)?;
    writeln!(out, "Driver:  {}", info.version_string())?;
    writeln!(out, "Axes:    {}", info.axis_count)?;
    writeln!(out, "Buttons: {}", info.button_count)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_device() {
        let info = DeviceInfo {
            name: "Xbox 360 Wireless Receiver".to_string(),
            version: 0x020100,
            axis_count: 8,
            button_count: 15,
        };
        let mut out = Vec::new();
        write_info(Path::new("/dev/input/js0"), &info, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Device:  /dev/input/js0\n\
             Name:    Xbox 360 Wireless Receiver\n\
             Driver:  2.1.0\n\
             Axes:    8\n\
             Buttons: 15\n"
        );
    }
}
