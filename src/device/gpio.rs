//! Linux sysfs GPIO backend (`/sys/class/gpio`).
//!
//! Pin numbers are BCM numbers, offset by `gpio_base`: on recent Raspberry Pi
//! kernels the 40-pin header chip is registered at base 512, older kernels use
//! 0. The dot actuators are active-low (a LOW pin raises the dot). The buttons
//! are expected to be pulled up in hardware or device tree (sysfs cannot set
//! pulls) and read LOW while pressed.

use super::{Button, ButtonInput, DotOutput};
use crate::error::ReaderError;
use crate::pipeline::transcode::DOTS_PER_CELL;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Default sysfs root.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// BCM pin layout of the cell and the two buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinLayout {
    /// Pins for dots 1 through 6.
    pub dots: [u32; DOTS_PER_CELL],
    pub next_button: u32,
    pub back_button: u32,
    /// Offset added to every BCM number to get the sysfs GPIO number.
    pub gpio_base: u32,
}

impl Default for PinLayout {
    fn default() -> Self {
        PinLayout {
            dots: [14, 15, 18, 23, 24, 25],
            next_button: 20,
            back_button: 21,
            gpio_base: 0,
        }
    }
}

impl PinLayout {
    pub fn with_base(mut self, base: u32) -> Self {
        self.gpio_base = base;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Output driven HIGH from the start, so no dot pops up while exporting.
    OutHigh,
    In,
}

impl Direction {
    fn as_sysfs(self) -> &'static str {
        match self {
            Direction::OutHigh => "high",
            Direction::In => "in",
        }
    }
}

/// One exported sysfs pin; unexported on drop.
#[derive(Debug)]
struct SysfsPin {
    number: u32,
    root: PathBuf,
    value_path: PathBuf,
}

impl SysfsPin {
    fn export(root: &Path, number: u32, direction: Direction) -> Result<Self, ReaderError> {
        let pin_dir = root.join(format!("gpio{number}"));
        if !pin_dir.exists() {
            fs::write(root.join("export"), number.to_string())
                .map_err(|source| ReaderError::Device { pin: number, source })?;
            // udev needs a moment to fix permissions on the new node
            thread::sleep(Duration::from_millis(100));
        }
        fs::write(pin_dir.join("direction"), direction.as_sysfs())
            .map_err(|source| ReaderError::Device { pin: number, source })?;
        debug!("Exported GPIO {} as {:?}", number, direction);

        Ok(SysfsPin {
            number,
            root: root.to_path_buf(),
            value_path: pin_dir.join("value"),
        })
    }

    fn write(&self, high: bool) {
        if let Err(e) = fs::write(&self.value_path, if high { "1" } else { "0" }) {
            warn!("GPIO {}: write failed: {}", self.number, e);
        }
    }

    fn read(&self) -> Option<bool> {
        match fs::read_to_string(&self.value_path) {
            Ok(v) => Some(v.trim() == "1"),
            Err(e) => {
                warn!("GPIO {}: read failed: {}", self.number, e);
                None
            }
        }
    }
}

impl Drop for SysfsPin {
    fn drop(&mut self) {
        if let Err(e) = fs::write(self.root.join("unexport"), self.number.to_string()) {
            debug!("GPIO {}: unexport failed: {}", self.number, e);
        }
    }
}

/// The six dot actuators of one cell.
#[derive(Debug)]
pub struct SysfsCell {
    pins: Vec<SysfsPin>,
}

impl SysfsCell {
    pub fn open(layout: &PinLayout) -> Result<Self, ReaderError> {
        Self::open_at(Path::new(SYSFS_GPIO_ROOT), layout)
    }

    /// Open the cell under a custom sysfs root.
    pub fn open_at(root: &Path, layout: &PinLayout) -> Result<Self, ReaderError> {
        let pins = layout
            .dots
            .iter()
            .map(|bcm| SysfsPin::export(root, layout.gpio_base + bcm, Direction::OutHigh))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SysfsCell { pins })
    }
}

impl DotOutput for SysfsCell {
    fn set_dot(&mut self, position: usize, raised: bool) {
        match self.pins.get(position) {
            Some(pin) => pin.write(!raised),
            None => warn!("Dot position {} does not exist", position),
        }
    }
}

/// The NEXT and BACK buttons.
#[derive(Debug)]
pub struct SysfsButtons {
    next: SysfsPin,
    back: SysfsPin,
}

impl SysfsButtons {
    pub fn open(layout: &PinLayout) -> Result<Self, ReaderError> {
        Self::open_at(Path::new(SYSFS_GPIO_ROOT), layout)
    }

    pub fn open_at(root: &Path, layout: &PinLayout) -> Result<Self, ReaderError> {
        Ok(SysfsButtons {
            next: SysfsPin::export(root, layout.gpio_base + layout.next_button, Direction::In)?,
            back: SysfsPin::export(root, layout.gpio_base + layout.back_button, Direction::In)?,
        })
    }
}

impl ButtonInput for SysfsButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        let pin = match button {
            Button::Next => &self.next,
            Button::Back => &self.back,
        };
        // active-low; an unreadable pin counts as released
        matches!(pin.read(), Some(false))
    }
}
