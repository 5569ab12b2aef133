//! Device templates a viewframe can be created from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewframeError;
use crate::viewport::SimulatedViewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceModel {
    Iphone14Pro,
    IphoneSe,
    Ipad,
    IpadPro,
    DesktopHd,
    Desktop4k,
    MacbookAir,
    /// Any size the user types in
    Custom,
}

impl DeviceModel {
    pub const ALL: [DeviceModel; 8] = [
        DeviceModel::Iphone14Pro,
        DeviceModel::IphoneSe,
        DeviceModel::Ipad,
        DeviceModel::IpadPro,
        DeviceModel::DesktopHd,
        DeviceModel::Desktop4k,
        DeviceModel::MacbookAir,
        DeviceModel::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DeviceModel::Iphone14Pro => "iPhone 14 Pro",
            DeviceModel::IphoneSe => "iPhone SE",
            DeviceModel::Ipad => "iPad",
            DeviceModel::IpadPro => "iPad Pro",
            DeviceModel::DesktopHd => "Desktop HD",
            DeviceModel::Desktop4k => "Desktop 4K",
            DeviceModel::MacbookAir => "MacBook Air",
            DeviceModel::Custom => "Custom",
        }
    }

    /// The template size, `None` for [`DeviceModel::Custom`].
    pub fn viewport(&self) -> Option<SimulatedViewport> {
        let (width, height) = match self {
            DeviceModel::Iphone14Pro => (393, 852),
            DeviceModel::IphoneSe => (375, 667),
            DeviceModel::Ipad => (768, 1024),
            DeviceModel::IpadPro => (1024, 1366),
            DeviceModel::DesktopHd => (1920, 1080),
            DeviceModel::Desktop4k => (3840, 2160),
            DeviceModel::MacbookAir => (1440, 900),
            DeviceModel::Custom => return None,
        };
        SimulatedViewport::new(width, height)
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        if let Some(vp) = self.viewport() {
            write!(f, " ({}×{})", vp.width(), vp.height())?;
        }
        Ok(())
    }
}

impl FromStr for DeviceModel {
    type Err = ViewframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceModel::ALL
            .into_iter()
            .find(|model| model.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ViewframeError::Config(format!("unknown device model `{}`", s)))
    }
}
