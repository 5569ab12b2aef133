//! Viewframe configurations and the ordered set of them being previewed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::DeviceModel;
use crate::error::{Result, ViewframeError};
use crate::viewport::SimulatedViewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// A named target page previewed at one simulated device size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewframe {
    pub id: FrameId,
    pub name: String,
    pub model: DeviceModel,
    pub viewport: SimulatedViewport,
    pub link: String,
}

/// The inputs for a new viewframe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFrame {
    pub name: String,
    pub model: DeviceModel,
    /// Only used with [`DeviceModel::Custom`]
    pub custom_width: u32,
    /// Only used with [`DeviceModel::Custom`]
    pub custom_height: u32,
    pub link: String,
}

impl Default for NewFrame {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: DeviceModel::Iphone14Pro,
            custom_width: 1080,
            custom_height: 720,
            link: String::new(),
        }
    }
}

impl NewFrame {
    pub fn new(name: impl Into<String>, model: DeviceModel, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model,
            link: link.into(),
            ..Default::default()
        }
    }

    pub fn custom(name: impl Into<String>, width: u32, height: u32, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: DeviceModel::Custom,
            custom_width: width,
            custom_height: height,
            link: link.into(),
        }
    }

    /// The size this request resolves to.
    pub fn viewport(&self) -> Result<SimulatedViewport> {
        match self.model.viewport() {
            Some(viewport) => Ok(viewport),
            None => SimulatedViewport::try_from((self.custom_width, self.custom_height)),
        }
    }
}

/// Groups of frames that are commonly added together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    MobileTabletDesktop,
    AppleDevices,
}

impl Preset {
    pub fn frames(&self) -> &'static [(&'static str, DeviceModel)] {
        match self {
            Preset::MobileTabletDesktop => &[
                ("Mobile", DeviceModel::Iphone14Pro),
                ("Tablet", DeviceModel::Ipad),
                ("Desktop", DeviceModel::DesktopHd),
            ],
            Preset::AppleDevices => &[
                ("iPhone SE", DeviceModel::IphoneSe),
                ("iPhone 14 Pro", DeviceModel::Iphone14Pro),
                ("iPad", DeviceModel::Ipad),
                ("iPad Pro", DeviceModel::IpadPro),
            ],
        }
    }
}

/// The ordered list of viewframes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Viewframes {
    frames: Vec<Viewframe>,
    next_id: u64,
}

impl Viewframes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `frame` and appends it.
    pub fn add(&mut self, frame: NewFrame) -> Result<FrameId> {
        let name = frame.name.trim();
        let link = frame.link.trim();
        if name.is_empty() || link.is_empty() {
            return Err(ViewframeError::IncompleteFrame);
        }
        let viewport = frame.viewport()?;
        let id = self.next_id();
        tracing::debug!(%id, name, %viewport, "adding viewframe");
        self.frames.push(Viewframe {
            id,
            name: name.to_string(),
            model: frame.model,
            viewport,
            link: link.to_string(),
        });
        Ok(id)
    }

    /// Appends every frame of `preset`, all pointing at `link`.
    pub fn add_preset(&mut self, preset: Preset, link: &str) -> Result<Vec<FrameId>> {
        // validate once up front so a preset is added entirely or not at all
        if link.trim().is_empty() {
            return Err(ViewframeError::IncompleteFrame);
        }
        preset
            .frames()
            .iter()
            .map(|(name, model)| self.add(NewFrame::new(*name, *model, link)))
            .collect()
    }

    pub fn remove(&mut self, id: FrameId) -> Option<Viewframe> {
        let idx = self.frames.iter().position(|frame| frame.id == id)?;
        Some(self.frames.remove(idx))
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn get(&self, id: FrameId) -> Option<&Viewframe> {
        self.frames.iter().find(|frame| frame.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Viewframe> + '_ {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn next_id(&mut self) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<'a> IntoIterator for &'a Viewframes {
    type Item = &'a Viewframe;
    type IntoIter = std::slice::Iter<'a, Viewframe>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
