use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot redefine non-configurable property `{0}`")]
pub struct PropertyError(pub SizeProperty);

/// The size-reporting properties a page can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeProperty {
    InnerWidth,
    InnerHeight,
    ScreenWidth,
    ScreenHeight,
}

impl SizeProperty {
    pub const ALL: [SizeProperty; 4] = [
        SizeProperty::InnerWidth,
        SizeProperty::InnerHeight,
        SizeProperty::ScreenWidth,
        SizeProperty::ScreenHeight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SizeProperty::InnerWidth => "innerWidth",
            SizeProperty::InnerHeight => "innerHeight",
            SizeProperty::ScreenWidth => "screen.width",
            SizeProperty::ScreenHeight => "screen.height",
        }
    }
}

impl std::fmt::Display for SizeProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A property slot with the attributes that decide whether it may be
/// assigned or redefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property {
    value: u32,
    writable: bool,
    configurable: bool,
    /// Computed by the browser and follows the real layout
    native: bool,
}

impl Property {
    /// A browser computed, read-only but configurable value.
    pub fn native(value: u32) -> Self {
        Self {
            value,
            writable: false,
            configurable: true,
            native: true,
        }
    }

    /// A plain data property that is both writable and configurable.
    pub fn data(value: u32) -> Self {
        Self {
            value,
            writable: true,
            configurable: true,
            native: false,
        }
    }

    pub fn frozen(value: u32) -> Self {
        Self {
            value,
            writable: false,
            configurable: false,
            native: false,
        }
    }

    pub fn get(&self) -> u32 {
        self.value
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_configurable(&self) -> bool {
        self.configurable
    }

    pub fn is_native(&self) -> bool {
        self.native
    }

    /// Assignment. Ignored (returns `false`) for read-only slots.
    pub(crate) fn set(&mut self, value: u32) -> bool {
        if self.writable {
            self.value = value;
        }
        self.writable
    }

    pub(crate) fn follow_layout(&mut self, value: u32) {
        if self.native {
            self.value = value;
        }
    }
}
