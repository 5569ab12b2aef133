use std::io;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

pub type Result<T, E = ViewframeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ViewframeError {
    #[error("{0}")]
    Cdp(#[from] CdpError),
    #[error("{0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
    /// A caller supplied size or `WxH` value that is not a positive viewport
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
    /// A new frame was requested without a name or without a link
    #[error("a viewframe needs a name and a link")]
    IncompleteFrame,
    #[error("{0}")]
    Config(String),
    #[error("page did not finish loading within {0:?}")]
    Timeout(Duration),
    #[error("page failed to load: {0}")]
    LoadFailed(String),
    /// The frame is still waiting for its load notification
    #[error("page is still loading")]
    NotLoaded,
}
