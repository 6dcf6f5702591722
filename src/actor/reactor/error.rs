use thiserror::Error;

use crate::sys::app::WindowId;

#[derive(Debug, Error, PartialEq)]
pub enum ReactorError {
    #[error("window not found: {0}")]
    UnknownWindow(WindowId),
    #[error("workspace not found: {0:?}")]
    UnknownWorkspace(String),
    #[error("window already tracked: {0}")]
    DuplicateWindow(WindowId),
}
