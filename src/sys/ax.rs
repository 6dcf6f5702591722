//! The accessibility boundary.
//!
//! Everything here models the slow, fallible, cross-process side of the
//! system: attribute reads against a window's AX element and the async title
//! fetch. The rest of the crate only ever talks to these traits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sys::app::WindowId;

pub const AX_WINDOW_ROLE: &str = "AXWindow";
pub const AX_STANDARD_WINDOW_SUBROLE: &str = "AXStandardWindow";

/// Attribute keys this core reads from a window's AX element.
///
/// Caching class is a property of the key, fixed by OS contract: role,
/// subrole and identifier cannot change after the window is created; the
/// titlebar button set changes rarely; everything else is volatile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxAttribute {
    Role,
    Subrole,
    Identifier,
    CloseButton,
    MinimizeButton,
    FullScreenButton,
    ZoomButton,
    Title,
    Frame,
    Minimized,
}

/// Opaque handle to a child AX element (e.g. a titlebar button). Only
/// identity matters to this core.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxElementRef(pub u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AxValue {
    String(String),
    Element(AxElementRef),
    Bool(bool),
}

impl AxValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AxValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<AxElementRef> {
        match self {
            AxValue::Element(e) => Some(*e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("window {0} is gone")]
    WindowGone(WindowId),
    #[error("AX error: {0}")]
    Ax(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One synchronous attribute read against the out-of-process accessibility
/// service. Slow; a legitimately absent attribute and a failed read both
/// come back as `None`.
pub trait AttributeSource {
    fn fetch(&self, window: WindowId, attr: AxAttribute) -> Option<AxValue>;
}

/// Async window title fetch. This is a suspension point; the window may
/// disappear mid-flight, in which case the fetch fails.
pub trait TitleSource {
    fn fetch_title(&self, window: WindowId) -> impl Future<Output = Result<String>>;
}
