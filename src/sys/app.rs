use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
pub type pid_t = i32;

/// An identifier representing a window.
///
/// This identifier is only valid for the lifetime of the process that owns
/// it. It is not stable across restarts of the window manager.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct WindowId {
    pub pid: pid_t,
    pub idx: NonZeroU32,
}

impl WindowId {
    pub fn new(pid: pid_t, idx: u32) -> WindowId {
        WindowId {
            pid,
            idx: NonZeroU32::new(idx).expect("window idx must be non-zero"),
        }
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pid, self.idx)
    }
}

/// Describes the owning application of one or more windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    pub bundle_id: Option<String>,
    pub localized_name: Option<String>,
}

impl AppInfo {
    pub fn named(name: &str) -> Self {
        AppInfo {
            bundle_id: None,
            localized_name: Some(name.to_owned()),
        }
    }
}
