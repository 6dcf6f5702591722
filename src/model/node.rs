use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sys::app::WindowId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Horizontal,
    Vertical,
    Tabbed,
}

impl LayoutKind {
    pub fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => LayoutKind::Horizontal,
            Orientation::Vertical => LayoutKind::Vertical,
        }
    }

    /// Tabbed containers stack along the horizontal axis.
    pub fn orientation(self) -> Orientation {
        match self {
            LayoutKind::Horizontal | LayoutKind::Tabbed => Orientation::Horizontal,
            LayoutKind::Vertical => Orientation::Vertical,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::Horizontal => write!(f, "horizontal"),
            LayoutKind::Vertical => write!(f, "vertical"),
            LayoutKind::Tabbed => write!(f, "tabbed"),
        }
    }
}

/// What a tree node is. Each variant carries only the fields relevant to it;
/// the window title is deliberately absent because it is fetched lazily
/// through the accessibility layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Window {
        wid: WindowId,
        is_floating: bool,
    },
    Container {
        layout: LayoutKind,
        orientation: Orientation,
    },
    Workspace {
        name: String,
    },
}

impl NodeKind {
    pub fn container(layout: LayoutKind) -> Self {
        NodeKind::Container {
            layout,
            orientation: layout.orientation(),
        }
    }

    pub fn is_window(&self) -> bool {
        matches!(self, NodeKind::Window { .. })
    }

    pub fn window_id(&self) -> Option<WindowId> {
        match self {
            NodeKind::Window { wid, .. } => Some(*wid),
            _ => None,
        }
    }
}
