use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::tree::NodeId;
use crate::sys::app::WindowId;

/// What is focused: a workspace, and within it either a concrete window or
/// nothing (a workspace can hold focus while empty).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTarget {
    pub workspace: NodeId,
    pub window: Option<WindowId>,
}

impl FocusTarget {
    pub fn workspace_only(workspace: NodeId) -> Self {
        FocusTarget { workspace, window: None }
    }

    pub fn window(workspace: NodeId, wid: WindowId) -> Self {
        FocusTarget { workspace, window: Some(wid) }
    }
}

/// Process-wide focus state: the current and previous focus targets.
///
/// Owned by the reactor and passed by reference to consumers; there is no
/// ambient global. Updates are transactional in the sense that the previous
/// snapshot is taken before current is overwritten, so a read between any
/// two events always sees a consistent pair.
#[derive(Default, Serialize, Deserialize)]
pub struct FocusHistory {
    current: Option<FocusTarget>,
    previous: Option<FocusTarget>,
}

impl FocusHistory {
    pub fn current(&self) -> Option<FocusTarget> {
        self.current
    }

    pub fn previous(&self) -> Option<FocusTarget> {
        self.previous
    }

    /// Commits a focus transition. The caller triggers the MRU update after
    /// this returns, never before.
    pub fn on_focus_changed(&mut self, new_focus: FocusTarget) {
        if let Some(current) = self.current {
            if current != new_focus {
                self.previous = Some(current);
            }
        }
        self.current = Some(new_focus);
        debug!(current = ?self.current, previous = ?self.previous, "focus changed");
    }

    /// Window-closed hook: a focus pointer must never reference a window the
    /// tree no longer tracks. The workspace part of the pointer stays.
    pub fn clear_window(&mut self, wid: WindowId) {
        for slot in [&mut self.current, &mut self.previous] {
            if let Some(target) = slot {
                if target.window == Some(wid) {
                    target.window = None;
                }
            }
        }
    }

    /// Workspace-removed hook: drop pointers into the removed workspace
    /// entirely.
    pub fn clear_workspace(&mut self, workspace: NodeId) {
        for slot in [&mut self.current, &mut self.previous] {
            if slot.map(|t| t.workspace) == Some(workspace) {
                *slot = None;
            }
        }
    }
}
