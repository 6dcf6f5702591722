//! The reactor owns the window tree, the focus history, and the per-window
//! attribute caches. It is the single mutation point: structural and focus
//! notifications arrive on one channel and are applied one event at a time,
//! so readers never observe a partially applied update.

mod error;
pub mod query;
pub mod replay;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

pub use self::error::ReactorError;
use crate::actor::Receiver;
use crate::common::collections::HashMap;
use crate::model::focus::{FocusHistory, FocusTarget};
use crate::model::node::LayoutKind;
use crate::model::tree::NodeId;
use crate::model::window_tree::WindowTree;
use crate::sys::app::{AppInfo, WindowId, pid_t};
use crate::sys::ax::AttributeSource;
use crate::sys::ax_cache::CachedAxWindow;

/// Notifications consumed from the focus-change and tree-mutation
/// collaborators. One JSON object per line when recorded to a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ApplicationLaunched { pid: pid_t, info: AppInfo },
    ApplicationTerminated(pid_t),
    WorkspaceCreated { name: String },
    WorkspaceRemoved { name: String },
    /// A new window appeared. It is placed next to the workspace's most
    /// recently used window, or in the workspace's root container if there
    /// is none yet.
    WindowCreated {
        wid: WindowId,
        workspace: String,
        is_floating: bool,
    },
    WindowDestroyed(WindowId),
    /// The window moved to another workspace. It lands at the back of the
    /// target container's visual and MRU orders.
    WindowMoved { wid: WindowId, workspace: String },
    /// Wraps the given windows in a new container under the first window's
    /// parent.
    GroupWindows {
        wids: Vec<WindowId>,
        layout: LayoutKind,
    },
    /// The window's internal AX structure may have changed; its button
    /// cache can no longer be trusted.
    WindowStructureChanged(WindowId),
    FocusChanged {
        workspace: String,
        wid: Option<WindowId>,
    },
}

pub struct Reactor<S> {
    source: Arc<S>,
    tree: WindowTree,
    focus: FocusHistory,
    caches: HashMap<WindowId, CachedAxWindow<S>>,
    apps: HashMap<pid_t, AppInfo>,
}

impl<S: AttributeSource> Reactor<S> {
    pub fn new(source: Arc<S>) -> Self {
        Reactor {
            source,
            tree: WindowTree::new(),
            focus: FocusHistory::default(),
            caches: HashMap::default(),
            apps: HashMap::default(),
        }
    }

    /// Drains the channel, applying events one at a time inside the span
    /// they were sent under. Returns when every sender is gone.
    pub async fn run(&mut self, mut events: Receiver<Event>) {
        while let Some((span, event)) = events.recv().await {
            let _guard = span.enter();
            if let Err(err) = self.handle_event(event) {
                warn!(%err, "failed to apply event");
            }
        }
    }

    pub fn tree(&self) -> &WindowTree {
        &self.tree
    }

    pub fn focus(&self) -> &FocusHistory {
        &self.focus
    }

    pub fn app_info(&self, pid: pid_t) -> Option<&AppInfo> {
        self.apps.get(&pid)
    }

    pub fn cache(&self, wid: WindowId) -> Option<&CachedAxWindow<S>> {
        self.caches.get(&wid)
    }

    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: Event) -> Result<(), ReactorError> {
        debug!(?event, "handling event");
        match event {
            Event::ApplicationLaunched { pid, info } => {
                self.apps.insert(pid, info);
                Ok(())
            }
            Event::ApplicationTerminated(pid) => {
                self.apps.remove(&pid);
                let wids: Vec<_> =
                    self.caches.keys().copied().filter(|w| w.pid == pid).collect();
                for wid in wids {
                    self.destroy_window(wid);
                }
                Ok(())
            }
            Event::WorkspaceCreated { name } => {
                self.tree.create_workspace(&name);
                Ok(())
            }
            Event::WorkspaceRemoved { name } => {
                let Some(root) = self.tree.workspace(&name) else {
                    return Err(ReactorError::UnknownWorkspace(name));
                };
                self.focus.clear_workspace(root);
                let orphaned: Vec<_> = self
                    .caches
                    .keys()
                    .copied()
                    .filter(|&w| {
                        self.tree
                            .window_node(w)
                            .and_then(|n| self.tree.workspace_of(n))
                            == Some(root)
                    })
                    .collect();
                for wid in orphaned {
                    self.caches.remove(&wid);
                }
                self.tree.remove_workspace(&name);
                Ok(())
            }
            Event::WindowCreated { wid, workspace, is_floating } => {
                if self.tree.window_node(wid).is_some() {
                    return Err(ReactorError::DuplicateWindow(wid));
                }
                let parent = self.insertion_point(&workspace)?;
                self.tree.add_window(parent, wid, is_floating);
                // The window node and its cache share a lifetime.
                self.caches.insert(wid, CachedAxWindow::new(self.source.clone(), wid));
                Ok(())
            }
            Event::WindowDestroyed(wid) => {
                if !self.destroy_window(wid) {
                    return Err(ReactorError::UnknownWindow(wid));
                }
                Ok(())
            }
            Event::WindowMoved { wid, workspace } => {
                let node = self
                    .tree
                    .window_node(wid)
                    .ok_or(ReactorError::UnknownWindow(wid))?;
                let parent = self.insertion_point(&workspace)?;
                self.tree.reparent(node, parent);
                Ok(())
            }
            Event::GroupWindows { wids, layout } => self.group_windows(&wids, layout),
            Event::WindowStructureChanged(wid) => {
                let cache =
                    self.caches.get(&wid).ok_or(ReactorError::UnknownWindow(wid))?;
                cache.invalidate_button_cache();
                Ok(())
            }
            Event::FocusChanged { workspace, wid } => self.focus_changed(&workspace, wid),
        }
    }

    /// Focus history commits first; the MRU update runs only after the new
    /// focus is in place, so an interleaved read always sees a consistent
    /// (current, previous) pair.
    fn focus_changed(
        &mut self,
        workspace: &str,
        wid: Option<WindowId>,
    ) -> Result<(), ReactorError> {
        // Resolve the target fully before committing: a focus event naming
        // an untracked window is rejected without touching the history.
        let target = match wid {
            Some(w) => {
                let node =
                    self.tree.window_node(w).ok_or(ReactorError::UnknownWindow(w))?;
                let root = self
                    .tree
                    .workspace_of(node)
                    .expect("window node without a workspace root");
                FocusTarget::window(root, w)
            }
            None => {
                let root = self
                    .tree
                    .workspace(workspace)
                    .ok_or_else(|| ReactorError::UnknownWorkspace(workspace.to_owned()))?;
                FocusTarget::workspace_only(root)
            }
        };
        self.focus.on_focus_changed(target);
        if let Some(w) = wid {
            self.tree.record_focus(w);
        }
        Ok(())
    }

    fn destroy_window(&mut self, wid: WindowId) -> bool {
        let removed = self.tree.remove_window(wid);
        if removed {
            self.caches.remove(&wid);
            self.focus.clear_window(wid);
        }
        removed
    }

    /// Where a new or moved window lands in `workspace`: the container of
    /// the workspace's most recently used window, or the workspace's root
    /// container (created on first use).
    fn insertion_point(&mut self, workspace: &str) -> Result<NodeId, ReactorError> {
        let root = self
            .tree
            .workspace(workspace)
            .ok_or_else(|| ReactorError::UnknownWorkspace(workspace.to_owned()))?;
        if let Some(mru) = self.tree.most_recent_window_recursive(root) {
            let node = self.tree.window_node(mru).expect("MRU window not indexed");
            return Ok(node.parent(self.tree.map()).expect("window leaf without parent"));
        }
        let first = self.tree.children(root).next();
        match first {
            Some(container) => Ok(container),
            None => Ok(self.tree.add_container(root, LayoutKind::Horizontal)),
        }
    }

    fn group_windows(
        &mut self,
        wids: &[WindowId],
        layout: LayoutKind,
    ) -> Result<(), ReactorError> {
        // All wids must resolve before anything mutates, so an unknown id
        // cannot leave the grouping half-applied.
        let mut nodes = Vec::with_capacity(wids.len());
        for &wid in wids {
            nodes.push(
                self.tree.window_node(wid).ok_or(ReactorError::UnknownWindow(wid))?,
            );
        }
        let Some(&first_node) = nodes.first() else {
            return Ok(());
        };
        let parent =
            first_node.parent(self.tree.map()).expect("window leaf without parent");
        let container = self.tree.add_container(parent, layout);
        for node in nodes {
            self.tree.reparent(node, container);
        }
        Ok(())
    }
}
