//! Read-only diagnostics over the reactor's state.
//!
//! The walker renders the MRU stacks and focus pointers without mutating
//! anything, so it is safe to run between any two events. Title fetches are
//! the only external calls; a failed fetch renders a placeholder and the
//! walk continues.

use std::fmt::Write as _;
use std::pin::Pin;

use crate::actor::reactor::Reactor;
use crate::model::focus::FocusTarget;
use crate::model::node::NodeKind;
use crate::model::tree::NodeId;
use crate::sys::app::WindowId;
use crate::sys::ax::{AttributeSource, TitleSource};

const TITLE_PLACEHOLDER: &str = "<title unavailable>";

impl<S: AttributeSource + TitleSource> Reactor<S> {
    /// Renders the full MRU debug dump: per-workspace recursive MRU result
    /// and stacks, then current and previous focus.
    pub async fn debug_mru(&self) -> String {
        let mut out = String::new();
        out.push_str("=== MRU Debug Info ===\n");

        for (name, root) in self.tree.workspaces() {
            out.push('\n');
            let _ = writeln!(out, "Workspace '{name}':");

            match self.tree.most_recent_window_recursive(root) {
                Some(wid) => {
                    let title = self.title_or_placeholder(wid).await;
                    let _ = writeln!(
                        out,
                        "  mostRecentWindowRecursive: windowId={wid}, app={app}, title=\"{title}\"",
                        app = self.app_name(wid),
                    );
                }
                None => out.push_str("  mostRecentWindowRecursive: (none)\n"),
            }

            out.push_str("  MRU Stack (workspace level):\n");
            self.print_mru_stack(&mut out, root, 2).await;
        }

        out.push_str("\n=== Current Focus ===\n");
        self.print_focus(&mut out, self.focus.current()).await;

        if let Some(previous) = self.focus.previous() {
            out.push_str("\n=== Previous Focus ===\n");
            self.print_focus(&mut out, Some(previous)).await;
        }

        out
    }

    /// One line per child, `[MRU]` for the head and `[index]` for the rest,
    /// indented one level per tree depth.
    fn print_mru_stack<'a>(
        &'a self,
        out: &'a mut String,
        node: NodeId,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = ()> + 'a>> {
        Box::pin(async move {
            let indent = "  ".repeat(depth);
            let mru_children = self.tree.mru_children(node);
            if mru_children.is_empty() {
                let _ = writeln!(out, "{indent}(empty MRU stack)");
                return;
            }

            for (index, &child) in mru_children.iter().enumerate() {
                let prefix = if index == 0 {
                    "[MRU]".to_owned()
                } else {
                    format!("[{index}]")
                };
                let description = self.describe_node(child).await;
                let _ = writeln!(out, "{indent}{prefix} {description}");

                if !self.tree.kind(child).is_some_and(NodeKind::is_window) {
                    self.print_mru_stack(out, child, depth + 1).await;
                }
            }
        })
    }

    async fn describe_node(&self, node: NodeId) -> String {
        match self.tree.kind(node) {
            Some(&NodeKind::Window { wid, is_floating }) => {
                let title = self.title_or_placeholder(wid).await;
                format!(
                    "Window(id={wid}, app={app}, title=\"{title}\", floating={is_floating})",
                    app = self.app_name(wid),
                )
            }
            Some(NodeKind::Container { layout, orientation }) => {
                let children = self.tree.children(node).count();
                format!("Container(layout={layout}, orientation={orientation}, children={children})")
            }
            Some(NodeKind::Workspace { name }) => format!("Workspace({name})"),
            None => "(unknown node)".to_owned(),
        }
    }

    async fn print_focus(&self, out: &mut String, focus: Option<FocusTarget>) {
        let Some(target) = focus else {
            out.push_str("Focused: (no window)\n");
            return;
        };
        match target.window {
            Some(wid) => {
                let title = self.title_or_placeholder(wid).await;
                let _ = writeln!(
                    out,
                    "Focused: windowId={wid}, app={app}, title=\"{title}\"",
                    app = self.app_name(wid),
                );
            }
            None => out.push_str("Focused: (no window)\n"),
        }
        let name = match self.tree.kind(target.workspace) {
            Some(NodeKind::Workspace { name }) => name.as_str(),
            _ => "?",
        };
        let _ = writeln!(out, "Workspace: {name}");
    }

    fn app_name(&self, wid: WindowId) -> &str {
        self.apps
            .get(&wid.pid)
            .and_then(|info| info.localized_name.as_deref())
            .unwrap_or("nil")
    }

    async fn title_or_placeholder(&self, wid: WindowId) -> String {
        match self.source.fetch_title(wid).await {
            Ok(title) => title,
            Err(err) => {
                tracing::debug!(%wid, %err, "title fetch failed");
                TITLE_PLACEHOLDER.to_owned()
            }
        }
    }
}
