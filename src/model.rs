pub mod focus;
pub mod mru;
pub mod node;
pub mod tree;
pub mod window_tree;

pub use focus::{FocusHistory, FocusTarget};
pub use node::{LayoutKind, NodeKind, Orientation};
pub use window_tree::WindowTree;
