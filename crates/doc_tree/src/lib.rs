//! # doc_tree
//!
//! Navigation tree of nested documents for the browser shell.
//!
//! Following a link opens the target document beneath the page that linked
//! to it. Documents reached from the same parent are kept as sibling tabs, and
//! the selected sibling at every depth forms the *active path* that is drawn
//! top to bottom as a stack of levels.
//!
//! - [`DocumentNode`]: one document, its ordered children and the selected child
//! - [`NavigationTree`]: the root documents, the active root, and the level
//!   containers currently on screen
//! - [`LevelContainer`] / [`LevelHost`]: the seam to whatever draws a level
//! - [`TabAction`]: what a rendered tab does when clicked, resolved by key
//!
//! ## Design Principles
//!
//! This crate does not depend on any UI framework. A redraw maps the active
//! path onto index-addressed level containers: container `i` always shows
//! depth `i`, existing containers are cleared and reused, missing ones are
//! allocated from the host, and surplus ones are handed back to the host.
//!
//! Tab callbacks are plain data. A tab carries a [`TabAction`] naming its
//! target by [`DocKey`]; the shell feeds the action back through
//! [`NavigationTree::apply`], which looks the target up again at that point.

mod error;
mod level;
mod node;
mod reconcile;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod tree;

pub use core_types::DocKey;
pub use error::TreeError;
pub use level::{LevelContainer, LevelHost, Tab, TabAction};
pub use node::DocumentNode;
pub use tree::{InsertOutcome, NavigationTree};
