//! The browser UI: the shell window, its level containers, and the link
//! handling that decides where a clicked document opens.

mod levels;
mod links;
mod nav;
mod shell;

pub use levels::{EguiLevel, EguiLevelHost, LevelAction, ScrollTarget, truncate_label};
pub use links::{LinkResolver, LinkTarget, ResolverError, anchor_id};
pub use nav::NavigationGate;
pub use shell::ShellApp;
