//! Core of the warren gopher client.
//!
//! This crate ties together the selector codec (the on-the-wire data
//! model), the TCP protocol client, the per-session content cache, and
//! the navigation history into the [`Session`] controller -- the
//! component that a terminal frontend drives with [`Command`]s and
//! renders from [`Snapshot`]s.

pub mod cache;
pub mod config;
pub mod nav;
pub mod net;
pub mod page;
pub mod selector;
pub mod session;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use cache::PageCache;
pub use config::Config;
pub use nav::{History, HistoryEntry};
pub use net::{Fetch, NetFetcher};
pub use page::{Menu, Page, TextDocument};
pub use selector::{ItemType, PageKind, Selector, START_URI};
pub use session::{Command, Mode, Session, SessionUi, Snapshot};
