//! Resolve a rendered UI element to the source line that declared it, and
//! open that line in an editor through a local helper server.
//!
//! The resolution core (`locator`, `extractor`, `registry`, `normalize`,
//! `resolution`) reads a host page through the traits in `host` and never
//! mutates it. `session` holds the inspector state the calling layer owns.
//! `server`, `editor` and `client` implement the open-in-editor exchange.

pub mod client;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod editor;
pub mod error;
pub mod extractor;
pub mod host;
pub mod info;
pub mod locator;
pub mod logging;
pub mod normalize;
pub mod registry;
pub mod resolution;
pub mod server;
pub mod session;
pub mod snapshot;
pub mod types;
