//! Isometric tile-map renderer (workspace facade crate).
//!
//! This package keeps the `tui_isomap::{types,core,engine,term}` public API
//! stable while the implementation lives in dedicated crates under
//! `crates/`.

pub use tui_isomap_core as core;
pub use tui_isomap_engine as engine;
pub use tui_isomap_term as term;
pub use tui_isomap_types as types;
