//! Editing core for generated diagrams.
//!
//! This crate is pure and synchronous: no I/O, no async, no clocks. It turns
//! an ungrounded [`model::DiagramData`] into a positioned
//! [`doc::GraphSnapshot`], keeps a bounded undo/redo ledger over snapshots,
//! and reduces interaction events into mutations. Hosts drive it through
//! [`engine::Editor`] and render whatever [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The [`engine::Editor`] reducer and its actions |
//! | [`model`] | Diagram kind, nodes and edges without positions |
//! | [`doc`] | Positioned nodes, edges and the snapshot type |
//! | [`layout`] | Timeline, layered and flow layout strategies |
//! | [`history`] | Capacity-bounded snapshot ledger with tagged transitions |
//! | [`ops`] | Snapshot-to-snapshot mutation operations and the clipboard |
//! | [`input`] | Substrate events, modifiers and the keyboard shortcut table |
//! | [`geometry`] | Points and bounds |
//! | [`consts`] | Layout, editing and presentation constants |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod input;
pub mod layout;
pub mod model;
pub mod ops;
