//! Prompt-to-diagram editor.
//!
//! Turns a natural-language prompt into a laid-out, editable diagram. The
//! editing core (layout, history, mutations, the event reducer) lives in the
//! `canvas` crate; this crate adds the session that owns it, the generation
//! adapters that feed it, and the exporters that read from it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Session state, generation epochs and the async [`session::SessionHandle`] |
//! | [`generate`] | [`generate::DiagramGenerator`] trait with LLM and local adapters |
//! | [`llm`] | Anthropic and OpenAI-compatible chat clients |
//! | [`export`] | SVG, PNG and JSON export plus download file naming |
//! | [`theme`] | Diagram color themes and the editor light/dark mode |
//! | [`notice`] | Two-second status notices |
//! | [`error`] | [`error::ErrorCode`] trait and the user-facing error shape |
//!
//! Logging goes through `tracing`; installing a subscriber is up to the host.

mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod llm;
pub mod notice;
pub mod session;
pub mod theme;

#[cfg(test)]
mod test_env;

pub use canvas;
