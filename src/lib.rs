//! Notion-style avatar generation server.
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the binary.
//! - `gemini`: Thin client for the Gemini `generateContent` endpoint.
//! - `prompt`: Composition of the outbound generation payload and loading of
//!   the fixed style reference images.
//! - `storage`: Persistence of generated avatars in the output directory.
//! - `upload`: Validation of uploaded files (extension allow-list, size cap).
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `GeminiClient`,
//! `PromptComposer`, and `OutputStore`.
pub mod api;
pub mod gemini;
pub mod prompt;
pub mod storage;
pub mod upload;
pub mod config;
pub mod error;

pub use config::Config;
pub use gemini::client::GeminiClient;
pub use prompt::composer::PromptComposer;
pub use storage::outputs::OutputStore;
