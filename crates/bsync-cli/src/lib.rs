//! # bsync-cli: Command-Line Interface
//!
//! Provides the `bsync` binary on top of the descriptor registry and the
//! node engine.
//!
//! ## Subcommands
//!
//! - `bsync schema list`: Type names with their content model.
//! - `bsync schema show <TYPE>`: One resolved descriptor.
//! - `bsync render <RECIPE>`: Build a document from a declarative recipe
//!   and write it as XML or JSON.
//!
//! ```bash
//! bsync schema list --schema schemas/buildingsync-sample.yaml
//! bsync render recipes/example-building.yaml --schema schemas/ --out building.xml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in this library so
//!   they can be tested without a process boundary.
//! - Handlers return `anyhow::Result<u8>`, the process exit code on success.

pub mod config;
pub mod recipe;
pub mod render;
pub mod schema;
