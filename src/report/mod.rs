//! Catalog review output.
//!
//! - [`completeness`]: required `code.json` fields missing from a release.
//! - [`terminal`]: colored summary box plus tables of incomplete releases;
//!   respects `--verbose` / `--quiet`.

pub mod completeness;
pub mod terminal;
