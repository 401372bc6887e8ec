//! Metadata inference for fields the hosting platform does not supply.
//!
//! - [`marker`]: finds `Label: value` override lines in README text.
//! - [`rules`]: the five precedence-ordered decision chains (organization,
//!   contact email, status, version, usage type) that build on the markers.

pub mod marker;
pub mod rules;
