//! Items marker engine
//!
//! The items marker `{@items}` marks where a rendered collection is spliced into
//! a container template. This module finds markers, classifies their context,
//! builds per-element scopes, and performs the expansion.
//!
//! ## Marker contexts
//!
//! - **List**: the marker is the sole content of a sequence element
//!   (`books: ["{@items}"]`) → rendered elements are spliced into the sequence
//! - **Array**: the marker is an entire scalar value (`"{@items}"`) → the value
//!   becomes the rendered sequence, keeping real types
//! - **Text**: the marker is embedded in text (`"Count: {@items}"`) → the marker
//!   is replaced by the compact text of the rendered sequence

pub mod classify;
pub mod context;
pub mod detect;
pub mod expand;

pub use classify::{ExpansionFormat, FormatClassifier};
pub use context::ItemContextBuilder;
pub use detect::{Detection, ItemsDetector, ItemsPattern, PathSegment, TreePath};
pub use expand::{ExpansionEngine, ExpansionResult};

/// Token name of the items marker (without braces)
pub const ITEMS_TOKEN: &str = "@items";

/// The items marker as written in templates
pub const ITEMS_MARKER: &str = "{@items}";
