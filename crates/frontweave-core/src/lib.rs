// Core modules
pub mod compose;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod items;
pub mod render;
pub mod schema;
pub mod substitute;
pub mod template;
pub mod value;

// Re-export commonly used types
pub use compose::{ComposedData, DataComposer, ExpansionKey, KeySource};
pub use error::{FrontweaveError, Result};
pub use format::Format;
pub use items::{ExpansionEngine, ExpansionResult, ItemsDetector};
pub use render::{RenderOptions, Renderer};
pub use schema::{BindingReport, JsonSchema, SchemaBindingResolver, SchemaProvider, VariableContext};
pub use substitute::{MissingMode, Substituter, VariableResolver};
