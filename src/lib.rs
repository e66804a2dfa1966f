pub mod diff;
pub mod environment;
pub mod error;
pub mod hash;
pub mod loader;
pub mod merge;
pub mod overrides;
pub mod parser;
pub mod render;
pub mod service;
pub mod tree;

pub use error::{ParseError, ResolveError, SchemaError};
pub use parser::{Format, Location, parse_document};
pub use service::{ConfigService, ResolvedConfig, resolve_document};
pub use tree::{ConfigTree, Mapping, NodeKind, Scalar};
