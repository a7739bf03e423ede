//! File-based collaborators around the engine: identifier source, result and
//! metadata sinks, fixture generation.

pub mod fixtures;
pub mod sink;
pub mod source;

pub use fixtures::{generate_identifiers, write_identifiers};
pub use sink::{write_metadata, write_results, ResultDocument, ResultRecord};
pub use source::{parse_identifiers, read_identifiers};
