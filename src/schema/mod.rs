//! Schema inference over sampled JSON log lines.

pub mod aggregate;
pub mod extract;
pub mod format;
pub mod infer;
pub mod value;

pub use aggregate::{CardinalityClass, FieldObservation, NumericStats, Schema, SchemaOptions};
pub use extract::{Extracted, LineOutcome, extract_line};
pub use format::{FormatCounts, LineClassifier, LineFormat};
pub use infer::{Diagnostics, SampleOutcome, infer_schema, sample_and_infer_schema};
pub use value::TypeTag;
