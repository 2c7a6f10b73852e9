//! Bounded sampling of log files under a directory.

pub mod file;
pub mod sampler;

pub use file::LogFile;
pub use sampler::{SampleLimits, SampleSet, sample_directory};
