use std::path::PathBuf;

/// The first lines of one sampled file, line endings stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl LogFile {
    pub fn new(path: PathBuf, lines: Vec<String>) -> Self {
        Self { path, lines }
    }

    /// Lines paired with their 1-based line number.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_str()))
    }
}
