use crate::error::CoreError;
use crate::sample::LogFile;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_MAX_LINES: usize = 100;
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;
pub const DEFAULT_EXTENSIONS: &[&str] = &["log", "json", "txt", "jsonl", "ndjson"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLimits {
    pub max_files: usize,
    pub max_lines: usize,
    /// Longer lines are cut here and the rest of the line is skipped.
    pub max_line_bytes: usize,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for SampleLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_lines: DEFAULT_MAX_LINES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SampleLimits {
    pub fn new(max_files: usize, max_lines: usize) -> Self {
        Self {
            max_files,
            max_lines,
            ..Self::default()
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.extensions.iter().any(|x| *x == e)
            })
            .unwrap_or(false)
    }
}

/// Result of one sampling pass.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    /// Sampled files in path order.
    pub files: Vec<LogFile>,
    /// Files with a recognized extension, before the file limit.
    pub files_found: usize,
    /// Candidates skipped because they could not be opened or read.
    pub files_unreadable: usize,
}

/// Walk `root` recursively and read the first lines of up to `max_files`
/// matching files.
///
/// Candidates are visited in sorted path order. A candidate that cannot be
/// read is skipped and the next one takes its slot.
pub fn sample_directory(root: &Path, limits: &SampleLimits) -> Result<SampleSet, CoreError> {
    if !root.exists() {
        return Err(CoreError::DirectoryNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(CoreError::NotADirectory(root.to_path_buf()));
    }

    let candidates = find_candidates(root, limits);
    let mut set = SampleSet {
        files_found: candidates.len(),
        ..SampleSet::default()
    };

    for path in candidates {
        if set.files.len() >= limits.max_files {
            break;
        }
        match read_head(&path, limits.max_lines, limits.max_line_bytes) {
            Ok(lines) => {
                debug!("sampled {} lines from {}", lines.len(), path.display());
                set.files.push(LogFile::new(path, lines));
            }
            Err(e) => {
                warn!("skipping unreadable log file {}: {}", path.display(), e);
                set.files_unreadable += 1;
            }
        }
    }

    Ok(set)
}

fn find_candidates(root: &Path, limits: &SampleLimits) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                debug!("skipping directory entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && limits.accepts(e.path()))
        .map(|e| e.into_path())
        .collect();
    out.sort();
    out
}

/// Read at most `max_lines` lines of at most `max_line_bytes` each. Invalid
/// UTF-8 is replaced, not rejected.
fn read_head(
    path: &Path,
    max_lines: usize,
    max_line_bytes: usize,
) -> std::io::Result<Vec<String>> {
    let mut reader = BufReader::new(File::open(path)?);
    let limit = max_line_bytes as u64;
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    while lines.len() < max_lines {
        buf.clear();
        let n = (&mut reader).take(limit).read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        if n as u64 == limit && buf.last() != Some(&b'\n') {
            let skipped = reader.skip_until(b'\n')?;
            debug!("{}: cut a line {} bytes past the limit", path.display(), skipped);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(lines)
}
