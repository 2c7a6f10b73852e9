//! Directory in, schema and diagnostics out.

use crate::error::CoreError;
use crate::sample::{LogFile, SampleLimits, sample_directory};
use crate::schema::{
    FormatCounts, LineClassifier, LineOutcome, Schema, SchemaOptions, extract_line,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Counters reported for every run, successful or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub files_found: usize,
    pub files_sampled: usize,
    pub files_unreadable: usize,
    pub lines_sampled: usize,
    pub lines_blank: usize,
    pub lines_unparsed: usize,
    pub formats: FormatCounts,
}

/// How a run should be presented to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// No file with a recognized extension exists under the directory.
    NoFiles,
    /// Files were sampled but none contained a JSON object line.
    NoFields,
    Fields,
}

impl Diagnostics {
    pub fn outcome(&self, schema: &Schema) -> SampleOutcome {
        if self.files_found == 0 {
            SampleOutcome::NoFiles
        } else if schema.is_empty() {
            SampleOutcome::NoFields
        } else {
            SampleOutcome::Fields
        }
    }
}

/// Sample `dir` and infer the schema of its JSON lines.
///
/// Fails only when `dir` is missing or not a directory. An empty directory
/// gives an empty schema with `files_found == 0`.
pub fn sample_and_infer_schema(
    dir: &Path,
    limits: &SampleLimits,
    opts: SchemaOptions,
) -> Result<(Schema, Diagnostics), CoreError> {
    let set = sample_directory(dir, limits)?;
    let (schema, mut diag) = infer_schema(&set.files, opts)?;
    diag.files_found = set.files_found;
    diag.files_unreadable = set.files_unreadable;

    info!(
        "sampled {}/{} files, {} lines ({} unparsed), {} fields",
        diag.files_sampled,
        diag.files_found,
        diag.lines_sampled,
        diag.lines_unparsed,
        schema.len()
    );
    Ok((schema, diag))
}

/// Fold already-sampled files, in the given order, into a fresh schema.
pub fn infer_schema(
    files: &[LogFile],
    opts: SchemaOptions,
) -> Result<(Schema, Diagnostics), CoreError> {
    let classifier = LineClassifier::new()?;
    let mut schema = Schema::new(opts);
    let mut diag = Diagnostics {
        files_sampled: files.len(),
        ..Diagnostics::default()
    };

    for file in files {
        let mut unparsed = 0usize;
        for (_, line) in file.numbered_lines() {
            diag.lines_sampled += 1;
            match extract_line(line) {
                LineOutcome::Blank => diag.lines_blank += 1,
                LineOutcome::Unparsed => {
                    unparsed += 1;
                    diag.formats.record(classifier.classify(line, false));
                }
                LineOutcome::Fields(fields) => {
                    diag.formats.record(classifier.classify(line, true));
                    schema.observe_all_with(fields, |v| classifier.is_timestamp_value(v));
                }
            }
        }
        if unparsed > 0 {
            debug!(
                "{}: {} of {} lines are not JSON objects",
                file.path.display(),
                unparsed,
                file.lines.len()
            );
        }
        diag.lines_unparsed += unparsed;
    }

    Ok((schema, diag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeTag;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    #[test]
    fn scenario_mixed_status_types() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("app.log"),
            "{\"level\":\"INFO\",\"status\":200}\n{\"level\":\"ERROR\",\"status\":\"n/a\"}\n",
        )
        .unwrap();

        let (schema, diag) =
            sample_and_infer_schema(dir.path(), &SampleLimits::default(), SchemaOptions::default())
                .unwrap();

        let status = schema.get("status").unwrap();
        assert_eq!(
            status.types.iter().copied().collect::<Vec<_>>(),
            vec![TypeTag::Integer, TypeTag::String]
        );
        assert_eq!(status.examples, vec![json!(200), json!("n/a")]);
        assert_eq!(schema.get("level").unwrap().examples, vec![json!("INFO"), json!("ERROR")]);
        assert_eq!(diag.files_sampled, 1);
        assert_eq!(diag.lines_unparsed, 0);
        assert_eq!(diag.outcome(&schema), SampleOutcome::Fields);
    }

    #[test]
    fn empty_directory_reports_no_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.md"), "{\"a\":1}\n").unwrap();

        let (schema, diag) =
            sample_and_infer_schema(dir.path(), &SampleLimits::default(), SchemaOptions::default())
                .unwrap();

        assert!(schema.is_empty());
        assert_eq!(diag.files_found, 0);
        assert_eq!(diag.outcome(&schema), SampleOutcome::NoFiles);
    }

    #[test]
    fn plain_text_logs_report_no_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("app.log"),
            "2024-05-01 10:00:00 started\n\nlevel=info msg=ok\n",
        )
        .unwrap();

        let (schema, diag) =
            sample_and_infer_schema(dir.path(), &SampleLimits::default(), SchemaOptions::default())
                .unwrap();

        assert!(schema.is_empty());
        assert_eq!(diag.files_found, 1);
        assert_eq!(diag.lines_sampled, 3);
        assert_eq!(diag.lines_blank, 1);
        assert_eq!(diag.lines_unparsed, 2);
        assert_eq!(diag.formats.pattern, 1);
        assert_eq!(diag.formats.logfmt, 1);
        assert_eq!(diag.outcome(&schema), SampleOutcome::NoFields);
    }

    #[test]
    fn field_order_follows_file_order_then_line_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.log"), "{\"from_b\":1,\"shared\":1}\n").unwrap();
        fs::write(dir.path().join("a.log"), "garbage\n{\"from_a\":1,\"shared\":2}\n").unwrap();

        let (schema, diag) =
            sample_and_infer_schema(dir.path(), &SampleLimits::default(), SchemaOptions::default())
                .unwrap();

        assert_eq!(
            schema.names().collect::<Vec<_>>(),
            vec!["from_a", "shared", "from_b"]
        );
        assert_eq!(diag.lines_unparsed, 1);
        assert_eq!(schema.get("shared").unwrap().examples, vec![json!(2), json!(1)]);
    }

    #[test]
    fn repeated_runs_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("x.log", "{\"a\":1,\"b\":[1]}\n{\"c\":null,\"a\":\"x\"}\n"),
            ("y.json", "{\"d\":{\"k\":1},\"a\":2.5}\nnot json\n"),
        ] {
            fs::write(dir.path().join(name), body).unwrap();
        }

        let run = || {
            let (schema, diag) = sample_and_infer_schema(
                dir.path(),
                &SampleLimits::default(),
                SchemaOptions::default(),
            )
            .unwrap();
            (
                serde_json::to_string(&schema).unwrap(),
                serde_json::to_string(&diag).unwrap(),
            )
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = sample_and_infer_schema(
            &dir.path().join("missing"),
            &SampleLimits::default(),
            SchemaOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DirectoryNotFound(_)));
    }

    #[test]
    fn iso_timestamp_strings_are_recognized() {
        let files = vec![LogFile::new(
            "app.log".into(),
            vec![
                r#"{"timestamp":"2024-05-01T10:00:01Z","level":"INFO"}"#.to_string(),
                r#"{"timestamp":"2024-05-01T10:00:02Z","level":"WARN"}"#.to_string(),
                r#"{"timestamp":"2024-05-01T10:00:03Z","level":"INFO"}"#.to_string(),
            ],
        )];

        let (schema, _) = infer_schema(&files, SchemaOptions::default()).unwrap();
        assert!(schema.get("timestamp").unwrap().is_timestamp_string());
        assert!(!schema.get("level").unwrap().is_timestamp_string());
    }
}
