//! Command bodies. Everything here is orchestration: reading and writing
//! files, printing, and turning flags into arguments for the library calls.

use anyhow::{Context, bail};
use lokidash::Result;
use lokidash::collect::model::RESERVED_LABELS;
use lokidash::collect::{CollectionConfigDocument, JobSpec, merge_job};
use lokidash::conf::Settings;
use lokidash::dashboard::{dashboard_file_name, render_grafana, synthesize_dashboard};
use lokidash::labels::Labels;
use lokidash::schema::{Diagnostics, SampleOutcome, Schema, sample_and_infer_schema};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct GenerateArgs {
    pub dir: PathBuf,
    pub job: Option<String>,
    pub labels: Vec<String>,
    pub fields: String,
    pub title: Option<String>,
    pub out: Option<PathBuf>,
    pub raw: bool,
    pub promtail_config: Option<PathBuf>,
    pub path_pattern: Option<String>,
}

pub fn override_limits(
    settings: &mut Settings,
    max_files: Option<usize>,
    max_lines: Option<usize>,
) -> Result<()> {
    if let Some(n) = max_files {
        settings.sample.max_files = n;
    }
    if let Some(n) = max_lines {
        settings.sample.max_lines = n;
    }
    settings.validate()
}

fn infer(settings: &Settings, dir: &Path) -> Result<(Schema, Diagnostics)> {
    let (schema, diag) =
        sample_and_infer_schema(dir, &settings.sample_limits(), settings.schema_options())
            .with_context(|| format!("sample log directory {}", dir.display()))?;
    Ok((schema, diag))
}

pub fn inspect(settings: &Settings, dir: &Path, json: bool) -> Result<()> {
    let (schema, diag) = infer(settings, dir)?;

    if json {
        let out = serde_json::json!({ "diagnostics": diag, "fields": schema });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_diagnostics(&diag);
    match diag.outcome(&schema) {
        SampleOutcome::NoFiles => println!("No log files found in {}", dir.display()),
        SampleOutcome::NoFields => println!("No JSON fields found; only a log browser is possible"),
        SampleOutcome::Fields => print_fields(&schema),
    }
    Ok(())
}

pub fn generate(settings: &Settings, args: GenerateArgs) -> Result<()> {
    let labels = Labels::parse_pairs(&args.labels)?;
    labels.validate(RESERVED_LABELS)?;
    let job = match args.job {
        Some(j) => j,
        None => default_job_name(&args.dir)?,
    };
    let collect = match &args.promtail_config {
        Some(config) => {
            let pattern = match &args.path_pattern {
                Some(p) => p.clone(),
                None => default_path_pattern(&args.dir),
            };
            let spec = JobSpec::new(job.clone(), pattern, labels.clone());
            spec.validate()?;
            Some((config.clone(), spec))
        }
        None => None,
    };

    let (schema, diag) = infer(settings, &args.dir)?;
    print_diagnostics(&diag);

    match diag.outcome(&schema) {
        SampleOutcome::NoFiles => warn!(
            "no log files found in {}; dashboard will only contain the log browser",
            args.dir.display()
        ),
        SampleOutcome::NoFields => {
            info!("no JSON fields discovered; dashboard will only contain the log browser")
        }
        SampleOutcome::Fields => {}
    }

    let selected = select_fields(&schema, &args.fields);
    let title = args.title.unwrap_or_else(|| format!("{} Logs", capitalize(&job)));

    let doc = synthesize_dashboard(
        &schema,
        &selected,
        &title,
        &job,
        &labels,
        &settings.dashboard_options(),
    );

    let body = if args.raw {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string_pretty(&render_grafana(&doc, &settings.grafana_options()))?
    };
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(dashboard_file_name(&doc.title)));
    fs::write(&out, body).with_context(|| format!("write dashboard {}", out.display()))?;
    println!("Wrote {} ({} panels)", out.display(), doc.panels.len());

    if let Some((config, spec)) = collect {
        update_config(&config, &spec)?;
    }

    Ok(())
}

pub fn add_job(config: &Path, job: &str, path: &str, labels: &[String]) -> Result<()> {
    let labels = Labels::parse_pairs(labels)?;
    update_config(config, &JobSpec::new(job, path, labels))
}

/// Read, merge, write back. A missing file starts from an empty document.
fn update_config(path: &Path, job: &JobSpec) -> Result<()> {
    let current = if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read promtail config {}", path.display()))?;
        CollectionConfigDocument::from_yaml_str(&text)
            .with_context(|| format!("parse promtail config {}", path.display()))?
    } else {
        warn!("{} does not exist, creating it", path.display());
        CollectionConfigDocument::empty()
    };

    let replaced = current.contains_job(&job.name);
    let updated = merge_job(&current, job)?;
    fs::write(path, updated.to_yaml_string()?)
        .with_context(|| format!("write promtail config {}", path.display()))?;

    println!(
        "{} job '{}' in {}",
        if replaced { "Replaced" } else { "Added" },
        job.name,
        path.display()
    );
    Ok(())
}

fn select_fields(schema: &Schema, spec: &str) -> Vec<String> {
    match spec.trim() {
        "all" => schema.names().map(str::to_string).collect(),
        "none" | "" => Vec::new(),
        list => {
            let wanted: Vec<String> = list
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
            let missing: Vec<&str> = wanted
                .iter()
                .filter(|f| !schema.contains(f))
                .map(|f| f.as_str())
                .collect();
            if !missing.is_empty() {
                warn!("fields not found in sample: {}", missing.join(", "));
            }
            wanted
        }
    }
}

fn default_path_pattern(dir: &Path) -> String {
    dir.join("**").join("*.log").to_string_lossy().into_owned()
}

fn default_job_name(dir: &Path) -> Result<String> {
    let abs = fs::canonicalize(dir).with_context(|| format!("resolve {}", dir.display()))?;
    match abs.file_name().and_then(|n| n.to_str()) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => bail!("cannot derive a job name from {}; pass --job", abs.display()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_diagnostics(diag: &Diagnostics) {
    println!(
        "files: {} found, {} sampled, {} unreadable",
        diag.files_found, diag.files_sampled, diag.files_unreadable
    );
    println!(
        "lines: {} sampled, {} blank, {} not JSON",
        diag.lines_sampled, diag.lines_blank, diag.lines_unparsed
    );
    let f = &diag.formats;
    if f.total() > 0 {
        println!(
            "formats: json {} / logfmt {} / pattern {} / unstructured {}",
            f.json, f.logfmt, f.pattern, f.unstructured
        );
    }
}

fn print_fields(schema: &Schema) {
    let width = schema.names().map(str::len).max().unwrap_or(5).max(5);
    println!(
        "{:<width$}  {:<20}  {:>6}  {:>14}  {:<26}  examples",
        "field", "types", "seen", "distinct", "range"
    );
    for field in schema.fields() {
        let examples: Vec<String> = field
            .examples
            .iter()
            .take(3)
            .map(|v| {
                let s = v.to_string();
                if s.chars().count() > 30 {
                    format!("{}...", s.chars().take(27).collect::<String>())
                } else {
                    s
                }
            })
            .collect();
        let distinct = if field.cardinality_saturated {
            format!("{}+ {}", field.cardinality, field.cardinality_class.as_str())
        } else {
            format!("{} {}", field.cardinality, field.cardinality_class.as_str())
        };
        let range = match &field.numeric {
            Some(n) => format!("{}..{} avg {:.2}", n.min, n.max, n.mean),
            None => "-".to_string(),
        };
        println!(
            "{:<width$}  {:<20}  {:>6}  {:>14}  {:<26}  {}",
            field.name,
            field.type_summary(),
            field.occurrences,
            distinct,
            range,
            examples.join(", ")
        );
    }
}
