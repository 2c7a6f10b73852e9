use clap::{Parser, Subcommand};
use lokidash::Result;
use lokidash::conf::Settings;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

#[derive(Parser)]
#[command(name = "lokidash")]
#[command(
    about = "Infer log fields and generate Loki dashboards and Promtail jobs",
    long_about = None
)]
struct Cli {
    /// Settings file (TOML). Defaults to $LOKIDASH_CONFIG or ./lokidash.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a log directory and print the inferred fields.
    Inspect {
        #[arg(long)]
        dir: PathBuf,

        #[arg(long)]
        max_files: Option<usize>,

        #[arg(long)]
        max_lines: Option<usize>,

        /// Print schema and diagnostics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Sample a directory, write a dashboard and optionally register the job.
    Generate {
        #[arg(long)]
        dir: PathBuf,

        /// Job name; defaults to the directory name.
        #[arg(long)]
        job: Option<String>,

        /// Extra label, repeatable: --label env=prod
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Comma-separated field names, `all` or `none`.
        #[arg(long, default_value = "all")]
        fields: String,

        #[arg(long)]
        title: Option<String>,

        /// Output file; defaults to a name derived from the title.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,

        /// Write the panel model instead of Grafana JSON.
        #[arg(long)]
        raw: bool,

        /// Promtail config to add the job to.
        #[arg(long)]
        promtail_config: Option<PathBuf>,

        /// Glob collected by the job; defaults to <dir>/**/*.log.
        #[arg(long)]
        path_pattern: Option<String>,

        #[arg(long)]
        max_files: Option<usize>,

        #[arg(long)]
        max_lines: Option<usize>,
    },

    /// Add or replace one job in a Promtail config.
    AddJob {
        #[arg(long)]
        promtail_config: PathBuf,

        #[arg(long)]
        job: String,

        #[arg(long)]
        path: String,

        #[arg(long = "label")]
        labels: Vec<String>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "lokidash=debug" } else { "lokidash=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut settings = Settings::load(args.config.as_deref())?;

    match args.cmd {
        Commands::Inspect {
            dir,
            max_files,
            max_lines,
            json,
        } => {
            cli::override_limits(&mut settings, max_files, max_lines)?;
            cli::inspect(&settings, &dir, json)?;
        }
        Commands::Generate {
            dir,
            job,
            labels,
            fields,
            title,
            out,
            raw,
            promtail_config,
            path_pattern,
            max_files,
            max_lines,
        } => {
            cli::override_limits(&mut settings, max_files, max_lines)?;
            cli::generate(
                &settings,
                cli::GenerateArgs {
                    dir,
                    job,
                    labels,
                    fields,
                    title,
                    out,
                    raw,
                    promtail_config,
                    path_pattern,
                },
            )?;
        }
        Commands::AddJob {
            promtail_config,
            job,
            path,
            labels,
        } => {
            cli::add_job(&promtail_config, &job, &path, &labels)?;
        }
    }

    Ok(())
}
