//! Command-line interface for the extractor.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_language, DEFAULT_DOC_TYPES, DEFAULT_LANGUAGE, EXCHANGE_RATES_URL};
use crate::error::{ExtractorError, Result};
use crate::http::create_client;
use crate::output::save_table;
use crate::pipeline::Pipeline;
use crate::schema::OutputSchema;

/// TED Extractor - Flatten TED procurement notices into tabular records.
#[derive(Parser)]
#[command(name = "ted-extractor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Flatten every notice under a data directory of daily packages.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory holding `<YYYYMMDD>_<suffix>` package directories
    pub data_dir: PathBuf,

    /// Form language to keep (default: EN)
    #[arg(short, long, conflicts_with = "all_languages")]
    pub language: Option<String>,

    /// Keep the forms of every language
    #[arg(long)]
    pub all_languages: bool,

    /// Output schema YAML file (default: built-in TED notice schema)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Exchange-rate endpoint
    #[arg(long, default_value = EXCHANGE_RATES_URL)]
    pub rates_url: String,

    /// Skip currency conversion
    #[arg(long)]
    pub no_currency: bool,

    /// Document type to keep; repeat for several (default: award, contract
    /// and additional-information notices)
    #[arg(long = "doc-type", conflicts_with = "all_doc_types")]
    pub doc_types: Vec<String>,

    /// Keep every document type
    #[arg(long)]
    pub all_doc_types: bool,

    /// Output directory (default: output/)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write one `date=<YYYYMMDD>` sub-directory per publication date
    #[arg(long)]
    pub partition_by_date: bool,
}

impl ExtractArgs {
    /// Language filter; `None` keeps every language.
    pub fn language_filter(&self) -> Result<Option<String>> {
        if self.all_languages {
            return Ok(None);
        }
        let language = self
            .language
            .clone()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        validate_language(&language)?;
        Ok(Some(language))
    }

    /// Document-type filter; `None` keeps every type.
    #[must_use]
    pub fn doc_type_filter(&self) -> Option<Vec<String>> {
        if self.all_doc_types {
            None
        } else if self.doc_types.is_empty() {
            Some(DEFAULT_DOC_TYPES.iter().map(|t| t.to_string()).collect())
        } else {
            Some(self.doc_types.clone())
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract(args) => extract_command(&args),
    }
}

/// Execute the extract command.
fn extract_command(args: &ExtractArgs) -> Result<()> {
    // Validate inputs before fetching rates
    let language = args.language_filter()?;
    ensure_dir(&args.data_dir, "Data directory")?;

    let schema = match &args.schema {
        Some(path) => OutputSchema::from_file(path)?,
        None => OutputSchema::ted_notice()?,
    };

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("output"));

    println!(
        "{} {} ({})",
        style("Extracting").bold(),
        style(args.data_dir.display()).cyan(),
        style(language.as_deref().unwrap_or("all languages")).green()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut pipeline = Pipeline::new(schema)
        .with_language(language)?
        .with_doc_types(args.doc_type_filter());

    if !args.no_currency {
        pb.set_message("Fetching exchange rates...");
        let client = match create_client() {
            Ok(client) => client,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };
        pipeline = pipeline.with_rates_from(&client, &args.rates_url);
    }

    pb.set_message("Flattening notices...");
    let table = match pipeline.run(&args.data_dir) {
        Ok(table) => table,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving records...");
    let paths = match save_table(&table, &output_dir, args.partition_by_date) {
        Ok(paths) => paths,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Documents: {}", table.documents);
    if let Some(rates) = pipeline.rates() {
        println!("  Exchange rates: {}", rates.len());
    }
    if table.skipped > 0 {
        println!("  Skipped (document type): {}", table.skipped);
    }
    println!("  Records: {}", style(table.len()).green());
    println!("  Columns: {}", table.columns.len());
    if !table.dropped_columns.is_empty() {
        println!("  Dropped empty columns: {}", table.dropped_columns.len());
    }
    if !table.warnings.is_empty() {
        println!("  Warnings: {}", style(table.warnings.len()).yellow().bold());
    }

    println!();
    for path in &paths {
        println!("{} {}", style("Saved to:").green().bold(), path.display());
    }

    Ok(())
}

fn ensure_dir(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        return Err(ExtractorError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{what} does not exist: {}", path.display()),
        )));
    }
    if !path.is_dir() {
        return Err(ExtractorError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{what} is not a directory: {}", path.display()),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> ExtractArgs {
        let mut argv = vec!["ted-extractor", "extract"];
        argv.extend_from_slice(args);
        let Commands::Extract(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn test_cli_parse_extract_defaults() {
        let args = parse(&["data"]);

        assert_eq!(args.data_dir, PathBuf::from("data"));
        assert_eq!(args.language_filter().unwrap(), Some("EN".to_string()));
        assert_eq!(args.rates_url, EXCHANGE_RATES_URL);
        assert!(!args.no_currency);
        assert!(!args.partition_by_date);
        assert_eq!(args.doc_type_filter().map(|t| t.len()), Some(3));
    }

    #[test]
    fn test_cli_parse_language_options() {
        assert_eq!(
            parse(&["data", "--language", "DE"]).language_filter().unwrap(),
            Some("DE".to_string())
        );
        assert_eq!(parse(&["data", "--all-languages"]).language_filter().unwrap(), None);
        assert!(parse(&["data", "-l", "german"]).language_filter().is_err());
    }

    #[test]
    fn test_cli_language_conflicts() {
        let result = Cli::try_parse_from([
            "ted-extractor",
            "extract",
            "data",
            "--language",
            "DE",
            "--all-languages",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_doc_types() {
        let args = parse(&[
            "data",
            "--doc-type",
            "Contract notice",
            "--doc-type",
            "Prior information notice",
        ]);
        assert_eq!(
            args.doc_type_filter(),
            Some(vec![
                "Contract notice".to_string(),
                "Prior information notice".to_string()
            ])
        );
        assert_eq!(parse(&["data", "--all-doc-types"]).doc_type_filter(), None);
    }

    #[test]
    fn test_cli_parse_output_options() {
        let args = parse(&[
            "data",
            "--output",
            "out",
            "--partition-by-date",
            "--no-currency",
            "--schema",
            "schema.yaml",
        ]);
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.schema, Some(PathBuf::from("schema.yaml")));
        assert!(args.partition_by_date);
        assert!(args.no_currency);
    }

    #[test]
    fn test_ensure_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_dir(&dir.path().join("missing"), "Data directory").is_err());
        assert!(ensure_dir(dir.path(), "Data directory").is_ok());
    }
}
