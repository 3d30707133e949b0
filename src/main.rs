use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use sxi::index::suffix_array::read_meta;
use sxi::index::{IndexConfig, IndexWriter, RecordIndexBuilder};
use sxi::output::{self, PrintOptions};
use sxi::utils::{directives_for, progress, setup_logging};
use sxi::{RecordIndex, RecordQuery, SuffixArrayIndex};
use tracing::info;

#[derive(Parser)]
#[command(name = "sxi")]
#[command(about = "Compressed, queryable record index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Prefix each printed record with its position in the results
    #[arg(short, long, global = true)]
    number: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from delimited records
    Build {
        /// Input file ("-" reads stdin)
        input: PathBuf,

        /// Directory to write the index into
        #[arg(short, long)]
        output: PathBuf,

        /// Record delimiter byte (single ASCII character)
        #[arg(short, long, default_value = "\\n")]
        delimiter: String,

        /// Largest accepted record, in bytes
        #[arg(long)]
        max_record_size: Option<u64>,
    },
    /// Print a record by id
    Get {
        /// Index directory
        index: PathBuf,
        /// Record id
        #[arg(allow_hyphen_values = true)]
        id: i64,
    },
    /// Records containing a pattern
    Search {
        /// Index directory
        index: PathBuf,
        /// Pattern to search for
        pattern: String,

        /// Only print the number of matching records
        #[arg(short, long)]
        count: bool,

        /// Print record ids instead of records
        #[arg(long)]
        ids: bool,
    },
    /// Records containing anything lexicographically between two patterns
    Range {
        /// Index directory
        index: PathBuf,
        begin: String,
        end: String,
    },
    /// Records containing a regex match
    Regex {
        /// Index directory
        index: PathBuf,
        pattern: String,
    },
    /// Records matching every query (search:<p> or range:<begin>:<end>)
    Multi {
        /// Index directory
        index: PathBuf,

        #[arg(short = 'q', long = "query", required = true)]
        queries: Vec<String>,
    },
    /// Extract a slice of every record
    Extract {
        /// Index directory
        index: PathBuf,

        /// Bytes to skip at the start of each record
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Maximum bytes per record
        #[arg(long)]
        length: usize,
    },
    /// Show index statistics
    Stats {
        /// Index directory
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(directives_for(cli.verbose));

    let color = !cli.no_color;
    let options = PrintOptions { number: cli.number };
    let mut out = output::stdout(color);

    match cli.command {
        Commands::Build {
            input,
            output: dir,
            delimiter,
            max_record_size,
        } => {
            let mut config = IndexConfig {
                delimiter: parse_delimiter(&delimiter)?,
                ..IndexConfig::default()
            };
            if let Some(size) = max_record_size {
                config.max_record_size = size;
            }
            build_index(&input, &dir, config)?;
        }
        Commands::Get { index, id } => {
            let index = open_index(&index)?;
            let record = index
                .get_record(id)
                .with_context(|| format!("Failed to read record {}", id))?;
            output::print_records(&mut out, &[record], None, options)?;
        }
        Commands::Search {
            index,
            pattern,
            count,
            ids,
        } => {
            let index = open_index(&index)?;
            let pattern = pattern.as_bytes();
            if count {
                output::print_field(&mut out, "records", index.record_count(pattern))?;
            } else if ids {
                output::print_ids(&mut out, &index.record_search_ids(pattern))?;
            } else {
                let records = index.record_search(pattern)?;
                output::print_records(&mut out, &records, Some(pattern), options)?;
            }
        }
        Commands::Range { index, begin, end } => {
            let index = open_index(&index)?;
            let records = index.record_range_search(begin.as_bytes(), end.as_bytes())?;
            output::print_records(&mut out, &records, None, options)?;
        }
        Commands::Regex { index, pattern } => {
            let index = open_index(&index)?;
            let records = index
                .record_search_regex(&pattern)
                .with_context(|| format!("Regex search failed for {:?}", pattern))?;
            output::print_records(&mut out, &records, None, options)?;
        }
        Commands::Multi { index, queries } => {
            let index = open_index(&index)?;
            let queries = queries
                .iter()
                .map(|q| q.parse::<RecordQuery>())
                .collect::<sxi::Result<Vec<_>>>()?;
            let records = index.multi_search(&queries)?;
            output::print_records(&mut out, &records, None, options)?;
        }
        Commands::Extract {
            index,
            offset,
            length,
        } => {
            let index = open_index(&index)?;
            let records = index.extract_records(offset, length)?;
            output::print_records(&mut out, &records, None, options)?;
        }
        Commands::Stats { index } => {
            let meta = read_meta(&index)
                .with_context(|| format!("Failed to read index metadata in {}", index.display()))?;
            output::print_field(&mut out, "Index", index.display())?;
            output::print_field(&mut out, "Format version", meta.version)?;
            output::print_field(&mut out, "Records", meta.record_count)?;
            output::print_field(&mut out, "Text size", format_bytes(meta.text_size))?;
            output::print_field(&mut out, "Suffixes", meta.suffix_count)?;
            output::print_field(&mut out, "Delimiter", format!("{:?}", meta.config.delimiter as char))?;
        }
    }

    Ok(())
}

fn open_index(dir: &Path) -> Result<RecordIndex<SuffixArrayIndex>> {
    RecordIndex::open(dir).with_context(|| format!("Failed to open index at {}", dir.display()))
}

fn parse_delimiter(s: &str) -> Result<u8> {
    let unescaped = match s {
        "\\n" => "\n",
        "\\t" => "\t",
        other => other,
    };
    match unescaped.as_bytes() {
        [b] => Ok(*b),
        _ => bail!("Delimiter must be a single byte, got {:?}", s),
    }
}

fn build_index(input: &Path, dir: &Path, config: IndexConfig) -> Result<()> {
    let start = std::time::Instant::now();
    let data = read_input(input)?;

    let mut builder = RecordIndexBuilder::new(config);
    let bar = progress::byte_bar(data.len() as u64);
    builder
        .add_delimited(&data)
        .with_context(|| format!("Failed to load records from {}", input.display()))?;
    bar.inc(data.len() as u64);
    bar.finish_and_clear();

    let spinner = progress::spinner("Sorting suffixes...");
    let built = builder.build().context("Failed to build index")?;
    spinner.set_message("Writing index...");
    IndexWriter::write(dir, &built)
        .with_context(|| format!("Failed to write index to {}", dir.display()))?;
    spinner.finish_and_clear();

    let meta = built.meta();
    info!(
        records = meta.record_count,
        text_size = meta.text_size,
        elapsed = ?start.elapsed(),
        "index built"
    );
    eprintln!(
        "Indexed {} records ({}) in {:.2?}",
        meta.record_count,
        format_bytes(meta.text_size),
        start.elapsed()
    );
    Ok(())
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    if input == Path::new("-") {
        std::io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read stdin")?;
    } else {
        data = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
    }
    Ok(data)
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
