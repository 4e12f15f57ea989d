//! regroup CLI - Group JSON/CSV records by a field value
//!
//! # Main Commands
//!
//! ```bash
//! regroup group input.json --field category      # Group records
//! regroup group input.csv --field user.country --sort asc --count
//! regroup serve                                  # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! regroup parse input.csv                        # Just parse CSV to JSON
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use regroup::{
    group_file, parse_csv_file_auto, GroupConfig, GroupReport, MissingValuePolicy, SortGroups,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "regroup")]
#[command(about = "Group JSON records by the value of a (possibly nested) field", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output JSON records
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Group records from a JSON or CSV file
    Group {
        /// Input file (.json array or .csv)
        input: PathBuf,

        /// Field to group by, dot-separated for nested fields
        #[arg(short, long, required_unless_present = "config")]
        field: Option<String>,

        /// Load the full grouping configuration from a JSON file
        /// (overrides all other grouping flags)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Name of the output field holding the member array
        #[arg(long, default_value = "items")]
        output_field: String,

        /// Do not embed the group key in output records
        #[arg(long)]
        no_group_key: bool,

        /// Treat the field name as a single literal key (no dot notation)
        #[arg(long)]
        disable_dot_notation: bool,

        /// How to handle records whose field is absent or null
        #[arg(long, value_enum, default_value = "skip")]
        missing: MissingArg,

        /// Emission order of the groups
        #[arg(long, value_enum, default_value = "none")]
        sort: SortArg,

        /// Add a member-count field to each group
        #[arg(long)]
        count: bool,

        /// Name of the member-count field
        #[arg(long, default_value = "itemCount")]
        count_field: String,

        /// Also write member lineage (input indices per group) to a file
        #[arg(long)]
        lineage: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: $REGROUP_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// CLI spelling of the missing-value policy.
#[derive(Clone, Copy, ValueEnum)]
enum MissingArg {
    /// Drop the record from all groups
    Skip,
    /// Group under the literal key "undefined"
    Undefined,
    /// Group under the literal key "null"
    Null,
    /// Group under the empty key ""
    Empty,
}

impl From<MissingArg> for MissingValuePolicy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::Skip => MissingValuePolicy::Skip,
            MissingArg::Undefined => MissingValuePolicy::GroupUndefined,
            MissingArg::Null => MissingValuePolicy::GroupNull,
            MissingArg::Empty => MissingValuePolicy::GroupEmpty,
        }
    }
}

/// CLI spelling of the sort mode.
#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    /// First-seen insertion order
    None,
    /// Ascending by group key
    Asc,
    /// Descending by group key
    Desc,
}

impl From<SortArg> for SortGroups {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortGroups::None,
            SortArg::Asc => SortGroups::Asc,
            SortArg::Desc => SortGroups::Desc,
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Group {
            input,
            field,
            config,
            output_field,
            no_group_key,
            disable_dot_notation,
            missing,
            sort,
            count,
            count_field,
            lineage,
            output,
        } => {
            let config = match config {
                Some(path) => load_config(&path),
                None => {
                    // clap guarantees `field` is present here
                    let mut config = GroupConfig::new(field.unwrap_or_default());
                    config.output_field_name = output_field;
                    config.include_group_key = !no_group_key;
                    config.options.disable_dot_notation = disable_dot_notation;
                    config.options.handle_missing_values = missing.into();
                    config.options.sort_groups = sort.into();
                    config.options.include_item_count = count;
                    config.options.item_count_field_name = count_field;
                    Ok(config)
                }
            };

            config.and_then(|config| {
                cmd_group(&input, &config, lineage.as_deref(), output.as_deref())
            })
        }

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<GroupConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(GroupConfig::from_json(&content)?)
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        match result.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("Parsed {} records", result.records.len());

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_group(
    input: &Path,
    config: &GroupConfig,
    lineage_output: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Grouping: {}", input.display());

    let report = group_file(input, config)?;
    print_report(&report);

    let json = serde_json::to_string_pretty(&report.groups)?;
    write_output(&json, output)?;

    if let Some(path) = lineage_output {
        let lineage_json = serde_json::to_string_pretty(&report.lineage)?;
        fs::write(path, &lineage_json)?;
        eprintln!("Lineage written to: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &GroupReport) {
    if let Some(ref info) = report.csv_info {
        eprintln!("   Encoding: {}", info.encoding);
        eprintln!("   Rows: {}", info.row_count);
        eprintln!("   Columns: {}", info.headers.join(", "));
    }
    eprintln!("   Input records: {}", report.input_count);
    eprintln!("   Groups: {}", report.group_count);
    if report.skipped_count > 0 {
        eprintln!("   Skipped (missing field): {}", report.skipped_count);
    }
    for hint in &report.hints {
        eprintln!("   Hint: {}", hint);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = port
        .or_else(|| {
            std::env::var("REGROUP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
        })
        .unwrap_or(3000);

    regroup::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
