use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use paramcmp::io::dataset_read::{DEFAULT_DELIMITER, LoadOptions};
use paramcmp::io::excel_write::DEFAULT_REPORT_NAME;
use paramcmp::model::{Group, SYSTEM_A_TAG, SYSTEM_B_TAG, SourceTags};
use paramcmp::{Dataset, Result, ToolError, logging, sync};
use serde::Serialize;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init(cli.verbose) {
        eprintln!("error: {error}");
    }
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Summary(args) => {
            let dataset = args.load()?;
            print_json(&sync::summary(&dataset))
        }
        Command::List(args) => {
            let dataset = args.source.load()?;
            print_json(&sync::group_listing(&dataset, args.group.into()))
        }
        Command::Inspect(args) => {
            let dataset = args.source.load()?;
            let selection = sync::inspect(&dataset, args.group.into(), &args.code, args.compare)?;
            print_json(&selection)
        }
        Command::Export(args) => {
            let dataset = args.source.load()?;
            sync::export_report(&dataset, &args.output)?;
            println!("{}", args.output.display());
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compare the general parameters configured in TiCares and SFERE."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count the parameter codes of each group.
    Summary(SourceArgs),
    /// List the parameters of a group, sorted by code.
    List(ListArgs),
    /// Show the per-location rows of one parameter.
    Inspect(InspectArgs),
    /// Write the full comparison report as an Excel workbook.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Dataset file (CSV or Excel workbook).
    #[arg(long)]
    input: PathBuf,

    /// CSV field delimiter.
    #[arg(long, default_value_t = DEFAULT_DELIMITER as char)]
    delimiter: char,

    /// Worksheet to read when the input is a workbook.
    #[arg(long)]
    sheet: Option<String>,

    /// Source tag identifying TiCares rows.
    #[arg(long, default_value = SYSTEM_A_TAG)]
    source_a_tag: String,

    /// Source tag identifying SFERE rows.
    #[arg(long, default_value = SYSTEM_B_TAG)]
    source_b_tag: String,
}

impl SourceArgs {
    fn options(&self) -> Result<LoadOptions> {
        let delimiter = u8::try_from(self.delimiter).map_err(|_| {
            ToolError::InvalidDataset(format!(
                "delimiter '{}' is not a single-byte character",
                self.delimiter
            ))
        })?;

        Ok(LoadOptions {
            delimiter,
            sheet: self.sheet.clone(),
            tags: SourceTags::new(&self.source_a_tag, &self.source_b_tag),
        })
    }

    fn load(&self) -> Result<Dataset> {
        Dataset::load(&self.input, &self.options()?)
    }
}

#[derive(clap::Args)]
struct ListArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Group of parameters to list.
    #[arg(long, value_enum)]
    group: GroupArg,
}

#[derive(clap::Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Group the parameter is selected from.
    #[arg(long, value_enum)]
    group: GroupArg,

    /// Parameter code.
    #[arg(long)]
    code: String,

    /// Join both systems' rows and flag the matching ones.
    #[arg(long)]
    compare: bool,
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output workbook path.
    #[arg(long, default_value = DEFAULT_REPORT_NAME)]
    output: PathBuf,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GroupArg {
    OnlyA,
    Both,
    OnlyB,
}

impl From<GroupArg> for Group {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::OnlyA => Group::OnlyA,
            GroupArg::Both => Group::Both,
            GroupArg::OnlyB => Group::OnlyB,
        }
    }
}
