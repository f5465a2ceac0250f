use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use fishlog_core::metrics::format_percentage;
use fishlog_core::model::{BAIT_TYPES, WATER_TYPES};
use fishlog_core::sort::SortKey;
use services::{SessionTable, TrackerService};
use storage::csv_io::{ExportColumns, ImportMapping, read_headers};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    InvalidSortKey { raw: String },
    InvalidSessionsDir { raw: String },
    MissingColumns,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSortKey { raw } => write!(f, "invalid --sort value: {raw}"),
            ArgsError::InvalidSessionsDir { raw } => {
                write!(f, "invalid --sessions-dir value: {raw:?}")
            }
            ArgsError::MissingColumns => write!(
                f,
                "could not match name/count columns; pass --name-col and --count-col"
            ),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app list");
    eprintln!("  app summary <session> [--sort <key>]... [--json]");
    eprintln!("  app combine <session>... --out <name>");
    eprintln!("  app compare <session>... [--json]        # up to 3");
    eprintln!("  app import  <file.csv> --out <name> [--name-col H] [--count-col H] [--missed-col H]");
    eprintln!("                         [--water <type>] [--bait <type>]");
    eprintln!("  app export  <session> <file.csv> [--name-col H] [--count-col H] [--missed-col H]");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --sessions-dir <dir>   (default: ./sessions)");
    eprintln!();
    eprintln!("Sort keys:");
    eprintln!("  name, count, missed, percentage, numberSeen, catchPercentage, seenPercentage");
    eprintln!("  Repeating a key flips its direction.");
    eprintln!();
    eprintln!("Suggested types:");
    eprintln!("  water: {}", WATER_TYPES.join(", "));
    eprintln!("  bait:  {}", BAIT_TYPES.join(", "));
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FISHLOG_SESSIONS_DIR, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Summary,
    Combine,
    Compare,
    Import,
    Export,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "summary" => Some(Self::Summary),
            "combine" => Some(Self::Combine),
            "compare" => Some(Self::Compare),
            "import" => Some(Self::Import),
            "export" => Some(Self::Export),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct ColumnFlags {
    name: Option<String>,
    count: Option<String>,
    missed: Option<String>,
}

#[derive(Debug)]
struct Args {
    sessions_dir: PathBuf,
    positional: Vec<String>,
    out: Option<String>,
    sort: Vec<SortKey>,
    columns: ColumnFlags,
    water: Option<String>,
    bait: Option<String>,
    json: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut sessions_dir = std::env::var("FISHLOG_SESSIONS_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("sessions"), PathBuf::from);
        let mut parsed = Self {
            sessions_dir: PathBuf::new(),
            positional: Vec::new(),
            out: None,
            sort: Vec::new(),
            columns: ColumnFlags::default(),
            water: None,
            bait: None,
            json: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--sessions-dir" => {
                    let value = require_value(args, "--sessions-dir")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidSessionsDir { raw: value });
                    }
                    sessions_dir = PathBuf::from(value);
                }
                "--out" => parsed.out = Some(require_value(args, "--out")?),
                "--sort" => {
                    let value = require_value(args, "--sort")?;
                    let key = value
                        .parse::<SortKey>()
                        .map_err(|_| ArgsError::InvalidSortKey { raw: value.clone() })?;
                    parsed.sort.push(key);
                }
                "--name-col" => parsed.columns.name = Some(require_value(args, "--name-col")?),
                "--count-col" => parsed.columns.count = Some(require_value(args, "--count-col")?),
                "--missed-col" => {
                    parsed.columns.missed = Some(require_value(args, "--missed-col")?);
                }
                "--water" => parsed.water = Some(require_value(args, "--water")?),
                "--bait" => parsed.bait = Some(require_value(args, "--bait")?),
                "--json" => parsed.json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => parsed.positional.push(arg),
            }
        }

        parsed.sessions_dir = sessions_dir;
        Ok(parsed)
    }

    fn out(&self) -> Result<&str, ArgsError> {
        self.out
            .as_deref()
            .ok_or(ArgsError::MissingArgument { what: "--out <name>" })
    }

    fn positional(&self, idx: usize, what: &'static str) -> Result<&str, ArgsError> {
        self.positional
            .get(idx)
            .map(String::as_str)
            .ok_or(ArgsError::MissingArgument { what })
    }

    fn export_columns(&self) -> Result<ExportColumns, Box<dyn std::error::Error>> {
        let defaults = ExportColumns::default();
        let columns = ExportColumns::new(
            self.columns.name.as_deref().unwrap_or(defaults.name()),
            self.columns.count.as_deref().unwrap_or(defaults.count()),
            self.columns.missed.as_deref().unwrap_or(defaults.missed()),
        )?;
        Ok(columns)
    }

    /// Explicit column flags win; anything left unset is auto-detected.
    fn import_mapping(&self, headers: &[String]) -> Result<ImportMapping, ArgsError> {
        let detected = ImportMapping::auto_detect(headers);
        let name = self
            .columns
            .name
            .clone()
            .or_else(|| detected.as_ref().map(|m| m.name.clone()))
            .ok_or(ArgsError::MissingColumns)?;
        let count = self
            .columns
            .count
            .clone()
            .or_else(|| detected.as_ref().map(|m| m.count.clone()))
            .ok_or(ArgsError::MissingColumns)?;
        let missed = self
            .columns
            .missed
            .clone()
            .or_else(|| detected.and_then(|m| m.missed));
        Ok(ImportMapping::new(name, count, missed))
    }
}

fn print_table(label: &str, table: &SessionTable) {
    println!("{label}");
    println!("  water: {}  bait: {}", table.water_type, table.bait_type);
    println!(
        "  {:<20} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}",
        "fish", "count", "missed", "seen", "%", "catch %", "seen %"
    );
    for row in &table.rows {
        println!(
            "  {:<20} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}",
            row.name,
            row.count,
            row.missed,
            row.number_seen,
            format_percentage(row.percentage),
            format_percentage(row.catch_percentage),
            format_percentage(row.seen_percentage),
        );
    }
    println!(
        "  {:<20} {:>6} {:>6} {:>6} {:>9} {:>9} {:>9}",
        "Total", table.totals.caught, table.totals.missed, table.totals.seen, "-----", "-----", "-----"
    );
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let mut iter = argv.into_iter().skip(1);
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    tracing::debug!(?cmd, ?parsed, "parsed arguments");

    // Storage is opened in the binary glue so core/services stay free of paths.
    let storage = Storage::json_dir(&parsed.sessions_dir)?;
    let mut tracker = TrackerService::new(Arc::clone(&storage.sessions));

    match cmd {
        Command::List => {
            for name in tracker.saved_sessions()? {
                println!("{name}");
            }
        }
        Command::Summary => {
            let name = parsed.positional(0, "<session>")?;
            tracker.load(name)?;
            for key in &parsed.sort {
                tracker.sort(*key);
            }
            let table = tracker.table();
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_table(name, &table);
            }
        }
        Command::Combine => {
            let out = parsed.out()?;
            if parsed.positional.is_empty() {
                return Err(ArgsError::MissingArgument { what: "<session>..." }.into());
            }
            let names: Vec<&str> = parsed.positional.iter().map(String::as_str).collect();
            tracker.combine(&names)?;
            tracker.save(out)?;
            print_table(out, &tracker.table());
        }
        Command::Compare => {
            let names: Vec<&str> = parsed.positional.iter().map(String::as_str).collect();
            let comparison = tracker.compare(&names)?;
            if parsed.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                for compared in &comparison.sessions {
                    print_table(&compared.label, &compared.table);
                    println!();
                }
            }
        }
        Command::Import => {
            let path = parsed.positional(0, "<file.csv>")?;
            let out = parsed.out()?;
            let headers = read_headers(File::open(path)?)?;
            let mapping = parsed.import_mapping(&headers)?;
            let summary = tracker.import_csv(File::open(path)?, &mapping)?;
            for failure in &summary.skipped {
                eprintln!("skipped {failure}");
            }
            if let Some(water) = parsed.water.as_deref() {
                tracker.set_water_type(water);
            }
            if let Some(bait) = parsed.bait.as_deref() {
                tracker.set_bait_type(bait);
            }
            tracker.save(out)?;
            println!(
                "imported {} records into {out} ({} rows skipped)",
                summary.records,
                summary.skipped.len()
            );
        }
        Command::Export => {
            let name = parsed.positional(0, "<session>")?;
            let path = parsed.positional(1, "<file.csv>")?;
            // Validate column names before touching the output file.
            let columns = parsed.export_columns()?;
            tracker.load(name)?;
            let mut writer = BufWriter::new(File::create(path)?);
            tracker.export_csv(&mut writer, &columns)?;
            writer.flush()?;
            println!("exported {} records to {path}", tracker.store().len());
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
