use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use trackmeta::config::AppConfig;
use trackmeta::db::Database;
use trackmeta::db::models::{TrackRecord, TrackSummary};

#[derive(Parser)]
#[command(name = "trackmeta", version, about = "A tool to manipulate a genomic track metadata DB")]
struct Cli {
    /// Verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Append log lines to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Directory holding the database files
    #[arg(long, global = true)]
    db_dir: Option<PathBuf>,

    /// Exit with an error status when the operation fails
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create database and tables
    Createdb {
        /// The DB name
        #[arg(long)]
        db: String,
    },

    /// Insert data on tables
    Insert {
        /// The DB name
        #[arg(long)]
        db: String,

        /// Comma-delimited file with the data to be inserted
        #[arg(long)]
        file: PathBuf,
    },

    /// Select fields from the DB
    Select {
        /// The DB name
        #[arg(long)]
        db: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        selector: Selector,
    },

    /// Update a field in the DB
    Update {
        /// The DB name
        #[arg(long)]
        db: String,

        #[command(flatten)]
        change: UpdateArgs,
    },

    /// Delete rows from the DB
    Delete {
        /// The DB name
        #[arg(long)]
        db: String,

        /// Delete all records with this track_name
        #[arg(long)]
        trackname: String,
    },
}

impl Commands {
    fn db_name(&self) -> &str {
        match self {
            Self::Createdb { db }
            | Self::Insert { db, .. }
            | Self::Select { db, .. }
            | Self::Update { db, .. }
            | Self::Delete { db, .. } => db,
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Selector {
    /// Select all cell types
    #[arg(long)]
    celltype: bool,

    /// Select track name, type and density for tracks of an assay
    #[arg(long, value_name = "ASSAY")]
    tracks: Option<String>,

    /// Select all track names associated with an assay_track_name
    #[arg(long, value_name = "ASSAY_TRACK_NAME")]
    trackname: Option<String>,

    /// Select all cell types associated with an assay (empty = all assays)
    #[arg(long, value_name = "ASSAY")]
    ca: Option<String>,

    /// Select every field of the records with a track_name
    #[arg(long, value_name = "TRACK_NAME")]
    record: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("field").required(true).args(["assay", "donor"])))]
struct UpdateArgs {
    /// Name of the assay to be updated
    #[arg(long, requires = "assaynew", conflicts_with_all = ["donor", "donornew"])]
    assay: Option<String>,

    /// Name of the new assay
    #[arg(long, requires = "assay")]
    assaynew: Option<String>,

    /// Name of the donor to be updated
    #[arg(long, requires = "donornew")]
    donor: Option<String>,

    /// Name of the new donor
    #[arg(long, requires = "donor")]
    donornew: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config file (optional, defaults if missing). A bad file is
    // reported after the logger is up.
    let (config, config_err) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // CLI > config
    let log_file = cli.log_file.clone().or(config.log_file.clone());
    init_logging(cli.verbose, log_file.as_deref())?;
    if let Some(e) = config_err {
        log::warn!("{e}. Using defaults.");
    }
    log::debug!("Config: {config:?}");

    let strict = cli.strict || config.strict;
    let db_dir = cli.db_dir.clone().or(config.db_dir.clone());

    let stdout = std::io::stdout();
    let result = run(cli.command, db_dir.as_deref(), config.busy_timeout(), &mut stdout.lock());
    settle(result, strict)
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.format_timestamp(None);
        }
    }

    builder.init();
    Ok(())
}

/// Apply the exit policy: failures propagate only in strict mode, otherwise
/// they are logged and the process exits 0.
fn settle(result: Result<()>, strict: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if strict => Err(e),
        Err(e) => {
            log::error!("{e:#}");
            Ok(())
        }
    }
}

fn run(
    command: Commands,
    db_dir: Option<&Path>,
    busy_timeout: Duration,
    out: &mut impl Write,
) -> Result<()> {
    // Input is validated before the database file is touched
    let records = match &command {
        Commands::Insert { file, .. } => Some(
            trackmeta::ingest::read_records(file)
                .with_context(|| format!("Failed to read {}", file.display()))?,
        ),
        _ => None,
    };

    let db = Database::open(command.db_name(), db_dir, busy_timeout)
        .context("Failed to open database")?;

    match command {
        Commands::Createdb { db: name } => {
            db.create_table().context("Create failed")?;
            writeln!(out, "Table ChipSeqTable ready in database {name}")?;
        }

        Commands::Insert { .. } => {
            let records = records.unwrap_or_default();
            let inserted = db.insert_records(&records).context("Insert failed")?;
            let total = db.count_rows().context("Count failed")?;
            writeln!(out, "Insert complete: {inserted} records inserted, {total} rows in table")?;
        }

        Commands::Select { json, selector, .. } => select(&db, selector, json, out)?,

        Commands::Update { change, .. } => match change {
            UpdateArgs { assay: Some(old), assaynew: Some(new), .. } => {
                let changed = db.update_assay(&old, &new).context("Update failed")?;
                writeln!(out, "Update complete: assay {old} -> {new} on {changed} rows")?;
            }
            UpdateArgs { donor: Some(old), donornew: Some(new), .. } => {
                let changed = db.update_donor(&old, &new).context("Update failed")?;
                writeln!(out, "Update complete: donor {old} -> {new} on {changed} rows")?;
            }
            _ => anyhow::bail!("Pass either --assay with --assaynew or --donor with --donornew"),
        },

        Commands::Delete { trackname, .. } => {
            let deleted = db.delete_track_name(&trackname).context("Delete failed")?;
            let total = db.count_rows().context("Count failed")?;
            writeln!(out, "Delete complete: {deleted} rows removed, {total} rows remain")?;
        }
    }

    Ok(())
}

fn select(db: &Database, selector: Selector, json: bool, out: &mut impl Write) -> Result<()> {
    let Selector { celltype, tracks, trackname, ca, record } = selector;

    if celltype {
        let cell_types = db.select_cell_types(None).context("Select failed")?;
        if json {
            return print_json(out, &cell_types);
        }
        for cell_type in &cell_types {
            writeln!(out, "{cell_type}")?;
        }
    } else if let Some(assay) = tracks {
        let tracks = db.select_tracks(&assay).context("Select failed")?;
        if json {
            return print_json(out, &tracks);
        }
        print_tracks(out, &tracks)?;
    } else if let Some(assay) = ca {
        let filter = Some(assay.as_str()).filter(|a| !a.is_empty());
        let cell_types = db.select_cell_types(filter).context("Select failed")?;
        if json {
            return print_json(out, &cell_types);
        }
        print_column(out, "Cell Type", &cell_types)?;
    } else if let Some(assay_track_name) = trackname {
        let names = db.select_track_names(&assay_track_name).context("Select failed")?;
        if json {
            return print_json(out, &names);
        }
        print_column(out, "Track Name", &names)?;
    } else if let Some(track_name) = record {
        let records = db.select_records(&track_name).context("Select failed")?;
        if json {
            return print_json(out, &records);
        }
        print_records(out, &records)?;
    } else {
        anyhow::bail!("Pass one of --celltype, --tracks, --trackname, --ca or --record");
    }

    Ok(())
}

fn print_json<T: Serialize>(out: &mut impl Write, rows: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)?;
    Ok(())
}

/// Print a single-column table.
fn print_column(out: &mut impl Write, header: &str, values: &[String]) -> std::io::Result<()> {
    writeln!(out, "\n| {header}")?;
    for v in values {
        writeln!(out, "| {v}")?;
    }
    Ok(())
}

fn print_tracks(out: &mut impl Write, tracks: &[TrackSummary]) -> std::io::Result<()> {
    writeln!(out, "\n| track_name\t| track_type\t| track_density")?;
    for t in tracks {
        writeln!(out, "| {}\t| {}\t| {}", t.track_name, t.track_type, t.track_density)?;
    }
    Ok(())
}

fn print_records(out: &mut impl Write, records: &[TrackRecord]) -> std::io::Result<()> {
    writeln!(out, "\n| {}", TrackRecord::COLUMNS.join("\t| "))?;
    for r in records {
        writeln!(out, "| {}", r.values().join("\t| "))?;
    }
    Ok(())
}
