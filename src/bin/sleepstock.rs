//! CLI binary for managing the sleep-therapy machine inventory.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use sleepstock::editor::RecordDraft;
use sleepstock::error::InventoryError;
use sleepstock::export;
use sleepstock::inventory::{InventoryBlocking, StatusCounts};
use sleepstock::models::{
    MachineCategory, MachineModel, MachineRecord, MachineStatus, NaiveDate,
};
use sleepstock::query::{RecordQuery, SortMode, StatusFilter};
use sleepstock::recognition::RecognitionBlockingClient;
use sleepstock::storage::{BlockingStorage, FileStorage};

/// Environment variable name for the recognition API key.
const API_KEY_ENV: &str = "SLEEPSTOCK_API_KEY";

/// Placeholder for absent optional cells.
const EMPTY_CELL: &str = "\u{2014}";

/// Sleep-therapy machine inventory — track, search, and export units.
#[derive(Debug, Parser)]
#[command(name = "sleepstock", version, about)]
struct Cli {
    /// Override the storage directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Add a machine record; the serial can come from a label photo.
    Add(AddArgs),
    /// Edit an existing record, addressed by serial number.
    Edit(EditArgs),
    /// Remove a record, addressed by serial number.
    Remove {
        /// Serial number of the record to remove.
        serial: String,
    },
    /// List records, optionally filtered and sorted.
    List(FilterArgs),
    /// Show per-status record counts.
    Stats,
    /// Export the filtered view to a dated .xlsx workbook.
    Export(ExportArgs),
    /// Extract a serial number from a label photo.
    Recognize {
        /// Path to a JPEG photo of the machine label.
        image: PathBuf,
    },
}

/// Arguments for the `add` subcommand.
#[derive(Debug, Args)]
struct AddArgs {
    /// Serial number; omit it to recognize from --photo instead.
    #[arg(long)]
    serial: Option<String>,
    /// Label photo to extract the serial number from.
    #[arg(long, value_name = "FILE")]
    photo: Option<PathBuf>,
    /// Machine brand (f&p, philips, resmed).
    #[arg(long, value_parser = parse_model, default_value = "f&p")]
    model: MachineModel,
    /// Unit category (new, rental-pool).
    #[arg(long, value_parser = parse_category, default_value = "new")]
    category: MachineCategory,
    /// Status (in-stock, trial, rental, purchased).
    #[arg(long, value_parser = parse_status, default_value = "in-stock")]
    status: MachineStatus,
    /// Status effective date (YYYY-MM-DD, default: today).
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Patient name; required for trial/rental/purchased.
    #[arg(long)]
    patient: Option<String>,
    /// Patient contact phone.
    #[arg(long)]
    phone: Option<String>,
    /// Accessory handed out with the machine; repeatable.
    #[arg(long = "accessory", value_name = "NAME")]
    accessories: Vec<String>,
}

/// Arguments for the `edit` subcommand.
#[derive(Debug, Args)]
struct EditArgs {
    /// Serial number of the record to edit.
    serial: String,
    /// Replacement serial number.
    #[arg(long)]
    new_serial: Option<String>,
    /// New machine brand (f&p, philips, resmed).
    #[arg(long, value_parser = parse_model)]
    model: Option<MachineModel>,
    /// New unit category (new, rental-pool).
    #[arg(long, value_parser = parse_category)]
    category: Option<MachineCategory>,
    /// New status (in-stock, trial, rental, purchased).
    #[arg(long, value_parser = parse_status)]
    status: Option<MachineStatus>,
    /// New status effective date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// New patient name.
    #[arg(long)]
    patient: Option<String>,
    /// New patient contact phone.
    #[arg(long)]
    phone: Option<String>,
    /// Accessory to add; repeatable.
    #[arg(long = "add-accessory", value_name = "NAME")]
    add_accessories: Vec<String>,
    /// Accessory position to remove (0-based); repeatable.
    #[arg(long = "remove-accessory", value_name = "POS")]
    remove_accessories: Vec<usize>,
}

/// Filter and sort arguments shared by `list` and `export`.
#[derive(Debug, Args)]
struct FilterArgs {
    /// Search serial, patient, phone, or model text.
    #[arg(long)]
    search: Option<String>,
    /// Status filter (all, in-stock, trial, rental, purchased).
    #[arg(long, value_parser = parse_status_filter, default_value = "all")]
    status: StatusFilter,
    /// Start of the status-date range (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// End of the status-date range (inclusive, YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Sort mode (newest, serial, status, date).
    #[arg(long, value_parser = parse_sort, default_value = "newest")]
    sort: SortMode,
}

/// Arguments for the `export` subcommand.
#[derive(Debug, Args)]
struct ExportArgs {
    /// Filters applied before exporting.
    #[command(flatten)]
    filter: FilterArgs,
    /// Output directory for the workbook (default: current directory).
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

// ── Value parsers ────────────────────────────────────────────────────

/// Parses a date string in `YYYY-MM-DD` format for clap.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|err| format!("{err}"))
}

/// Parses a machine status for clap.
fn parse_status(s: &str) -> Result<MachineStatus, String> {
    match s.to_lowercase().as_str() {
        "in-stock" | "instock" | "stock" => Ok(MachineStatus::InStock),
        "trial" => Ok(MachineStatus::Trial),
        "rental" => Ok(MachineStatus::Rental),
        "purchased" => Ok(MachineStatus::Purchased),
        other => Err(format!("unknown status: {other}")),
    }
}

/// Parses a status filter (a status or `all`) for clap.
fn parse_status_filter(s: &str) -> Result<StatusFilter, String> {
    if s.eq_ignore_ascii_case("all") {
        Ok(StatusFilter::All)
    } else {
        parse_status(s).map(StatusFilter::Only)
    }
}

/// Parses a machine brand for clap.
fn parse_model(s: &str) -> Result<MachineModel, String> {
    match s.to_lowercase().as_str() {
        "f&p" | "fp" | "fisher-paykel" => Ok(MachineModel::FisherPaykel),
        "philips" => Ok(MachineModel::Philips),
        "resmed" => Ok(MachineModel::Resmed),
        other => Err(format!("unknown model: {other}")),
    }
}

/// Parses a unit category for clap.
fn parse_category(s: &str) -> Result<MachineCategory, String> {
    match s.to_lowercase().as_str() {
        "new" => Ok(MachineCategory::New),
        "rental-pool" | "rental-unit" | "rentalunit" => Ok(MachineCategory::RentalUnit),
        other => Err(format!("unknown category: {other}")),
    }
}

/// Parses a sort mode for clap.
fn parse_sort(s: &str) -> Result<SortMode, String> {
    match s.to_lowercase().as_str() {
        "newest" => Ok(SortMode::Newest),
        "serial" => Ok(SortMode::Serial),
        "status" => Ok(SortMode::Status),
        "date" => Ok(SortMode::Date),
        other => Err(format!("unknown sort mode: {other}")),
    }
}

// ── Startup ──────────────────────────────────────────────────────────

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to initialize storage: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut store = InventoryBlocking::new(storage);
    if let Err(err) = store.hydrate() {
        writeln!(
            io::stderr().lock(),
            "{} failed to load the inventory: {err}",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    }

    dispatch(&mut store, cli.command)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> sleepstock::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::Add(args) => cmd_add(store, args),
        Command::Edit(args) => cmd_edit(store, &args),
        Command::Remove { serial } => cmd_remove(store, &serial),
        Command::List(args) => cmd_list(store, &args),
        Command::Stats => cmd_stats(store),
        Command::Export(args) => cmd_export(store, &args),
        Command::Recognize { image } => cmd_recognize(&image),
    }
}

// ── Recognition helpers ──────────────────────────────────────────────

/// Builds the blocking recognition client from the environment.
fn build_recognizer() -> sleepstock::error::Result<RecognitionBlockingClient> {
    let key = std::env::var(API_KEY_ENV).unwrap_or_default();
    if key.is_empty() {
        return Err(InventoryError::MissingApiKey);
    }
    RecognitionBlockingClient::builder().api_key(key).build()
}

/// Runs recognition over a label photo, printing user-facing notices.
///
/// Returns `Ok(Some(serial))` on a match. Every failure path prints a
/// notice and returns `Ok(None)` — recognition is an optional
/// accelerator and manual entry must always remain available.
fn recognize_from_photo(photo: &Path) -> io::Result<Option<String>> {
    let image = match std::fs::read(photo) {
        Ok(image) => image,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to read {}: {err}",
                "error:".red().bold(),
                photo.display()
            )?;
            return Ok(None);
        }
    };

    let client = match build_recognizer() {
        Ok(client) => client,
        Err(err) => {
            let mut stderr = io::stderr().lock();
            writeln!(
                stderr,
                "{} recognition is unavailable: {err}",
                "error:".red().bold()
            )?;
            writeln!(
                stderr,
                "  {} set {} (a .env file works too) and retry, or enter the serial manually",
                "hint:".cyan(),
                API_KEY_ENV
            )?;
            return Ok(None);
        }
    };

    let spinner = make_spinner("Recognizing serial number...");
    let outcome = client.recognize_serial(&image);
    spinner.finish_and_clear();

    match outcome {
        Ok(Some(serial)) => {
            writeln!(
                io::stdout().lock(),
                "{} {serial}",
                "Recognized serial:".green().bold()
            )?;
            Ok(Some(serial))
        }
        Ok(None) => {
            writeln!(
                io::stderr().lock(),
                "{} no serial number found — make sure the label is sharp, or enter it manually",
                "note:".yellow().bold()
            )?;
            Ok(None)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} recognition failed: {err} — enter the serial manually",
                "error:".red().bold()
            )?;
            Ok(None)
        }
    }
}

// ── Subcommand handlers ──────────────────────────────────────────────

/// Executes the `add` subcommand.
fn cmd_add<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    args: AddArgs,
) -> io::Result<ExitCode> {
    let serial = match args.serial {
        Some(serial) => Some(serial),
        None => match args.photo.as_deref() {
            Some(photo) => recognize_from_photo(photo)?,
            None => None,
        },
    };
    let Some(serial) = serial else {
        writeln!(
            io::stderr().lock(),
            "{} provide --serial, or --photo to recognize one",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    };

    let mut draft = RecordDraft::new(args.date.unwrap_or_else(|| Local::now().date_naive()));
    draft.serial_number = serial;
    draft.model = args.model;
    draft.category = args.category;
    draft.status = args.status;
    draft.patient_name = args.patient.unwrap_or_default();
    draft.phone_number = args.phone.unwrap_or_default();
    for accessory in &args.accessories {
        if !draft.add_accessory(accessory) {
            writeln!(
                io::stderr().lock(),
                "{} accessory skipped (empty or duplicate): {accessory}",
                "note:".yellow().bold()
            )?;
        }
    }

    save_draft(store, &draft, "Added")
}

/// Executes the `edit` subcommand.
fn cmd_edit<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    args: &EditArgs,
) -> io::Result<ExitCode> {
    let Some(record) = store.find_by_serial(&args.serial).cloned() else {
        return report_unknown_serial(&args.serial);
    };

    let mut draft = RecordDraft::from_record(&record);
    if let Some(serial) = args.new_serial.as_ref() {
        draft.serial_number.clone_from(serial);
    }
    if let Some(model) = args.model {
        draft.model = model;
    }
    if let Some(category) = args.category {
        draft.category = category;
    }
    if let Some(status) = args.status {
        draft.status = status;
    }
    if let Some(date) = args.date {
        draft.status_date = date;
    }
    if let Some(patient) = args.patient.as_ref() {
        draft.patient_name.clone_from(patient);
    }
    if let Some(phone) = args.phone.as_ref() {
        draft.phone_number.clone_from(phone);
    }

    // Remove by position from the back so earlier removals don't shift
    // the positions still pending.
    let mut positions = args.remove_accessories.clone();
    positions.sort_unstable_by(|a, b| b.cmp(a));
    for position in positions {
        if draft.remove_accessory(position).is_none() {
            writeln!(
                io::stderr().lock(),
                "{} no accessory at position {position}",
                "note:".yellow().bold()
            )?;
        }
    }
    for accessory in &args.add_accessories {
        if !draft.add_accessory(accessory) {
            writeln!(
                io::stderr().lock(),
                "{} accessory skipped (empty or duplicate): {accessory}",
                "note:".yellow().bold()
            )?;
        }
    }

    save_draft(store, &draft, "Updated")
}

/// Validates a draft and writes it through the store, reporting the
/// outcome. The record count and prior state are untouched on failure.
fn save_draft<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    draft: &RecordDraft,
    verb: &str,
) -> io::Result<ExitCode> {
    let record = match draft.finish(Utc::now()) {
        Ok(record) => record,
        Err(err) => {
            writeln!(io::stderr().lock(), "{} {err}", "error:".red().bold())?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let serial = record.serial_number.clone();

    match store.upsert(record) {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {serial}",
                format_args!("{verb} record:").green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(io::stderr().lock(), "{} {err}", "error:".red().bold())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `remove` subcommand.
fn cmd_remove<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    serial: &str,
) -> io::Result<ExitCode> {
    let Some(id) = store.find_by_serial(serial).map(|record| record.id.clone()) else {
        return report_unknown_serial(serial);
    };

    match store.remove(&id) {
        Ok(_removed) => {
            writeln!(
                io::stdout().lock(),
                "{} {}",
                "Removed record:".green().bold(),
                serial.trim().to_uppercase()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to remove record: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Prints the unknown-serial error.
fn report_unknown_serial(serial: &str) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} no record with serial: {serial}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Executes the `list` subcommand.
fn cmd_list<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    args: &FilterArgs,
) -> io::Result<ExitCode> {
    let query = build_query(args);
    let view = store.query(&query);
    print_records_table(&view)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `stats` subcommand.
fn cmd_stats<S: BlockingStorage>(store: &mut InventoryBlocking<S>) -> io::Result<ExitCode> {
    print_stats_table(store.status_counts())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `export` subcommand.
fn cmd_export<S: BlockingStorage>(
    store: &mut InventoryBlocking<S>,
    args: &ExportArgs,
) -> io::Result<ExitCode> {
    let query = build_query(&args.filter);
    let view = store.query(&query);
    let out_dir = args.out.clone().unwrap_or_else(|| PathBuf::from("."));
    let path = out_dir.join(export::export_file_name(Local::now().date_naive()));

    match export::write_workbook(&view, &path) {
        Ok(()) => {
            writeln!(
                io::stdout().lock(),
                "{} {} {}",
                "Exported".green().bold(),
                format_args!("{} record(s) to", view.len()),
                path.display()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} export failed: {err}",
                "error:".red().bold()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `recognize` subcommand.
fn cmd_recognize(image: &Path) -> io::Result<ExitCode> {
    if recognize_from_photo(image)?.is_some() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Builds a [`RecordQuery`] from CLI filter arguments.
fn build_query(args: &FilterArgs) -> RecordQuery {
    let mut query = RecordQuery::new().status(args.status).sort(args.sort);
    if let Some(needle) = args.search.as_deref() {
        query = query.search(needle);
    }
    if let Some(from) = args.from {
        query = query.date_from(from);
    }
    if let Some(to) = args.to {
        query = query.date_to(to);
    }
    query
}

// ── Output formatting ────────────────────────────────────────────────

/// Maps a status to its table cell color.
const fn status_color(status: MachineStatus) -> Color {
    match status {
        MachineStatus::InStock => Color::Green,
        MachineStatus::Trial => Color::Yellow,
        MachineStatus::Rental => Color::Blue,
        MachineStatus::Purchased => Color::DarkGrey,
    }
}

/// Prints records in a table, or the empty-state line.
fn print_records_table(records: &[&MachineRecord]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if records.is_empty() {
        writeln!(
            out,
            "{}",
            "No machine records match the current filters.".dimmed()
        )?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Serial").fg(Color::Cyan),
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Patient").fg(Color::Cyan),
        Cell::new("Phone").fg(Color::Cyan),
        Cell::new("Accessories").fg(Color::Cyan),
        Cell::new("Updated").fg(Color::Cyan),
    ]);

    for record in records {
        let patient = record.patient_name.as_deref().unwrap_or(EMPTY_CELL);
        let phone = record.phone_number.as_deref().unwrap_or(EMPTY_CELL);
        let accessories = if record.accessories.is_empty() {
            EMPTY_CELL.to_owned()
        } else {
            record.accessories.join(", ")
        };
        _ = table.add_row(vec![
            Cell::new(&record.serial_number),
            Cell::new(record.model.label()),
            Cell::new(record.status.label()).fg(status_color(record.status)),
            Cell::new(record.status_date),
            Cell::new(patient),
            Cell::new(phone),
            Cell::new(accessories),
            Cell::new(record.last_updated.format("%Y-%m-%d %H:%M")),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Machines".green().bold(),
        format_args!("({})", records.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the per-status summary counts.
fn print_stats_table(counts: StatusCounts) -> io::Result<()> {
    let mut out = io::stdout().lock();

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Status").fg(Color::Cyan),
        Cell::new("Count").fg(Color::Cyan),
    ]);

    for status in MachineStatus::ALL {
        let count = counts.of(status);
        let count_cell = if count > 0 {
            Cell::new(count).fg(Color::Green)
        } else {
            Cell::new(count).fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![
            Cell::new(status.label()).fg(status_color(status)),
            count_cell,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Inventory".green().bold(),
        format_args!("({} total)", counts.total()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // Last-resort error output — if stderr itself failed, nothing
            // we can do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use sleepstock::storage::InMemoryStorage;

    /// Creates a hydrated store over in-memory storage.
    fn test_store() -> InventoryBlocking<InMemoryStorage> {
        let mut store = InventoryBlocking::new(InMemoryStorage::new());
        let _hydrated = store.hydrate().unwrap();
        store
    }

    /// Default `add` arguments for one serial.
    fn add_args(serial: &str) -> AddArgs {
        AddArgs {
            serial: Some(serial.to_owned()),
            photo: None,
            model: MachineModel::FisherPaykel,
            category: MachineCategory::New,
            status: MachineStatus::InStock,
            date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            patient: None,
            phone: None,
            accessories: Vec::new(),
        }
    }

    /// Default filter arguments (match everything).
    fn filter_args() -> FilterArgs {
        FilterArgs {
            search: None,
            status: StatusFilter::All,
            from: None,
            to: None,
            sort: SortMode::Newest,
        }
    }

    // ── Value parser tests ───────────────────────────────────────────

    #[test]
    fn parse_date_valid() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn parse_date_invalid() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("01-15-2024").is_err());
    }

    #[test]
    fn parse_status_variants() {
        assert_eq!(parse_status("in-stock").unwrap(), MachineStatus::InStock);
        assert_eq!(parse_status("Trial").unwrap(), MachineStatus::Trial);
        assert_eq!(parse_status("RENTAL").unwrap(), MachineStatus::Rental);
        assert_eq!(parse_status("purchased").unwrap(), MachineStatus::Purchased);
        assert!(parse_status("scrapped").is_err());
    }

    #[test]
    fn parse_status_filter_all_and_only() {
        assert_eq!(parse_status_filter("all").unwrap(), StatusFilter::All);
        assert_eq!(
            parse_status_filter("trial").unwrap(),
            StatusFilter::Only(MachineStatus::Trial)
        );
        assert!(parse_status_filter("bogus").is_err());
    }

    #[test]
    fn parse_model_variants() {
        assert_eq!(parse_model("f&p").unwrap(), MachineModel::FisherPaykel);
        assert_eq!(parse_model("FP").unwrap(), MachineModel::FisherPaykel);
        assert_eq!(parse_model("philips").unwrap(), MachineModel::Philips);
        assert_eq!(parse_model("Resmed").unwrap(), MachineModel::Resmed);
        assert!(parse_model("acme").is_err());
    }

    #[test]
    fn parse_category_variants() {
        assert_eq!(parse_category("new").unwrap(), MachineCategory::New);
        assert_eq!(
            parse_category("rental-pool").unwrap(),
            MachineCategory::RentalUnit
        );
        assert!(parse_category("used").is_err());
    }

    #[test]
    fn parse_sort_variants() {
        assert_eq!(parse_sort("newest").unwrap(), SortMode::Newest);
        assert_eq!(parse_sort("serial").unwrap(), SortMode::Serial);
        assert_eq!(parse_sort("status").unwrap(), SortMode::Status);
        assert_eq!(parse_sort("date").unwrap(), SortMode::Date);
        assert!(parse_sort("oldest").is_err());
    }

    // ── build_query tests ────────────────────────────────────────────

    #[test]
    fn build_query_defaults() {
        let query = build_query(&filter_args());
        assert!(query.search.is_none());
        assert_eq!(query.status, StatusFilter::All);
        assert_eq!(query.sort, SortMode::Newest);
    }

    #[test]
    fn build_query_with_all_filters() {
        let mut args = filter_args();
        args.search = Some("chen".to_owned());
        args.status = StatusFilter::Only(MachineStatus::Rental);
        args.from = Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        args.to = Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        args.sort = SortMode::Date;

        let query = build_query(&args);
        assert_eq!(query.search.as_deref(), Some("chen"));
        assert_eq!(query.status, StatusFilter::Only(MachineStatus::Rental));
        assert!(query.date_from.is_some());
        assert!(query.date_to.is_some());
        assert_eq!(query.sort, SortMode::Date);
    }

    // ── cmd_add tests ────────────────────────────────────────────────

    #[test]
    fn cmd_add_inserts_record() {
        let mut store = test_store();
        let code = cmd_add(&mut store, add_args("x9")).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(store.records().len(), 1);
        // Serial gets normalized on the way in.
        assert_eq!(store.records()[0].serial_number, "X9");
    }

    #[test]
    fn cmd_add_with_patient_info() {
        let mut store = test_store();
        let mut args = add_args("X9");
        args.status = MachineStatus::Rental;
        args.patient = Some("Chen".to_owned());
        args.phone = Some("0912".to_owned());

        let code = cmd_add(&mut store, args).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(store.records()[0].patient_name.as_deref(), Some("Chen"));
        assert_eq!(store.records()[0].phone_number.as_deref(), Some("0912"));
    }

    #[test]
    fn cmd_add_missing_patient_fails_and_keeps_state() {
        let mut store = test_store();
        let mut args = add_args("X9");
        args.status = MachineStatus::Trial;

        let code = cmd_add(&mut store, args).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(store.records().is_empty());
    }

    #[test]
    fn cmd_add_duplicate_serial_fails() {
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            cmd_add(&mut store, add_args("sn-1")).unwrap(),
            ExitCode::FAILURE
        );
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn cmd_add_without_serial_or_photo_fails() {
        let mut store = test_store();
        let mut args = add_args("unused");
        args.serial = None;

        let code = cmd_add(&mut store, args).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn cmd_add_collects_accessories() {
        let mut store = test_store();
        let mut args = add_args("X9");
        args.status = MachineStatus::Trial;
        args.patient = Some("Lin".to_owned());
        args.accessories = vec!["mask".to_owned(), "mask".to_owned(), "tube".to_owned()];

        let code = cmd_add(&mut store, args).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(store.records()[0].accessories, vec!["mask", "tube"]);
    }

    // ── cmd_edit tests ───────────────────────────────────────────────

    #[test]
    fn cmd_edit_updates_in_place() {
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            cmd_add(&mut store, add_args("SN-2")).unwrap(),
            ExitCode::SUCCESS
        );

        let args = EditArgs {
            serial: "sn-1".to_owned(),
            new_serial: None,
            model: Some(MachineModel::Resmed),
            category: None,
            status: Some(MachineStatus::Rental),
            date: None,
            patient: Some("Chen".to_owned()),
            phone: None,
            add_accessories: vec!["mask".to_owned()],
            remove_accessories: Vec::new(),
        };
        let code = cmd_edit(&mut store, &args).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        assert_eq!(store.records().len(), 2);
        // SN-1 was added first, so it still sits at the back.
        let record = &store.records()[1];
        assert_eq!(record.serial_number, "SN-1");
        assert_eq!(record.model, MachineModel::Resmed);
        assert_eq!(record.status, MachineStatus::Rental);
        assert_eq!(record.patient_name.as_deref(), Some("Chen"));
        assert_eq!(record.accessories, vec!["mask"]);
    }

    #[test]
    fn cmd_edit_unknown_serial_fails() {
        let mut store = test_store();
        let args = EditArgs {
            serial: "SN-404".to_owned(),
            new_serial: None,
            model: None,
            category: None,
            status: None,
            date: None,
            patient: None,
            phone: None,
            add_accessories: Vec::new(),
            remove_accessories: Vec::new(),
        };
        let code = cmd_edit(&mut store, &args).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn cmd_edit_missing_patient_keeps_record_intact() {
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );

        // Flip to trial without a patient name: rejected, untouched.
        let args = EditArgs {
            serial: "SN-1".to_owned(),
            new_serial: None,
            model: None,
            category: None,
            status: Some(MachineStatus::Trial),
            date: None,
            patient: None,
            phone: None,
            add_accessories: Vec::new(),
            remove_accessories: Vec::new(),
        };
        let code = cmd_edit(&mut store, &args).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(store.records()[0].status, MachineStatus::InStock);
    }

    // ── cmd_remove tests ─────────────────────────────────────────────

    #[test]
    fn cmd_remove_deletes_record() {
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );

        let code = cmd_remove(&mut store, "sn-1").unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(store.records().is_empty());
    }

    #[test]
    fn cmd_remove_unknown_serial_fails() {
        let mut store = test_store();
        let code = cmd_remove(&mut store, "SN-404").unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    // ── cmd_list / cmd_stats tests ───────────────────────────────────

    #[test]
    fn cmd_list_empty_store() {
        let mut store = test_store();
        let code = cmd_list(&mut store, &filter_args()).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_list_with_data() {
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );
        let code = cmd_list(&mut store, &filter_args()).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_stats_runs() {
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );
        let code = cmd_stats(&mut store).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    // ── cmd_export tests ─────────────────────────────────────────────

    #[test]
    fn cmd_export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store();
        assert_eq!(
            cmd_add(&mut store, add_args("SN-1")).unwrap(),
            ExitCode::SUCCESS
        );

        let args = ExportArgs {
            filter: filter_args(),
            out: Some(dir.path().to_path_buf()),
        };
        let code = cmd_export(&mut store, &args).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let produced: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(produced.len(), 1);
        assert!(produced[0].starts_with("SleepInventory_"));
        assert!(produced[0].ends_with(".xlsx"));
    }

    // ── print function tests ─────────────────────────────────────────

    #[test]
    fn print_records_table_empty() {
        assert!(print_records_table(&[]).is_ok());
    }

    #[test]
    fn print_records_table_with_data() {
        let mut store = test_store();
        let mut args = add_args("SN-1");
        args.status = MachineStatus::Rental;
        args.patient = Some("Chen".to_owned());
        args.accessories = vec!["mask".to_owned()];
        assert_eq!(cmd_add(&mut store, args).unwrap(), ExitCode::SUCCESS);

        let view = store.query(&RecordQuery::new());
        assert!(print_records_table(&view).is_ok());
    }

    #[test]
    fn print_stats_table_works() {
        let counts = StatusCounts {
            in_stock: 2,
            trial: 0,
            rental: 1,
            purchased: 0,
        };
        assert!(print_stats_table(counts).is_ok());
    }

    // ── misc ─────────────────────────────────────────────────────────

    #[test]
    fn make_spinner_creates_spinner() {
        let spinner = make_spinner("Testing...");
        spinner.finish_and_clear();
    }

    #[test]
    fn create_storage_with_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = create_storage(Some(dir.path().to_path_buf()));
        assert!(storage.is_ok());
    }

    #[test]
    fn dispatch_list() {
        let mut store = test_store();
        let code = dispatch(&mut store, Command::List(filter_args())).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn dispatch_stats() {
        let mut store = test_store();
        let code = dispatch(&mut store, Command::Stats).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn status_colors_are_distinct_per_status() {
        assert_eq!(status_color(MachineStatus::InStock), Color::Green);
        assert_eq!(status_color(MachineStatus::Trial), Color::Yellow);
        assert_eq!(status_color(MachineStatus::Rental), Color::Blue);
        assert_eq!(status_color(MachineStatus::Purchased), Color::DarkGrey);
    }
}
