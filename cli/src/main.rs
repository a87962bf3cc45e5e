use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clinical_records_core::models::{CLINIC_RECORD_TYPES, Patient};
use clinical_records_core::{Record, RecordInstance};
use clinical_records_sqlite::{
    Comparator, DatabaseConfig, Gateway, SelectOptions, create_table_sql, drop_table_sql,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clinic-db")]
#[command(about = "Create, inspect and query the clinic records database")]
struct Cli {
    /// Database file path (overrides --config).
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// YAML file with the database configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log every executed statement.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create every missing table.
    Init,
    /// Drop every table and create it again, empty.
    Reset,
    /// Print the CREATE TABLE statement of every record type.
    Schema,
    /// Insert a new patient and print its id.
    AddPatient(AddPatientArgs),
    /// Search patients by example and print one JSON object per line.
    Search(SearchArgs),
    /// Change the full name of an existing patient.
    RenamePatient(RenamePatientArgs),
    /// Delete a patient by id.
    DeletePatient(DeletePatientArgs),
}

#[derive(Debug, Args)]
struct AddPatientArgs {
    /// Full name.
    #[arg(long)]
    name: String,
    /// National identity number.
    #[arg(long)]
    cedula: Option<String>,
    /// Birth date as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    birth_date: Option<NaiveDate>,
    #[arg(long)]
    age: Option<i64>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Name, matched as a substring unless --exact is given.
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    cedula: Option<String>,
    /// Match values exactly instead of as substrings.
    #[arg(long)]
    exact: bool,
    #[arg(long)]
    limit: Option<i64>,
    #[arg(long)]
    offset: Option<i64>,
}

#[derive(Debug, Args)]
struct RenamePatientArgs {
    #[arg(long)]
    id: i64,
    /// New full name.
    #[arg(long)]
    name: String,
}

#[derive(Debug, Args)]
struct DeletePatientArgs {
    #[arg(long)]
    id: i64,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = resolve_config(cli.database, cli.config).and_then(|config| {
        let gateway = Gateway::new(config);
        match cli.command {
            Command::Init => run_init(&gateway),
            Command::Reset => run_reset(&gateway),
            Command::Schema => run_schema(),
            Command::AddPatient(args) => run_add_patient(&gateway, args),
            Command::Search(args) => run_search(&gateway, args),
            Command::RenamePatient(args) => run_rename_patient(&gateway, args),
            Command::DeletePatient(args) => run_delete_patient(&gateway, args),
        }
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(
    database: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<DatabaseConfig, String> {
    match (database, config) {
        (Some(path), _) => Ok(DatabaseConfig::new(path)),
        (None, Some(config)) => DatabaseConfig::load(&config)
            .map_err(|e| format!("Failed to load config '{}': {e}", config.display())),
        (None, None) => Ok(DatabaseConfig::default()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected a YYYY-MM-DD date, got '{raw}': {e}"))
}

// ---------------------------------------------------------------------------
// schema commands
// ---------------------------------------------------------------------------

fn run_init(gateway: &Gateway) -> Result<(), String> {
    let report = gateway.make_database(&CLINIC_RECORD_TYPES);
    for name in &report.created {
        println!("ready: {name}");
    }
    for (name, err) in &report.failed {
        eprintln!("failed: {name}: {err}");
    }
    if !report.is_success() {
        return Err(format!(
            "{} table(s) could not be created in '{}'",
            report.failed.len(),
            gateway.config().path.display()
        ));
    }
    Ok(())
}

fn run_reset(gateway: &Gateway) -> Result<(), String> {
    let drops: String = CLINIC_RECORD_TYPES.iter().map(|rt| drop_table_sql(rt)).collect();
    gateway
        .execute_sql(&drops)
        .map_err(|e| format!("Failed to drop tables: {e}"))?;
    info!(path = %gateway.config().path.display(), "Dropped clinic tables");
    run_init(gateway)
}

fn run_schema() -> Result<(), String> {
    for record_type in CLINIC_RECORD_TYPES {
        let sql = create_table_sql(record_type)
            .map_err(|e| format!("Cannot generate '{}': {e}", record_type.name))?;
        println!("{sql}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// patient commands
// ---------------------------------------------------------------------------

fn run_add_patient(gateway: &Gateway, args: AddPatientArgs) -> Result<(), String> {
    let mut patient = Patient::named(args.name);
    patient.cedula = args.cedula;
    patient.fecha_nacimiento = args.birth_date;
    patient.edad = args.age;
    patient.genero = args.gender;
    patient.telefono = args.phone;

    let id = gateway
        .insert(&patient)
        .map_err(|e| format!("Failed to add patient: {e}"))?;
    println!("{id}");
    Ok(())
}

fn run_search(gateway: &Gateway, args: SearchArgs) -> Result<(), String> {
    let wrap = |value: String| {
        if args.exact {
            value
        } else {
            format!("%{value}%")
        }
    };

    let mut template = RecordInstance::blank(Patient::RECORD_TYPE);
    if let Some(name) = args.name.clone() {
        template
            .set("nombre_completo", wrap(name))
            .map_err(|e| e.to_string())?;
    }
    if let Some(cedula) = args.cedula.clone() {
        template.set("cedula", wrap(cedula)).map_err(|e| e.to_string())?;
    }

    let mut options = SelectOptions::new().ignore_primary_int(true);
    if !args.exact {
        options = options.comparator(Comparator::Like);
    }
    if let Some(limit) = args.limit {
        options = options.limit(limit);
    }
    if let Some(offset) = args.offset {
        options = options.offset(offset);
    }

    let patients: Vec<Patient> = gateway
        .search(&template, &options)
        .map_err(|e| format!("Search failed: {e}"))?;
    for patient in &patients {
        let line = serde_json::to_string(patient)
            .map_err(|e| format!("Failed to serialize patient {}: {e}", patient.id))?;
        println!("{line}");
    }
    Ok(())
}

fn run_rename_patient(gateway: &Gateway, args: RenamePatientArgs) -> Result<(), String> {
    let old: Patient = gateway
        .get_by_id(args.id)
        .map_err(|e| format!("Failed to load patient {}: {e}", args.id))?
        .ok_or_else(|| format!("No patient with id {}", args.id))?;

    let mut new = old.clone();
    new.nombre_completo = Some(args.name);
    let changed = gateway
        .update(&old, &new)
        .map_err(|e| format!("Failed to update patient {}: {e}", args.id))?;
    if changed == 0 {
        return Err(format!("Patient {} changed concurrently; nothing updated", args.id));
    }
    println!("Renamed patient {}.", args.id);
    Ok(())
}

fn run_delete_patient(gateway: &Gateway, args: DeletePatientArgs) -> Result<(), String> {
    let key = Patient {
        id: args.id,
        ..Patient::default()
    };
    let removed = gateway
        .delete(&key)
        .map_err(|e| format!("Failed to delete patient {}: {e}", args.id))?;
    if removed == 0 {
        return Err(format!("No patient with id {}", args.id));
    }
    println!("Deleted patient {}.", args.id);
    Ok(())
}
