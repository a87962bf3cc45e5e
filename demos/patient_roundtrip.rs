//! Patient storage walkthrough.
//!
//! Creates the clinic tables in a temporary database, then inserts,
//! searches, updates and deletes a patient while printing the SQL each
//! step runs.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p clinical-records-demos --example patient_roundtrip
//! RUST_LOG=debug cargo run -p clinical-records-demos --example patient_roundtrip
//! ```

use chrono::NaiveDate;
use clinical_records_core::models::{CLINIC_RECORD_TYPES, FollowUp, Patient};
use clinical_records_core::{Record, RecordInstance};
use clinical_records_sqlite::{
    Comparator, DatabaseConfig, Gateway, InsertMode, SelectOptions, create_table_sql,
    delete_statement, insert_statement, select_statement, update_statement,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::new(DatabaseConfig::new(dir.path().join("clinic.db")));

    // === Step 1: Schema ===
    println!("=== Schema ===");
    println!("{}", create_table_sql(Patient::RECORD_TYPE).unwrap());
    let report = gateway.make_database(&CLINIC_RECORD_TYPES);
    println!("Tables ready: {}", report.created.join(", "));

    // === Step 2: Insert ===
    println!("\n=== Insert ===");
    let mut patient = Patient::named("Juan O'Brien");
    patient.fecha_nacimiento = NaiveDate::from_ymd_opt(1984, 11, 23);
    patient.cedula = Some("V-12.345.678".into());
    patient.ls_sg.push(FollowUp {
        fecha_proximo_control: NaiveDate::from_ymd_opt(2025, 1, 10),
        observaciones_adicionales: Some("control de tension".into()),
    });
    let insert = insert_statement(&patient.to_instance(), InsertMode::Insert);
    println!("{}", insert.to_inline_sql());
    patient.id = gateway.insert(&patient).unwrap();
    println!("Assigned id {}", patient.id);

    // === Step 3: Search by example ===
    println!("\n=== Search ===");
    let mut template = RecordInstance::blank(Patient::RECORD_TYPE);
    template.set("nombre_completo", "%Brien%").unwrap();
    let options = SelectOptions::new()
        .comparator(Comparator::Like)
        .ignore_primary_int(true);
    println!("{}", select_statement(&template, &options).to_inline_sql());
    let found: Vec<Patient> = gateway.search(&template, &options).unwrap();
    for p in &found {
        println!(
            "  #{} {} born {:?}, {} follow-up(s)",
            p.id,
            p.nombre_completo.as_deref().unwrap_or("?"),
            p.fecha_nacimiento,
            p.ls_sg.len()
        );
    }

    // === Step 4: Update ===
    println!("\n=== Update ===");
    let mut renamed = patient.clone();
    renamed.nombre_completo = Some("Juan O'Brien Jr.".into());
    let update = update_statement(&patient.to_instance(), &renamed.to_instance()).unwrap();
    println!("{}", update.to_inline_sql());
    println!("Rows changed: {}", gateway.update(&patient, &renamed).unwrap());

    // === Step 5: Delete ===
    println!("\n=== Delete ===");
    println!("{}", delete_statement(&renamed.to_instance()).unwrap().to_inline_sql());
    println!("Rows removed: {}", gateway.delete(&renamed).unwrap());
    let left: Option<Patient> = gateway.get_by_id(renamed.id).unwrap();
    println!("Still present: {}", left.is_some());
}
