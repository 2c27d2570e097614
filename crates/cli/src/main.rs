use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use clinic_core::config::{booking_slots_from_env_value, country_code_from_env_value};
use clinic_core::{BookingRequest, ClinicStore, CoreConfig, NonEmptyText, RecordId, YearMonth};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic appointment and clinical record CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List appointments, most recent first
    List,
    /// Show appointments grouped by status
    Board,
    /// Show the month calendar
    Calendar {
        /// Month to show (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Search patients by name or phone digits
    Search {
        /// Name fragment or phone digits
        query: String,
    },
    /// Show dashboard counters for today
    Overview,
    /// List the slots offered for online booking
    Slots,
    /// Book an appointment as the public portal would
    Book {
        /// Patient name
        name: String,
        /// Local phone number
        phone: String,
        /// Date (YYYY-MM-DD)
        date: String,
        /// Time (HH:MM), one of the booking slots
        time: String,
        /// Service identifier
        #[arg(long)]
        service: String,
        /// Sede identifier
        #[arg(long)]
        sede: String,
        /// Country code (optional, e.g. +51)
        #[arg(long)]
        country_code: Option<String>,
        /// Email (optional)
        #[arg(long)]
        email: Option<String>,
    },
}

fn load_store() -> Result<ClinicStore, Box<dyn std::error::Error>> {
    let country_code =
        country_code_from_env_value(std::env::var("CLINIC_DEFAULT_COUNTRY_CODE").ok())?;
    let booking_slots = booking_slots_from_env_value(std::env::var("CLINIC_BOOKING_SLOTS").ok())?;
    let seed_file = std::env::var("CLINIC_SEED_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    let cfg = Arc::new(CoreConfig::new(country_code, booking_slots, seed_file)?);
    Ok(ClinicStore::from_config(cfg)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let mut store = load_store()?;
    let today = Local::now().date_naive();

    match command {
        Commands::List => {
            let rows = store.state().appointment_table();
            if rows.is_empty() {
                println!("No appointments found.");
            }
            for row in rows {
                let a = &row.appointment;
                println!(
                    "{} {} [{}] {} | {} | {} | {}",
                    a.date,
                    a.time.format("%H:%M"),
                    a.booking_code,
                    a.patient_name,
                    row.service_name,
                    row.sede_name,
                    a.status
                );
            }
        }
        Commands::Board => {
            for column in store.state().kanban_board() {
                println!("{} ({})", column.label, column.appointments.len());
                for a in &column.appointments {
                    println!(
                        "  {} {} {}",
                        a.date,
                        a.time.format("%H:%M"),
                        a.patient_name
                    );
                }
            }
        }
        Commands::Calendar { month } => {
            let month = match month {
                Some(m) => m.parse::<YearMonth>()?,
                None => YearMonth::containing(today),
            };
            let grid = store.state().calendar_grid(month, today);
            println!("{}", grid.month);
            println!(" Do  Lu  Ma  Mi  Ju  Vi  Sa");
            for week in grid.cells.chunks(7) {
                let line: Vec<String> = week
                    .iter()
                    .map(|cell| {
                        let day = if cell.in_current_month {
                            format!("{:>2}", cell.date.day())
                        } else {
                            "  ".to_string()
                        };
                        let mark = match (cell.is_today, cell.appointments.len()) {
                            (true, _) => '*',
                            (false, 0) => ' ',
                            (false, _) => '+',
                        };
                        format!(" {}{}", day, mark)
                    })
                    .collect();
                println!("{}", line.join(""));
            }
        }
        Commands::Search { query } => {
            let patients = store.state().search_patients(&query);
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!(
                    "ID: {}, Name: {}, Phone: {}, History entries: {}",
                    patient.id,
                    patient.name,
                    patient.phone,
                    patient.history.len()
                );
            }
        }
        Commands::Overview => {
            let overview = store.state().overview(today);
            println!("Appointments today: {}", overview.appointments_today);
            println!("Patients: {}", overview.patients);
            println!("Confirmed: {}", overview.confirmed);
            println!("Pending: {}", overview.pending);
        }
        Commands::Slots => {
            let slots: Vec<String> = store
                .config()
                .booking_slots()
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect();
            println!("{}", slots.join(", "));
        }
        Commands::Book {
            name,
            phone,
            date,
            time,
            service,
            sede,
            country_code,
            email,
        } => {
            let request = BookingRequest {
                name: NonEmptyText::new(name)?,
                phone,
                country_code,
                email,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
                time: NaiveTime::parse_from_str(&time, "%H:%M")?,
                service_id: RecordId::parse(&service)?,
                sede_id: RecordId::parse(&sede)?,
                notes: None,
            };
            match store.book(request) {
                Ok(appointment) => println!(
                    "Booked {} on {} at {}. Booking code: {}",
                    appointment.patient_name,
                    appointment.date,
                    appointment.time.format("%H:%M"),
                    appointment.booking_code
                ),
                Err(e) => eprintln!("Error booking appointment: {}", e),
            }
        }
    }

    Ok(())
}
