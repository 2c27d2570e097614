//! Read-only projections of the appointment collection.
//!
//! Views never mutate the store and take "today" as an argument, so they are pure functions of
//! the state they are given.

use crate::constants::{CALENDAR_CELLS, CALENDAR_YEARS};
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Appointment, AppointmentStatus, Patient};
use crate::state::ClinicState;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// A calendar month, written `YYYY-MM`.
///
/// Years are limited to [`CALENDAR_YEARS`] so the six-week grid around any month stays inside
/// the representable date range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> ClinicResult<Self> {
        if !(1..=12).contains(&month)
            || !CALENDAR_YEARS.contains(&year)
            || NaiveDate::from_ymd_opt(year, month, 1).is_none()
        {
            return Err(ClinicError::InvalidInput(format!(
                "invalid month {:04}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                month: self.month + 1,
                ..self
            }
        }
    }

    pub fn days_in_month(self) -> u32 {
        let first = self.first_day();
        let next = self.next().first_day();
        (next - first).num_days() as u32
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ClinicError::InvalidInput(format!("expected YYYY-MM, got: '{}'", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

/// One day of the month grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    /// Appointments on this date, by time.
    pub appointments: Vec<Appointment>,
}

/// Six Sunday-first weeks covering a month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CalendarMonth {
    pub month: YearMonth,
    pub cells: Vec<CalendarCell>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    pub status: AppointmentStatus,
    pub label: String,
    pub appointments: Vec<Appointment>,
}

/// An appointment with its catalog references resolved to display names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRow {
    pub appointment: Appointment,
    pub service_name: String,
    pub sede_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_name: Option<String>,
}

/// Dashboard counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub appointments_today: usize,
    pub patients: usize,
    pub confirmed: usize,
    pub pending: usize,
}

impl ClinicState {
    /// Builds the 42-cell grid for `month`, starting on the Sunday on or before its first day.
    pub fn calendar_grid(&self, month: YearMonth, today: NaiveDate) -> CalendarMonth {
        let first = month.first_day();
        let lead = u64::from(first.weekday().num_days_from_sunday());
        let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);

        let cells = start
            .iter_days()
            .take(CALENDAR_CELLS)
            .map(|date| {
                let mut appointments: Vec<Appointment> = self
                    .appointments
                    .iter()
                    .filter(|a| a.date == date)
                    .cloned()
                    .collect();
                appointments.sort_by_key(|a| a.time);
                CalendarCell {
                    date,
                    in_current_month: month.contains(date),
                    is_today: date == today,
                    appointments,
                }
            })
            .collect();

        CalendarMonth { month, cells }
    }

    /// Groups appointments into one column per status, in lifecycle order.
    ///
    /// Every appointment lands in exactly one column and keeps its collection order there.
    pub fn kanban_board(&self) -> Vec<KanbanColumn> {
        AppointmentStatus::BOARD_ORDER
            .iter()
            .map(|&status| KanbanColumn {
                status,
                label: status.label().to_string(),
                appointments: self
                    .appointments
                    .iter()
                    .filter(|a| a.status == status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// The appointment list, most recent first, with service and sede names.
    pub fn appointment_table(&self) -> Vec<AppointmentRow> {
        self.appointments
            .iter()
            .map(|a| AppointmentRow {
                service_name: self
                    .service(&a.service_id)
                    .map_or_else(|| a.service_id.to_string(), |s| s.name.to_string()),
                sede_name: self
                    .sede(&a.sede_id)
                    .map_or_else(|| a.sede_id.to_string(), |s| s.name.to_string()),
                professional_name: a
                    .professional_id
                    .as_ref()
                    .and_then(|id| self.professional(id))
                    .map(|p| p.name.to_string()),
                appointment: a.clone(),
            })
            .collect()
    }

    /// Patients whose name contains `query` (case-insensitive), whose phone contains it
    /// verbatim, or whose phone digits contain the digits of `query`. A blank query matches
    /// everyone.
    pub fn search_patients(&self, query: &str) -> Vec<&Patient> {
        let query = query.trim();
        if query.is_empty() {
            return self.patients.iter().collect();
        }

        let needle = query.to_lowercase();
        let digits: String = query.chars().filter(char::is_ascii_digit).collect();

        self.patients
            .iter()
            .filter(|p| {
                p.name.as_str().to_lowercase().contains(&needle)
                    || p.phone.as_str().contains(query)
                    || (!digits.is_empty() && p.phone.digits().contains(&digits))
            })
            .collect()
    }

    pub fn overview(&self, today: NaiveDate) -> Overview {
        let count = |status: AppointmentStatus| {
            self.appointments
                .iter()
                .filter(|a| a.status == status)
                .count()
        };
        Overview {
            appointments_today: self.appointments.iter().filter(|a| a.date == today).count(),
            patients: self.patients.len(),
            confirmed: count(AppointmentStatus::Confirmed),
            pending: count(AppointmentStatus::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::tests::{admin_input, date, time};
    use crate::state::tests::seeded_store;

    #[test]
    fn year_month_parses_and_steps() {
        let may: YearMonth = "2025-05".parse().expect("valid");
        assert_eq!(may.to_string(), "2025-05");
        assert_eq!(may.next().to_string(), "2025-06");
        assert_eq!("2024-12".parse::<YearMonth>().expect("valid").next().to_string(), "2025-01");

        for bad in [
            "2025-13",
            "2025-00",
            "2025",
            "May 2025",
            "2025-5x",
            "0000-01",
            "10000-01",
            "262143-12",
        ] {
            assert!(bad.parse::<YearMonth>().is_err(), "{bad}");
        }
    }

    #[test]
    fn calendar_always_has_42_cells_with_every_day_of_month() {
        let store = seeded_store();
        let today = date("2025-05-20");
        for ym in [
            "2025-02", "2024-02", "2025-05", "2025-06", "2026-03", "2015-02", "0001-01", "9999-12",
        ] {
            let month: YearMonth = ym.parse().expect("valid");
            let grid = store.state().calendar_grid(month, today);

            assert_eq!(grid.cells.len(), CALENDAR_CELLS, "{ym}");
            let in_month = grid.cells.iter().filter(|c| c.in_current_month).count();
            assert_eq!(in_month as u32, month.days_in_month(), "{ym}");
            assert_eq!(
                grid.cells[0].date.weekday().num_days_from_sunday(),
                0,
                "{ym}"
            );
            assert!(grid
                .cells
                .windows(2)
                .all(|w| w[0].date.succ_opt() == Some(w[1].date)));
        }
    }

    #[test]
    fn calendar_places_appointments_by_date_and_time() {
        let store = seeded_store();
        let month: YearMonth = "2025-05".parse().expect("valid");
        let grid = store.state().calendar_grid(month, date("2025-05-20"));

        let cell = grid
            .cells
            .iter()
            .find(|c| c.date == date("2025-05-20"))
            .expect("day in grid");
        assert!(cell.is_today);
        let times: Vec<_> = cell.appointments.iter().map(|a| a.time).collect();
        assert_eq!(times, vec![time("10:00"), time("11:30")]);

        assert_eq!(grid.cells.iter().filter(|c| c.is_today).count(), 1);
        let total: usize = grid.cells.iter().map(|c| c.appointments.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn kanban_partitions_every_appointment() {
        let mut store = seeded_store();
        for status in AppointmentStatus::BOARD_ORDER {
            let mut input = admin_input("Lucia Quispe", "912345678");
            input.status = status;
            store.create_appointment(input).expect("create");
        }

        let board = store.state().kanban_board();
        let statuses: Vec<_> = board.iter().map(|c| c.status).collect();
        assert_eq!(statuses, AppointmentStatus::BOARD_ORDER.to_vec());

        let mut ids: Vec<_> = board
            .iter()
            .flat_map(|c| c.appointments.iter().map(|a| a.id.clone()))
            .collect();
        ids.sort();
        let mut expected: Vec<_> = store
            .state()
            .appointments()
            .iter()
            .map(|a| a.id.clone())
            .collect();
        expected.sort();
        assert_eq!(ids, expected);

        for column in &board {
            assert!(column.appointments.iter().all(|a| a.status == column.status));
        }
        assert_eq!(board[0].label, "Pendiente");
    }

    #[test]
    fn table_resolves_catalog_names() {
        let store = seeded_store();
        let rows = store.state().appointment_table();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].service_name, "Consulta Podológica General");
        assert_eq!(rows[0].sede_name, "Sede Miraflores");
        assert_eq!(rows[1].sede_name, "Sede San Isidro");
        assert_eq!(rows[0].professional_name.as_deref(), Some("Dra. Lucía Fernández"));
    }

    #[test]
    fn search_matches_name_or_phone_digits() {
        let store = seeded_store();
        let names = |q: &str| -> Vec<String> {
            store
                .state()
                .search_patients(q)
                .into_iter()
                .map(|p| p.name.to_string())
                .collect()
        };

        assert_eq!(names("ana"), vec!["Ana Maria Beltran"]);
        assert_eq!(names("9876"), vec!["Roberto Gomez"]);
        assert_eq!(names("955 44"), vec!["Ana Maria Beltran"]);
        assert_eq!(names("").len(), 2);
        assert!(names("zzz").is_empty());
    }

    #[test]
    fn overview_counts() {
        let store = seeded_store();
        let overview = store.state().overview(date("2025-05-20"));
        assert_eq!(
            overview,
            Overview {
                appointments_today: 2,
                patients: 2,
                confirmed: 1,
                pending: 1,
            }
        );
        assert_eq!(store.state().overview(date("2025-05-21")).appointments_today, 0);
    }
}
