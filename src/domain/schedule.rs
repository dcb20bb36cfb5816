use crate::domain::models::{AssetType, PmSchedule, ScheduleStatus};
use serde::Serialize;
use uuid::Uuid;

/// Order in which a schedule cell cycles on each click.
pub const CYCLE: [ScheduleStatus; 4] = [
    ScheduleStatus::Completed,
    ScheduleStatus::Scheduled,
    ScheduleStatus::CustomerDelayed,
    ScheduleStatus::InProgress,
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl ScheduleStatus {
    pub fn next(self) -> ScheduleStatus {
        let idx = CYCLE.iter().position(|s| *s == self).unwrap_or(0);
        CYCLE[(idx + 1) % CYCLE.len()]
    }
}

pub fn is_valid_month(month: i16) -> bool {
    (1..=12).contains(&month)
}

/// Stored status for the cell, or Scheduled when no row exists.
pub fn cell_status(
    schedules: &[PmSchedule],
    asset_type_id: Uuid,
    month: i16,
    year: i32,
) -> ScheduleStatus {
    schedules
        .iter()
        .find(|s| s.asset_type_id == asset_type_id && s.month == month && s.year == year)
        .map(|s| s.status)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRow {
    pub asset_type_id: Uuid,
    pub asset_type_name: String,
    pub months: Vec<ScheduleStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnualSchedule {
    pub year: i32,
    pub editable: bool,
    pub month_names: [&'static str; 12],
    pub rows: Vec<ScheduleRow>,
}

pub fn annual_schedule(
    asset_types: &[AssetType],
    schedules: &[PmSchedule],
    year: i32,
    editable: bool,
) -> AnnualSchedule {
    let mut types: Vec<&AssetType> = asset_types.iter().collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));

    let rows = types
        .into_iter()
        .map(|t| ScheduleRow {
            asset_type_id: t.id,
            asset_type_name: t.name.clone(),
            months: (1..=12).map(|m| cell_status(schedules, t.id, m, year)).collect(),
        })
        .collect();

    AnnualSchedule {
        year,
        editable,
        month_names: MONTH_NAMES,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn four_clicks_close_the_cycle() {
        for start in CYCLE {
            let mut status = start;
            for _ in 0..4 {
                status = status.next();
            }
            assert_eq!(status, start);
        }
    }

    #[test]
    fn literal_cycle_order() {
        assert_eq!(ScheduleStatus::Completed.next(), ScheduleStatus::Scheduled);
        assert_eq!(ScheduleStatus::Scheduled.next(), ScheduleStatus::CustomerDelayed);
        assert_eq!(ScheduleStatus::CustomerDelayed.next(), ScheduleStatus::InProgress);
        assert_eq!(ScheduleStatus::InProgress.next(), ScheduleStatus::Completed);
    }

    #[test]
    fn absent_cell_defaults_to_scheduled() {
        let forklift = Uuid::new_v4();
        let status = cell_status(&[], forklift, 3, 2026);
        assert_eq!(status, ScheduleStatus::Scheduled);
        assert_eq!(status.next(), ScheduleStatus::CustomerDelayed);
    }

    #[test]
    fn grid_uses_stored_rows_for_matching_year_only() {
        let forklift = AssetType {
            id: Uuid::new_v4(),
            name: "Forklift".to_string(),
        };
        let dock = AssetType {
            id: Uuid::new_v4(),
            name: "Dock Door".to_string(),
        };
        let schedules = vec![
            PmSchedule {
                id: Uuid::new_v4(),
                asset_type_id: forklift.id,
                month: 3,
                year: 2026,
                status: ScheduleStatus::Completed,
                updated_at: Utc::now(),
            },
            PmSchedule {
                id: Uuid::new_v4(),
                asset_type_id: forklift.id,
                month: 4,
                year: 2025,
                status: ScheduleStatus::InProgress,
                updated_at: Utc::now(),
            },
        ];

        let grid = annual_schedule(&[forklift.clone(), dock], &schedules, 2026, false);
        assert!(!grid.editable);
        assert_eq!(grid.rows[0].asset_type_name, "Dock Door");
        let row = &grid.rows[1];
        assert_eq!(row.months.len(), 12);
        assert_eq!(row.months[2], ScheduleStatus::Completed);
        assert_eq!(row.months[3], ScheduleStatus::Scheduled);
    }

    #[test]
    fn month_bounds() {
        assert!(!is_valid_month(0));
        assert!(is_valid_month(1));
        assert!(is_valid_month(12));
        assert!(!is_valid_month(13));
    }
}
