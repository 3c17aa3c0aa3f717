use super::activity::{ActivityRecord, ActivityType};
use super::attendance::AttendanceRecord;
use super::formatter::{format_clock, format_optional};
use super::photo::PhotoRecord;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn attendance_table(records: &[AttendanceRecord]) -> Table {
        let mut table = Table::new();

        table.add_row(row!["ID", "ARRIVAL", "DEPARTURE", "DURATION"]);
        for record in records {
            table.add_row(row![
                record.id,
                record.arrival,
                format_clock(record.departure.as_ref()),
                format_optional(record.duration.as_deref())
            ]);
        }
        table
    }

    pub fn activities_table(records: &[ActivityRecord]) -> Table {
        let mut table = Table::new();

        table.add_row(row!["ID", "TIME", "ACTIVITY", "OBSERVATION"]);
        for record in records {
            table.add_row(row![
                record.id,
                record.time,
                record.activity,
                format_optional(record.observation.as_deref())
            ]);
        }
        table
    }

    pub fn photos_table(records: &[PhotoRecord]) -> Table {
        let mut table = Table::new();

        table.add_row(row!["DATE", "URL"]);
        for record in records {
            table.add_row(row![record.date, record.url]);
        }
        table
    }

    pub fn activity_types_table() -> Table {
        let mut table = Table::new();

        table.add_row(row!["KEY", "LABEL", "CATEGORY"]);
        for activity in ActivityType::ALL {
            table.add_row(row![activity.key(), activity.label(), activity.category()]);
        }
        table
    }

    pub fn attendance(records: &[AttendanceRecord]) {
        Self::attendance_table(records).printstd();
    }

    pub fn activities(records: &[ActivityRecord]) {
        Self::activities_table(records).printstd();
    }

    pub fn photos(records: &[PhotoRecord]) {
        Self::photos_table(records).printstd();
    }

    pub fn activity_types() {
        Self::activity_types_table().printstd();
    }
}
