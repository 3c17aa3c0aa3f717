use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === CONFIGURATION ===
            Message::ConfigSaved(path) => format!("Configuration saved to {}", path),
            Message::ConfigCurrent(json) => format!("Current configuration:\n{}", json),
            Message::ConfigRead(path) => format!("Configuration read from {}", path),
            Message::ConfigModuleRest => "Hosted backend settings".to_string(),
            Message::ConfigModuleSqlite => "Local database settings".to_string(),
            Message::PromptSelectBackend => "Where should records be stored?".to_string(),
            Message::PromptSqlitePath => "Database file (empty for the default location)".to_string(),
            Message::PromptAddressing => "Table layout".to_string(),
            Message::PromptDefaultChild => "Default child (empty for none)".to_string(),
            Message::PromptUserId => "Your user id (empty for none)".to_string(),

            // === ATTENDANCE ===
            Message::ArrivalRecorded(time, date) => format!("Arrival at {} recorded for {}", time, date),
            Message::DepartureRecorded(time, duration) => format!("Departure at {} recorded, stayed {}", time, duration),
            Message::PendingArrival(child, date, time) => {
                format!("{} arrived at {} on {}, waiting for departure", child, time, date)
            }
            Message::DepartureCancelled(child, arrival) => {
                format!("Stopped waiting for the departure of {} (arrival {})", child, arrival)
            }
            Message::NoPendingArrival => "No pending arrival".to_string(),
            Message::PendingKept => "Pending arrival kept for the next session".to_string(),
            Message::ConfirmDeleteRecord(id) => format!("Delete attendance record {}?", id),
            Message::NoAttendance(child, date) => format!("No attendance for {} on {}", child, date),
            Message::AttendanceHeader(child, date) => format!("Attendance of {} on {}", child, date),

            // === ACTIVITIES ===
            Message::ActivityAdded(activity, time) => format!("{} logged at {}", activity, time),
            Message::ConfirmDeleteActivity(id) => format!("Delete activity {}?", id),
            Message::NoActivities(child, date) => format!("No activities for {} on {}", child, date),
            Message::ActivitiesHeader(child, date) => format!("Activities of {} on {}", child, date),

            // === SHARED ===
            Message::RecordDeleted(id) => format!("Record {} deleted", id),
            Message::InvalidRecordId(id) => format!("Invalid record id: '{}'", id),
            Message::DeleteCancelled => "Nothing deleted".to_string(),

            // === SESSION PROMPTS ===
            Message::PromptNextStep => "Next step".to_string(),
            Message::PromptChild => "Child".to_string(),
            Message::PromptDate => "Date".to_string(),
            Message::PromptArrival => "Arrival time".to_string(),
            Message::PromptDeparture => "Departure time".to_string(),
            Message::ChoiceRecordArrival => "Record an arrival".to_string(),
            Message::ChoiceRecordDeparture => "Record the departure".to_string(),
            Message::ChoiceNewArrival => "New arrival".to_string(),
            Message::ChoiceQuit => "Quit".to_string(),

            // === DASHBOARD ===
            Message::DashboardHeader(child, date) => format!("Day of {} - {}", child, date),
            Message::ActivitiesSection => "Activities".to_string(),
            Message::AttendanceSection => "Attendance".to_string(),
            Message::PhotosSection => "Photos".to_string(),
            Message::SectionUnavailable(error) => format!("Could not load this section: {}", error),
            Message::SectionEmpty => "Nothing yet".to_string(),
        };
        write!(f, "{}", text)
    }
}
