/// Every user-facing string of the command-line front end.
///
/// Parameters are pre-formatted strings so that callers decide how ids,
/// dates and times are rendered.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION ===
    ConfigSaved(String), // path
    ConfigCurrent(String),
    ConfigRead(String), // path
    ConfigModuleRest,
    ConfigModuleSqlite,
    PromptSelectBackend,
    PromptSqlitePath,
    PromptAddressing,
    PromptDefaultChild,
    PromptUserId,

    // === ATTENDANCE ===
    ArrivalRecorded(String, String),        // time, date
    DepartureRecorded(String, String),      // time, duration
    PendingArrival(String, String, String), // child, date, time
    DepartureCancelled(String, String),     // child, arrival
    NoPendingArrival,
    PendingKept,
    ConfirmDeleteRecord(String),
    NoAttendance(String, String),     // child, date
    AttendanceHeader(String, String), // child, date

    // === ACTIVITIES ===
    ActivityAdded(String, String), // activity, time
    ConfirmDeleteActivity(String),
    NoActivities(String, String),
    ActivitiesHeader(String, String),

    // === SHARED ===
    RecordDeleted(String),
    InvalidRecordId(String),
    DeleteCancelled,

    // === SESSION PROMPTS ===
    PromptNextStep,
    PromptChild,
    PromptDate,
    PromptArrival,
    PromptDeparture,
    ChoiceRecordArrival,
    ChoiceRecordDeparture,
    ChoiceNewArrival,
    ChoiceQuit,

    // === DASHBOARD ===
    DashboardHeader(String, String), // child, date
    ActivitiesSection,
    AttendanceSection,
    PhotosSection,
    SectionUnavailable(String),
    SectionEmpty,
}
