use super::{parse_date, resolve_child, DayArgs};
use crate::libs::attendance::{AttendanceRecord, AttendanceSession, AttendanceState};
use crate::libs::config::Config;
use crate::libs::duration::ClockTime;
use crate::libs::fields::parse_child;
use crate::libs::messages::Message;
use crate::libs::pending::{PendingArrival, PendingStore};
use crate::libs::view::View;
use crate::store::{Backend, RecordId};
use crate::{msg_bail_anyhow, msg_error, msg_error_anyhow, msg_info, msg_print, msg_success, msg_warning};
use anyhow::Result;
use chrono::Local;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

#[derive(Debug, Args)]
pub struct PresenceArgs {
    #[command(subcommand)]
    command: PresenceCommand,
}

#[derive(Debug, Subcommand)]
enum PresenceCommand {
    #[command(about = "Record an arrival")]
    Arrive(ArriveArgs),
    #[command(about = "Record the departure of the pending arrival")]
    Depart(DepartArgs),
    #[command(about = "Forget the pending arrival")]
    Cancel,
    #[command(about = "Delete an attendance record")]
    Delete(DeleteArgs),
    #[command(about = "List attendance for a day")]
    List(DayArgs),
    #[command(about = "Record arrivals and departures interactively")]
    Session,
}

#[derive(Debug, Args)]
struct ArriveArgs {
    #[command(flatten)]
    day: DayArgs,

    #[arg(long, short, help = "Arrival time HH:MM (defaults to now)")]
    time: Option<String>,
}

#[derive(Debug, Args)]
struct DepartArgs {
    #[command(flatten)]
    day: DayArgs,

    #[arg(long, short, help = "Departure time HH:MM (defaults to now)")]
    time: Option<String>,

    #[arg(long, short, help = "Arrival to complete, instead of the pending one")]
    arrival: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(help = "Record id")]
    pub id: String,

    #[arg(long, short, help = "Child identifier (defaults to the configured child)")]
    pub child: Option<String>,

    #[arg(long, short, help = "Skip the confirmation prompt")]
    pub yes: bool,
}

pub async fn cmd(args: PresenceArgs) -> Result<()> {
    let config = Config::read()?;
    let pending = PendingStore::new()?;

    match args.command {
        PresenceCommand::Arrive(args) => {
            let session = open_session(&config)?;
            let date = args.day.date()?;
            let time = args.time.unwrap_or_else(|| ClockTime::now().to_string());

            let record = session.record_arrival(&args.day.child(&config), &date.to_string(), &time).await?;
            pending.store(PendingArrival::from_state(&session.state()).as_ref())?;
            msg_success!(Message::ArrivalRecorded(record.arrival.to_string(), record.date.to_string()));
        }
        PresenceCommand::Depart(args) => {
            let session = open_session(&config)?;
            match (&args.arrival, pending.load()?) {
                (Some(arrival), _) => session.resume(&args.day.child(&config), &args.day.date()?.to_string(), arrival)?,
                (None, Some(entry)) => session.resume(&entry.child, &entry.date, &entry.arrival)?,
                (None, None) => msg_bail_anyhow!(Message::NoPendingArrival),
            }
            let resumed = PendingArrival::from_state(&session.state());
            let time = args.time.unwrap_or_else(|| ClockTime::now().to_string());

            let record = session.record_departure(&time).await?;
            if let Some(resumed) = resumed {
                pending.release(&resumed)?;
            }
            departure_recorded(&record);
        }
        PresenceCommand::Cancel => match pending.load()? {
            Some(entry) => {
                pending.store(None)?;
                msg_success!(Message::DepartureCancelled(entry.child, entry.arrival));
            }
            None => msg_info!(Message::NoPendingArrival),
        },
        PresenceCommand::Delete(args) => {
            let session = open_session(&config)?;
            let id = parse_id(&args.id)?;
            let child = resolve_child(args.child.as_deref(), &config);

            let deleted = session
                .delete_record(&child, &id, || args.yes || confirm(Message::ConfirmDeleteRecord(id.to_string())))
                .await?;
            if deleted {
                msg_success!(Message::RecordDeleted(id.to_string()));
            } else {
                msg_info!(Message::DeleteCancelled);
            }
        }
        PresenceCommand::List(day) => {
            let session = open_session(&config)?;
            let child = parse_child(&day.child(&config))?;
            let date = day.date()?;

            let records = session.list(&child, date).await?;
            if records.is_empty() {
                msg_info!(Message::NoAttendance(child.to_string(), date.to_string()));
            } else {
                msg_print!(Message::AttendanceHeader(child.to_string(), date.to_string()), true);
                View::attendance(&records);
            }
        }
        PresenceCommand::Session => run_session(&config, &pending).await?,
    }

    Ok(())
}

fn open_session(config: &Config) -> Result<AttendanceSession<Backend>> {
    Ok(AttendanceSession::new(config.open_backend()?, config.addressing))
}

pub(crate) fn parse_id(raw: &str) -> Result<RecordId> {
    raw.parse().map_err(|_| msg_error_anyhow!(Message::InvalidRecordId(raw.to_string())))
}

pub(crate) fn confirm(prompt: Message) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn departure_recorded(record: &AttendanceRecord) {
    msg_success!(Message::DepartureRecorded(
        record.departure.map(|d| d.to_string()).unwrap_or_default(),
        record.duration.clone().unwrap_or_default()
    ));
}

/// Drives the two steps from prompts until the user quits.
async fn run_session(config: &Config, pending: &PendingStore) -> Result<()> {
    let session = open_session(config)?;
    let theme = ColorfulTheme::default();
    if let Some(entry) = pending.load()? {
        session.resume(&entry.child, &entry.date, &entry.arrival)?;
    }

    loop {
        match session.state() {
            AttendanceState::AwaitingArrival => {
                let choice = Select::with_theme(&theme)
                    .with_prompt(Message::PromptNextStep.to_string())
                    .items(&[Message::ChoiceRecordArrival.to_string(), Message::ChoiceQuit.to_string()])
                    .default(0)
                    .interact()?;
                if choice == 1 {
                    break;
                }

                let child: String = Input::with_theme(&theme)
                    .with_prompt(Message::PromptChild.to_string())
                    .default(resolve_child(None, config))
                    .allow_empty(true)
                    .interact_text()?;
                let date: String = Input::with_theme(&theme)
                    .with_prompt(Message::PromptDate.to_string())
                    .default(Local::now().date_naive().to_string())
                    .interact_text()?;
                let arrival: String = Input::with_theme(&theme)
                    .with_prompt(Message::PromptArrival.to_string())
                    .default(session.arrival_prefill().to_string())
                    .allow_empty(true)
                    .interact_text()?;

                let date = match parse_date(&date) {
                    Ok(date) => date.to_string(),
                    Err(_) => date,
                };
                match session.record_arrival(&child, &date, &arrival).await {
                    Ok(record) => msg_success!(Message::ArrivalRecorded(record.arrival.to_string(), record.date.to_string())),
                    Err(e) => msg_error!(e),
                }
            }
            AttendanceState::AwaitingDeparture(key) => {
                msg_info!(Message::PendingArrival(key.child.to_string(), key.date.to_string(), key.arrival.to_string()));
                let choice = Select::with_theme(&theme)
                    .with_prompt(Message::PromptNextStep.to_string())
                    .items(&[
                        Message::ChoiceRecordDeparture.to_string(),
                        Message::ChoiceNewArrival.to_string(),
                        Message::ChoiceQuit.to_string(),
                    ])
                    .default(0)
                    .interact()?;

                match choice {
                    0 => {
                        let departure: String = Input::with_theme(&theme)
                            .with_prompt(Message::PromptDeparture.to_string())
                            .default(ClockTime::now().to_string())
                            .allow_empty(true)
                            .interact_text()?;
                        match session.record_departure(&departure).await {
                            Ok(record) => departure_recorded(&record),
                            Err(e) => msg_error!(e),
                        }
                    }
                    1 => session.cancel_departure(),
                    _ => {
                        msg_warning!(Message::PendingKept);
                        break;
                    }
                }
            }
        }
    }

    pending.store(PendingArrival::from_state(&session.state()).as_ref())?;
    Ok(())
}
