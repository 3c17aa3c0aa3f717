use super::presence::{confirm, parse_id, DeleteArgs};
use super::{resolve_child, DayArgs};
use crate::libs::activity::ActivityLog;
use crate::libs::config::Config;
use crate::libs::duration::ClockTime;
use crate::libs::fields::parse_child;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct ActivityArgs {
    #[command(subcommand)]
    command: ActivityCommand,
}

#[derive(Debug, Subcommand)]
enum ActivityCommand {
    #[command(about = "Log an activity")]
    Add(AddArgs),
    #[command(about = "Delete an activity")]
    Delete(DeleteArgs),
    #[command(about = "List activities for a day")]
    List(DayArgs),
    #[command(about = "Show the known activity types")]
    Types,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(help = "Activity type, e.g. repas, debut_sieste, change")]
    activity: String,

    #[command(flatten)]
    day: DayArgs,

    #[arg(long, short, help = "Time HH:MM (defaults to now)")]
    time: Option<String>,

    #[arg(long, short, help = "Free-text observation")]
    observation: Option<String>,
}

pub async fn cmd(args: ActivityArgs) -> Result<()> {
    if let ActivityCommand::Types = args.command {
        View::activity_types();
        return Ok(());
    }

    let config = Config::read()?;
    let log = ActivityLog::new(config.open_backend()?, config.addressing);

    match args.command {
        ActivityCommand::Add(args) => {
            let date = args.day.date()?;
            let time = args.time.unwrap_or_else(|| ClockTime::now().to_string());

            let record = log
                .add_activity(
                    &args.day.child(&config),
                    &date.to_string(),
                    &time,
                    &args.activity,
                    args.observation.as_deref(),
                )
                .await?;
            msg_success!(Message::ActivityAdded(record.activity.to_string(), record.time.to_string()));
        }
        ActivityCommand::Delete(args) => {
            let id = parse_id(&args.id)?;
            let child = resolve_child(args.child.as_deref(), &config);

            let deleted = log
                .delete_activity(&child, &id, || args.yes || confirm(Message::ConfirmDeleteActivity(id.to_string())))
                .await?;
            if deleted {
                msg_success!(Message::RecordDeleted(id.to_string()));
            } else {
                msg_info!(Message::DeleteCancelled);
            }
        }
        ActivityCommand::List(day) => {
            let child = parse_child(&day.child(&config))?;
            let date = day.date()?;

            let records = log.list_activities(&child, date).await?;
            if records.is_empty() {
                msg_info!(Message::NoActivities(child.to_string(), date.to_string()));
            } else {
                msg_print!(Message::ActivitiesHeader(child.to_string(), date.to_string()), true);
                View::activities(&records);
            }
        }
        ActivityCommand::Types => {}
    }

    Ok(())
}
