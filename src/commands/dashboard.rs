use super::{parse_date, resolve_child};
use crate::libs::config::Config;
use crate::libs::dashboard::{Dashboard, DayView, Listing};
use crate::libs::fields::parse_child;
use crate::libs::messages::Message;
use crate::libs::profile::{Profiles, Role};
use crate::libs::view::View;
use crate::{msg_info, msg_print, msg_warning};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[arg(long, short, help = "Child identifier (defaults to the configured child)")]
    child: Option<String>,

    #[arg(long, short, default_value = "today", help = "Date (YYYY-MM-DD or 'today')")]
    date: String,

    #[arg(long, short, help = "User whose profile selects the view (defaults to the configured user)")]
    user: Option<String>,
}

pub async fn cmd(args: DashboardArgs) -> Result<()> {
    let config = Config::read()?;
    let backend = config.open_backend()?;
    let dashboard = Dashboard::new(&backend, config.addressing);
    let date = parse_date(&args.date)?;

    let user = args.user.clone().or_else(|| config.user_id.clone());
    let view = match user {
        Some(user_id) => {
            let profile = Profiles::new(&backend).fetch(&user_id).await?;
            match profile.role {
                Role::Parent => dashboard.parent_day(&profile, date).await?,
                Role::Caregiver => {
                    let child = parse_child(&resolve_child(args.child.as_deref(), &config))?;
                    profile.ensure_can_read(&child)?;
                    dashboard.caregiver_day(&child, date).await
                }
            }
        }
        None => {
            let child = parse_child(&resolve_child(args.child.as_deref(), &config))?;
            dashboard.caregiver_day(&child, date).await
        }
    };

    render(&view);
    Ok(())
}

fn render(view: &DayView) {
    msg_print!(Message::DashboardHeader(view.child.to_string(), view.date.to_string()), true);

    msg_print!(Message::ActivitiesSection);
    section(&view.activities, View::activities);

    msg_print!(Message::AttendanceSection, true);
    section(&view.attendance, View::attendance);

    if let Some(photos) = &view.photos {
        msg_print!(Message::PhotosSection, true);
        section(photos, View::photos);
    }
}

fn section<T>(listing: &Listing<T>, show: fn(&[T])) {
    match &listing.error {
        Some(error) => msg_warning!(Message::SectionUnavailable(error.clone())),
        None if listing.records.is_empty() => msg_info!(Message::SectionEmpty),
        None => show(&listing.records),
    }
}
