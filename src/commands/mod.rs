//! Command-line front end.
//!
//! Each subcommand reads the configuration, opens the configured record store
//! and runs one workflow against it.

pub mod activity;
pub mod dashboard;
pub mod init;
pub mod presence;

use crate::libs::config::Config;
use crate::libs::fields::DATE_FORMAT;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Record arrivals and departures")]
    Presence(presence::PresenceArgs),
    #[command(about = "Log meals, naps and care")]
    Activity(activity::ActivityArgs),
    #[command(about = "Show the day of a child")]
    Dashboard(dashboard::DashboardArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Presence(args) => presence::cmd(args).await,
            Commands::Activity(args) => activity::cmd(args).await,
            Commands::Dashboard(args) => dashboard::cmd(args).await,
        }
    }
}

/// Child and date shared by most subcommands.
#[derive(Debug, Args)]
pub struct DayArgs {
    #[arg(long, short, help = "Child identifier (defaults to the configured child)")]
    pub child: Option<String>,

    #[arg(long, short, default_value = "today", help = "Date (YYYY-MM-DD or 'today')")]
    pub date: String,
}

impl DayArgs {
    pub fn child(&self, config: &Config) -> String {
        resolve_child(self.child.as_deref(), config)
    }

    pub fn date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Explicit child, else the configured default. Empty when neither is set.
pub fn resolve_child(arg: Option<&str>, config: &Config) -> String {
    arg.map(str::to_string)
        .or_else(|| config.default_child.clone())
        .unwrap_or_default()
}

pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    if date_str.trim().to_lowercase() == "today" {
        Ok(Local::now().date_naive())
    } else {
        Ok(NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)?)
    }
}
