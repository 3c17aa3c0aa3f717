//! Output macros for user-facing messages.
//!
//! In normal runs messages go to stdout (errors to stderr) with an icon
//! prefix. With `NOUNOU_DEBUG` or `RUST_LOG` set they are emitted as
//! `tracing` events instead, so they interleave with the library's logs.
//!
//! ```rust,no_run
//! use nounou::libs::messages::Message;
//! use nounou::{msg_error, msg_success};
//!
//! msg_success!(Message::RecordDeleted("12".to_string()));
//! msg_error!("store offline");
//! ```

use std::fmt::Display;
use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("NOUNOU_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Plain,
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn icon(&self) -> &'static str {
        match self {
            Level::Plain => "",
            Level::Success => "✅ ",
            Level::Info => "ℹ️ ",
            Level::Warning => "⚠️ ",
            Level::Error => "❌ ",
        }
    }
}

#[doc(hidden)]
pub fn emit(level: Level, msg: impl Display, spaced: bool) {
    let text = if spaced {
        format!("\n{}{}\n", level.icon(), msg)
    } else {
        format!("{}{}", level.icon(), msg)
    };

    if is_debug_mode() {
        match level {
            Level::Error => tracing::error!("{}", text),
            Level::Warning => tracing::warn!("{}", text),
            _ => tracing::info!("{}", text),
        }
    } else if level == Level::Error {
        eprintln!("{}", text);
    } else {
        println!("{}", text);
    }
}

#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Plain, $msg, false)
    };
    ($msg:expr, true) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Plain, $msg, true)
    };
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Success, $msg, false)
    };
    ($msg:expr, true) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Success, $msg, true)
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Info, $msg, false)
    };
    ($msg:expr, true) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Info, $msg, true)
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Warning, $msg, false)
    };
    ($msg:expr, true) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Warning, $msg, true)
    };
}

#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Error, $msg, false)
    };
    ($msg:expr, true) => {
        $crate::libs::messages::macros::emit($crate::libs::messages::macros::Level::Error, $msg, true)
    };
}

/// Only shown in debug mode.
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}

#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("❌ {}", $msg)
    };
}

#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("❌ {}", $msg)
    };
}
