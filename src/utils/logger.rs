use std::fmt::Arguments;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Local;
use serde::Deserialize;

static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

pub struct Logger;

impl Logger {
    /// Sets the lowest level that still reaches the output. Called once at startup.
    pub fn set_level(level: LogLevel) {
        MIN_LEVEL.store(level as u8, Ordering::Relaxed);
    }

    pub fn enabled(level: LogLevel) -> bool {
        level as u8 >= MIN_LEVEL.load(Ordering::Relaxed)
    }

    pub fn info(args: Arguments) {
        if Logger::enabled(LogLevel::Info) {
            println!("[INFO ] [{}] {args}", Logger::timestamp());
        }
    }

    pub fn debug(args: Arguments) {
        if Logger::enabled(LogLevel::Debug) {
            println!("[DEBUG] [{}] {args}", Logger::timestamp());
        }
    }

    pub fn warn(args: Arguments) {
        if Logger::enabled(LogLevel::Warn) {
            eprintln!("[WARN ] [{}] {args}", Logger::timestamp());
        }
    }

    pub fn error(args: Arguments) {
        if Logger::enabled(LogLevel::Error) {
            eprintln!("[ERROR] [{}] {args}", Logger::timestamp());
        }
    }

    fn timestamp() -> impl std::fmt::Display {
        Local::now().format("%d/%m/%Y %H:%M:%S")
    }
}

#[macro_export]
macro_rules! logger {
    (INFO, $($arg:tt)*) => {
        $crate::utils::logger::Logger::info(format_args!($($arg)*))
    };
    (DEBUG, $($arg:tt)*) => {
        $crate::utils::logger::Logger::debug(format_args!($($arg)*))
    };
    (WARN, $($arg:tt)*) => {
        $crate::utils::logger::Logger::warn(format_args!($($arg)*))
    };
    (ERROR, $($arg:tt)*) => {
        $crate::utils::logger::Logger::error(format_args!($($arg)*))
    };
}
