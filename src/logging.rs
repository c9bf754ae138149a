//! Process-wide trace log file
//!
//! `setup_logger` installs an `env_logger` logger writing every record at
//! trace level and above to `<name>.log`. Lines are either plain
//! (`time | level | module | message`) or one JSON object per line, which
//! `load_serialized_log` reads back for inspection.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalcError, Result};

/// Path of the installed log file, once a logger is set up
static LOG_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

#[derive(Debug, Serialize, Deserialize)]
struct SerializedLine {
    text: String,
    record: SerializedRecord,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRecord {
    function: String,
    level: LevelInfo,
    message: String,
    module: String,
    time: TimeInfo,
}

#[derive(Debug, Serialize, Deserialize)]
struct LevelInfo {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TimeInfo {
    repr: String,
    timestamp: f64,
}

/// Install the logger writing to `<name>.log` in the working directory
pub fn setup_logger(name: &str, serialize: bool) -> Result<PathBuf> {
    setup_logger_in(Path::new("."), name, serialize)
}

/// Install the logger writing to `<dir>/<name>.log`
///
/// Only the first call installs anything; later calls return the path of the
/// log already in use.
pub fn setup_logger_in(dir: &Path, name: &str, serialize: bool) -> Result<PathBuf> {
    let mut installed = LOG_PATH
        .lock()
        .map_err(|_| CalcError::Logger("log state poisoned".to_string()))?;
    if let Some(path) = installed.as_ref() {
        return Ok(path.clone());
    }

    let path = dir.join(format!("{}.log", name));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Trace)
        .target(env_logger::Target::Pipe(Box::new(file)));

    if serialize {
        builder.format(|buf, record| {
            let now = Local::now();
            let message = record.args().to_string();
            let module = record.module_path().unwrap_or("").to_string();
            let line = SerializedLine {
                text: format!("{}\n", message),
                record: SerializedRecord {
                    function: module.clone(),
                    level: LevelInfo {
                        name: record.level().to_string(),
                    },
                    message,
                    module,
                    time: TimeInfo {
                        repr: now.to_rfc3339(),
                        timestamp: now.timestamp_micros() as f64 / 1e6,
                    },
                },
            };
            let json = serde_json::to_string(&line).map_err(std::io::Error::other)?;
            writeln!(buf, "{}", json)
        });
    } else {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} | {} | {} | {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        });
    }

    builder
        .try_init()
        .map_err(|e| CalcError::Logger(e.to_string()))?;
    log::trace!("init logging");

    *installed = Some(path.clone());
    Ok(path)
}

/// One record from a serialized log file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub lvl: String,
    pub time_repr: String,
    /// Module that emitted the record
    pub fx: String,
    pub msg: String,
    pub record: Option<Value>,
    pub time_unix: Option<String>,
}

/// Read a JSON-lines log written with `serialize = true`
pub fn load_serialized_log<P: AsRef<Path>>(
    path: P,
    incl_full_record: bool,
    incl_unix_ts: bool,
) -> Result<Vec<LogEntry>> {
    let contents = fs::read_to_string(path.as_ref())?;

    let mut entries = Vec::new();
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        let raw: Value = serde_json::from_str(line)?;
        let parsed: SerializedLine = serde_json::from_value(raw.clone())?;

        entries.push(LogEntry {
            lvl: parsed.record.level.name,
            time_repr: parsed.record.time.repr,
            fx: parsed.record.function,
            msg: parsed.text.trim().to_string(),
            record: incl_full_record.then(|| raw["record"].clone()),
            time_unix: incl_unix_ts.then(|| parsed.record.time.timestamp.to_string()),
        });
    }
    Ok(entries)
}
