//! Session log: compact text file of every bus event
//!
//! Format: `T:NNNNN|CODE|data...`
//! - T:NNNNN = timestamp in milliseconds (5 digits, wraps at 99999)
//! - CODE = 2-char event type code
//! - data = pipe-separated values specific to event type
//!
//! Examples:
//! ```text
//! T:00000|SS|3f2a9c1e-...|2026-08-21T10:12:03
//! T:00150|DS|312.0,540.0
//! T:00200|FA|2000.0,0.0
//! T:00480|WC|F|1500.0|0.25
//! T:00480|SN|2|0.25
//! ```

use bevy::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::bus::EventBus;
use super::types::BallEvent;

/// Format a float with fixed precision (1 decimal)
fn fmt_f1(v: f32) -> String {
    format!("{:.1}", v)
}

/// Format a position or vector tuple
fn fmt_pair(pair: (f32, f32)) -> String {
    format!("{:.1},{:.1}", pair.0, pair.1)
}

/// Serialize a BallEvent to compact text format
pub fn serialize_event(time_ms: u32, event: &BallEvent) -> String {
    let ts = format!("T:{:05}", time_ms % 100000);
    let code = event.type_code();

    let data = match event {
        BallEvent::SessionStart {
            session_id,
            timestamp,
        } => format!("{}|{}", session_id, timestamp),
        BallEvent::ArenaResized { width, height } => {
            format!("{}|{}", fmt_f1(*width), fmt_f1(*height))
        }
        BallEvent::BallReleased { from } => fmt_pair(*from),
        BallEvent::BallSpawned { pos } => fmt_pair(*pos),
        BallEvent::BallDocked => String::new(),
        BallEvent::DragStarted { pos } => fmt_pair(*pos),
        BallEvent::DragEnded { velocity } => fmt_pair(*velocity),
        BallEvent::FlickApplied { impulse } => fmt_pair(*impulse),
        BallEvent::WallContact {
            wall,
            impulse,
            strength,
        } => format!("{}|{}|{:.2}", wall, fmt_f1(*impulse), strength),
        BallEvent::SoundRequested { sound, volume } => format!("{}|{:.2}", sound, volume),
    };

    if data.is_empty() {
        format!("{}|{}", ts, code)
    } else {
        format!("{}|{}|{}", ts, code, data)
    }
}

/// Active session logger with file handle
#[derive(Resource)]
pub struct SessionLog {
    writer: Option<BufWriter<File>>,
    session_id: String,
    log_dir: PathBuf,
    enabled: bool,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            writer: None,
            session_id: String::new(),
            log_dir: PathBuf::from(crate::constants::LOGS_DIR),
            enabled: true,
        }
    }

    /// Logger that never touches the filesystem (tests, simulation)
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Open the log file and write the session header. A filesystem
    /// failure disables the logger for the rest of the session.
    pub fn start_session(&mut self) -> String {
        self.session_id = Uuid::new_v4().to_string();
        if !self.enabled {
            return self.session_id.clone();
        }

        if let Err(e) = std::fs::create_dir_all(&self.log_dir) {
            warn!("Failed to create log directory: {}", e);
            self.enabled = false;
            return self.session_id.clone();
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let filename = format!("session_{}_{}.evlog", timestamp, &self.session_id[..8]);
        let path = self.log_dir.join(filename);

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
        {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                info!(
                    "Session log started: {} (session: {})",
                    path.display(),
                    &self.session_id[..8]
                );
            }
            Err(e) => {
                warn!("Failed to open session log: {}", e);
                self.enabled = false;
            }
        }
        self.session_id.clone()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Write one event line
    pub fn log(&mut self, time_ms: u32, event: &BallEvent) {
        let Some(writer) = &mut self.writer else {
            return;
        };
        let line = serialize_event(time_ms, event);
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!("Failed to write event: {}", e);
        }
    }

    pub fn end_session(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!("Failed to flush session log: {}", e);
        }
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

/// System that drains the bus into the session log, once per frame at the
/// end of the update chain.
pub fn flush_event_log(mut bus: ResMut<EventBus>, mut log: ResMut<SessionLog>) {
    if !log.is_active() {
        return;
    }
    for bus_event in bus.drain() {
        log.log(bus_event.time_ms, &bus_event.event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::Wall;

    #[test]
    fn test_compact_lines() {
        let contact = BallEvent::WallContact {
            wall: Wall::Floor,
            impulse: 1500.0,
            strength: 0.25,
        };
        assert_eq!(serialize_event(480, &contact), "T:00480|WC|F|1500.0|0.25");

        let sound = BallEvent::SoundRequested {
            sound: 2,
            volume: 0.25,
        };
        assert_eq!(serialize_event(480, &sound), "T:00480|SN|2|0.25");

        assert_eq!(serialize_event(123_456, &BallEvent::BallDocked), "T:23456|BD");
    }

    #[test]
    fn test_pair_formatting() {
        let flick = BallEvent::FlickApplied {
            impulse: (2000.0, 0.0),
        };
        assert_eq!(serialize_event(0, &flick), "T:00000|FA|2000.0,0.0");
    }

    #[test]
    fn test_disabled_log_never_activates() {
        let mut log = SessionLog::disabled();
        let id = log.start_session();
        assert!(!log.is_active());
        assert_eq!(id.len(), 36);
    }
}
