//! Alert sinks: append-only streams of [`AlertRecord`]s.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::info;

use signal_graph_core::types::AlertRecord;

use crate::error::EngineResult;

/// Append-only alert stream, consumable independently of the audit log.
pub trait AlertSink: Send + Sync {
    fn emit(&self, alert: &AlertRecord) -> EngineResult<()>;
}

/// One JSON record per line, optionally echoed to the console log.
pub struct JsonlAlertSink {
    writer: Mutex<BufWriter<File>>,
    enable_console: bool,
}

impl JsonlAlertSink {
    pub fn open(path: impl AsRef<Path>, enable_console: bool) -> EngineResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            enable_console,
        })
    }
}

impl AlertSink for JsonlAlertSink {
    fn emit(&self, alert: &AlertRecord) -> EngineResult<()> {
        let line = serde_json::to_string(alert)?;
        {
            let mut writer = self.writer.lock();
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        if self.enable_console {
            info!(
                ticker = %alert.ticker,
                direction = %alert.direction,
                probability = alert.probability,
                expected_sigma = alert.expected_sigma,
                horizon_minutes = alert.horizon_minutes,
                "ALERT"
            );
        }
        Ok(())
    }
}

/// Collecting sink for tests.
#[derive(Default)]
pub struct MemoryAlertSink {
    alerts: Mutex<Vec<AlertRecord>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.alerts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AlertSink for MemoryAlertSink {
    fn emit(&self, alert: &AlertRecord) -> EngineResult<()> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}
