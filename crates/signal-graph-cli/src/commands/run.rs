//! `run`: feed a JSONL event stream through the full pipeline.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use signal_graph_core::audit::JsonlAuditLog;
use signal_graph_core::types::{Event, RawJudgment};
use signal_graph_engine::{
    EngineService, JsonlAlertSink, ScriptedAdapter, WeekdaySessionCalendar,
};

#[derive(Args)]
pub struct RunArgs {
    /// JSONL file of Event records, one per line, in ingestion order
    #[arg(long)]
    events: PathBuf,

    /// TOML configuration file (defaults to the layered config)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSONL file of RawJudgment records, consumed in candidate order.
    /// Without it every candidate is judged "no edge" (dry pipeline).
    #[arg(long)]
    judgments: Option<PathBuf>,
}

fn read_judgments(path: &PathBuf) -> anyhow::Result<Vec<RawJudgment>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut judgments = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        judgments.push(serde_json::from_str(&line).context("parsing judgment line")?);
    }
    Ok(judgments)
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = super::load_config(args.config.as_deref())?;

    let adapter = match &args.judgments {
        Some(path) => {
            let judgments = read_judgments(path)?;
            info!(count = judgments.len(), "loaded scripted judgments");
            ScriptedAdapter::with_script(judgments)
        }
        None => ScriptedAdapter::always(RawJudgment {
            edge: false,
            polarity: 0,
            confidence: 0.0,
            rationale: "offline run without judgments".into(),
        }),
    };

    let audit = Arc::new(
        JsonlAuditLog::open(&config.audit.jsonl_path).context("opening audit log")?,
    );
    let alerts = Arc::new(
        JsonlAlertSink::open(&config.alerts.jsonl_path, config.alerts.enable_console)
            .context("opening alert sink")?,
    );
    let service = EngineService::new(
        config,
        Arc::new(adapter),
        Arc::new(WeekdaySessionCalendar::default()),
        alerts,
        audit,
    );

    let file = File::open(&args.events)
        .with_context(|| format!("opening {}", args.events.display()))?;

    let mut ingested = 0usize;
    let mut skipped = 0usize;
    let mut alerted = 0usize;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = match serde_json::from_str(&line) {
            Ok(ev) => ev,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "skipping malformed event line");
                skipped += 1;
                continue;
            }
        };
        let metrics = service.ingest_event(event).await?;
        ingested += 1;
        if metrics.alert.is_some() {
            alerted += 1;
        }
    }

    info!(
        ingested,
        skipped,
        alerted,
        nodes = service.store().node_count(),
        edges = service.store().edge_count(),
        "run complete"
    );
    Ok(())
}
