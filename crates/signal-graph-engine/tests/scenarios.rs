//! End-to-end pipeline scenarios: ingest → gate → judge → graph →
//! inference → sinks, including market-hours policy and audit replay.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use signal_graph_core::audit::{AuditOperation, JsonlAuditLog, MemoryAuditLog};
use signal_graph_core::config::Config;
use signal_graph_core::types::{
    Direction, EdgeKey, EdgeKind, Event, EventDetails, EventKind, NodeClass, Polarity, RawJudgment,
};
use signal_graph_engine::{
    rebuild_from_log, AlwaysOpen, EngineService, MemoryAlertSink, ScriptedAdapter,
    WeekdaySessionCalendar,
};

fn news(ticker: &str, ts: DateTime<Utc>, headline: &str) -> Event {
    Event::new(
        ticker,
        ts,
        headline,
        EventDetails::News {
            headline: headline.into(),
            source: Some("wire".into()),
            links: vec![],
        },
    )
}

fn price(ticker: &str, ts: DateTime<Utc>, sigma: f32) -> Event {
    Event::new(
        ticker,
        ts,
        format!("{} {:+.1} sigma move on heavy volume", ticker, sigma),
        EventDetails::Price {
            return_sigma: sigma,
            volume_percentile: 97.0,
            gap_percent: None,
        },
    )
}

fn bullish(confidence: f32) -> RawJudgment {
    RawJudgment {
        edge: true,
        polarity: 1,
        confidence,
        rationale: "cause plausibly moved the stock".into(),
    }
}

/// Scenario-A-style configuration: alpha 0.5, prior weight 0.
fn scenario_config() -> Config {
    let mut config = Config::default_config();
    config.rth.enforce = false;
    config.weights.alpha_blend = 0.5;
    config.weights.initial_edge_weight = 0.0;
    config
}

fn news_price_key(ticker: &str) -> EdgeKey {
    EdgeKey {
        cause: NodeClass::Ticker(ticker.into()),
        effect: NodeClass::Ticker(ticker.into()),
        kind: EdgeKind::new(EventKind::News, EventKind::Price),
    }
}

// Wednesday, session open in UTC terms for the default calendar.
fn wed(h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 5, h, min, 0).unwrap()
}

#[tokio::test]
async fn scenario_a_news_then_price_yields_edge_weight_0_4() {
    let audit = Arc::new(MemoryAuditLog::new());
    let alerts = Arc::new(MemoryAlertSink::new());
    let service = EngineService::new(
        scenario_config(),
        Arc::new(ScriptedAdapter::always(bullish(0.8))),
        Arc::new(AlwaysOpen),
        alerts.clone(),
        audit.clone(),
    );

    // 09:05 news with no prior price move, then a 09:10 +2 sigma print.
    let t_news = wed(15, 5);
    service
        .ingest_event(news("X", t_news, "X wins large contract"))
        .await
        .expect("ingest news");

    let metrics = service
        .ingest_event(price("X", t_news + Duration::minutes(5), 2.0))
        .await
        .expect("ingest price");

    assert_eq!(metrics.proposed, 1, "gate proposes exactly news→price");
    assert_eq!(metrics.accepted, 1);

    let edge = service
        .store()
        .edge(&news_price_key("X"))
        .expect("edge exists");
    assert!((edge.weight - 0.4).abs() < 1e-6, "0.5·0.8 + 0.5·0 = 0.4");
    assert_eq!(edge.polarity, Polarity::Bullish);
    assert_eq!(edge.support_count, 1);
    assert_eq!(edge.volatility, Some(2.0), "effect-side sigma rides the edge");

    let records = audit.records();
    assert!(records
        .iter()
        .any(|r| matches!(r.operation, AuditOperation::CandidateProposed { .. })));
    assert!(records
        .iter()
        .any(|r| matches!(r.operation, AuditOperation::EdgeUpserted { .. })));
}

#[tokio::test]
async fn scenario_b_edge_decays_to_half_after_one_half_life() {
    let mut config = scenario_config();
    // Make the news→price pair half-life 60 minutes.
    config.decay.news_minutes = 60.0;
    config.decay.price_minutes = 60.0;

    let service = EngineService::new(
        config,
        Arc::new(ScriptedAdapter::always(bullish(1.0))),
        Arc::new(AlwaysOpen),
        Arc::new(MemoryAlertSink::new()),
        Arc::new(MemoryAuditLog::new()),
    );

    let t0 = wed(15, 0);
    service
        .ingest_event(news("NVDA", t0, "NVDA headline"))
        .await
        .expect("news");
    service
        .ingest_event(price("NVDA", t0 + Duration::minutes(5), 2.0))
        .await
        .expect("price");

    let stored = service.store().edge(&news_price_key("NVDA")).expect("edge");
    let t_ref = stored.last_updated;
    let w_ref = stored.weight;

    let active = service
        .store()
        .active_edges_into(&NodeClass::Ticker("NVDA".into()), t_ref + Duration::minutes(60));
    assert_eq!(active.len(), 1);
    let (_, decayed) = &active[0];
    assert!(
        (decayed - w_ref / 2.0).abs() < 1e-6,
        "one 60-minute half-life halves {} to {}, got {}",
        w_ref,
        w_ref / 2.0,
        decayed
    );
}

#[tokio::test]
async fn scenario_c_market_closed_buffers_event_for_later_gating() {
    let mut config = scenario_config();
    config.rth.enforce = true;

    let audit = Arc::new(MemoryAuditLog::new());
    let alerts = Arc::new(MemoryAlertSink::new());
    let service = EngineService::new(
        config,
        Arc::new(ScriptedAdapter::always(bullish(0.8))),
        Arc::new(WeekdaySessionCalendar::default()),
        alerts.clone(),
        audit.clone(),
    );

    // 14:00 UTC Wednesday: before the 14:30 open. A qualifying price event
    // arrives; inference must not run, but the node is ingested.
    let closed_ts = wed(14, 0);
    let metrics = service
        .ingest_event(price("NVDA", closed_ts, 2.2))
        .await
        .expect("pre-open price");
    assert!(metrics.inserted);
    assert!(metrics.skipped_closed);
    assert!(metrics.inference.is_none(), "inference engine must not run");
    assert!(alerts.is_empty(), "no AlertRecord emitted");
    assert_eq!(metrics.proposed, 0, "candidate gate must not run either");
    assert!(audit
        .records()
        .iter()
        .any(|r| matches!(r.operation, AuditOperation::EvaluationSkipped { .. })));

    // After the open, the buffered event is an eligible cause under the
    // normal temporal rules (45-minute lag, within the price ceiling).
    let open_metrics = service
        .ingest_event(price("NVDA", wed(14, 45), 1.5))
        .await
        .expect("post-open price");
    assert!(!open_metrics.skipped_closed);
    assert_eq!(open_metrics.proposed, 1, "pre-open event gates as a cause");
    assert!(open_metrics.inference.is_some(), "inference runs when open");
}

#[tokio::test]
async fn alert_is_emitted_when_both_thresholds_are_met() {
    let audit = Arc::new(MemoryAuditLog::new());
    let alerts = Arc::new(MemoryAlertSink::new());
    let service = EngineService::new(
        scenario_config(),
        Arc::new(ScriptedAdapter::always(bullish(0.8))),
        Arc::new(AlwaysOpen),
        alerts.clone(),
        audit.clone(),
    );

    let t0 = wed(15, 0);
    service
        .ingest_event(news("NVDA", t0, "NVDA guidance raised"))
        .await
        .expect("news 1");
    service
        .ingest_event(news("NVDA", t0 + Duration::minutes(2), "NVDA upgrade"))
        .await
        .expect("news 2");
    let metrics = service
        .ingest_event(price("NVDA", t0 + Duration::minutes(10), 2.0))
        .await
        .expect("price");

    let alert = metrics.alert.as_ref().expect("alert emitted");
    assert_eq!(alert.ticker, "NVDA");
    assert_eq!(alert.direction, Direction::Up);
    assert!(alert.probability >= 0.65 && alert.probability < 1.0);
    assert!(alert.expected_sigma >= 1.0);
    assert_eq!(alert.horizon_minutes, 90);

    assert_eq!(alerts.len(), 1, "sink got exactly one record");
    assert!(audit
        .records()
        .iter()
        .any(|r| matches!(r.operation, AuditOperation::AlertEmitted { .. })));
}

#[tokio::test]
async fn weak_graph_support_suppresses_the_alert_with_audit() {
    let audit = Arc::new(MemoryAuditLog::new());
    let alerts = Arc::new(MemoryAlertSink::new());
    let mut config = scenario_config();
    config.weights.min_confidence_to_add = 0.5;
    let service = EngineService::new(
        config,
        Arc::new(ScriptedAdapter::always(bullish(0.55))),
        Arc::new(AlwaysOpen),
        alerts.clone(),
        audit.clone(),
    );

    let t0 = wed(15, 0);
    service
        .ingest_event(news("AAPL", t0, "minor AAPL story"))
        .await
        .expect("news");
    let metrics = service
        .ingest_event(price("AAPL", t0 + Duration::minutes(5), 1.1))
        .await
        .expect("price");

    assert!(metrics.alert.is_none());
    assert!(alerts.is_empty());
    assert!(metrics.inference.is_some(), "inference ran and was suppressed");
    assert!(audit.records().iter().any(|r| matches!(
        &r.operation,
        AuditOperation::AlertSuppressed { ticker, .. } if ticker == "AAPL"
    )));
}

#[tokio::test(start_paused = true)]
async fn hung_judgment_times_out_discards_pair_and_audits() {
    let adapter = ScriptedAdapter::new();
    adapter.push_hang();
    adapter.push_hang(); // retry hangs too

    let mut config = scenario_config();
    config.adapter.timeout_secs = 2;
    config.adapter.max_retries = 1;
    config.adapter.retry_backoff_ms = 10;

    let audit = Arc::new(MemoryAuditLog::new());
    let service = EngineService::new(
        config,
        Arc::new(adapter),
        Arc::new(AlwaysOpen),
        Arc::new(MemoryAlertSink::new()),
        audit.clone(),
    );

    let t0 = wed(15, 0);
    service
        .ingest_event(news("NVDA", t0, "NVDA headline"))
        .await
        .expect("news");
    let metrics = service
        .ingest_event(price("NVDA", t0 + Duration::minutes(5), 2.0))
        .await
        .expect("price");

    assert_eq!(metrics.unavailable, 1);
    assert_eq!(service.store().edge_count(), 0, "no mutation on timeout");
    assert!(audit.records().iter().any(|r| matches!(
        &r.operation,
        AuditOperation::JudgmentUnavailable { attempts: 2, .. }
    )));
}

#[tokio::test]
async fn audit_log_replay_reconstructs_the_graph() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log_path = dir.path().join("audit.jsonl");

    let config = scenario_config();
    let t0 = wed(15, 0);
    let snapshot_at = t0 + Duration::minutes(30);

    let live_snapshot = {
        let audit = Arc::new(JsonlAuditLog::open(&log_path).expect("open log"));
        let service = EngineService::new(
            config.clone(),
            Arc::new(ScriptedAdapter::always(bullish(0.8))),
            Arc::new(AlwaysOpen),
            Arc::new(MemoryAlertSink::new()),
            audit,
        );

        service
            .ingest_event(news("NVDA", t0, "NVDA guidance raised"))
            .await
            .expect("news 1");
        service
            .ingest_event(news("NVDA", t0 + Duration::minutes(2), "NVDA upgrade"))
            .await
            .expect("news 2");
        service
            .ingest_event(price("NVDA", t0 + Duration::minutes(10), 2.0))
            .await
            .expect("price");

        service.store().snapshot(snapshot_at)
    };

    let (rebuilt, stats) = rebuild_from_log(&log_path, config.weights, config.decay)
        .expect("replay");

    assert_eq!(stats.nodes_inserted, 3);
    assert!(stats.edges_upserted >= 1);

    let rebuilt_snapshot = rebuilt.snapshot(snapshot_at);
    assert_eq!(rebuilt_snapshot.nodes, live_snapshot.nodes, "nodes identical");
    assert_eq!(rebuilt_snapshot.edges, live_snapshot.edges, "edges identical");
}

#[tokio::test]
async fn identical_streams_produce_identical_graphs() {
    // Determinism: the same events (same ids, same timestamps) with the
    // same judgments must yield field-for-field identical state.
    let t0 = wed(15, 0);
    let events = vec![
        news("NVDA", t0, "NVDA guidance raised"),
        news("NVDA", t0 + Duration::minutes(3), "NVDA upgrade"),
        price("NVDA", t0 + Duration::minutes(10), 2.0),
    ];

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let service = EngineService::new(
            scenario_config(),
            Arc::new(ScriptedAdapter::always(bullish(0.8))),
            Arc::new(AlwaysOpen),
            Arc::new(MemoryAlertSink::new()),
            Arc::new(MemoryAuditLog::new()),
        );
        for ev in &events {
            service.ingest_event(ev.clone()).await.expect("ingest");
        }
        snapshots.push(service.store().snapshot(t0 + Duration::minutes(20)));
    }

    assert_eq!(snapshots[0].nodes, snapshots[1].nodes);
    assert_eq!(snapshots[0].edges, snapshots[1].edges);
}
