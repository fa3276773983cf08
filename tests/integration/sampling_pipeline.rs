//! End-to-end tests for the sampling pipeline
//!
//! These tests cover the whole path: discovery, pattern selection, cycles,
//! snapshot materialization, and view fan-out.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use metric_sampler::actors::sampler::{Sampler, SamplerHandle};
use metric_sampler::backend::{HttpBackend, MetricBackend};
use metric_sampler::config::BackendConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_pipeline_end_to_end_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!(["cpu.idle", "cpu.user", "mem.free"])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/metrics/cpu.idle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(97.25)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/metrics/cpu.user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(2.5)))
        .mount(&mock_server)
        .await;

    let backend: Arc<dyn MetricBackend> =
        Arc::new(HttpBackend::new(&BackendConfig::new(mock_server.uri())));

    let (mut sampler, handle) = Sampler::new(backend, &patterns(&["cpu.*"]), LONG_INTERVAL)
        .await
        .unwrap();

    let (view, snapshots) = RecordingView::new();
    sampler.add_view(Box::new(view));

    tokio::spawn(sampler.run());
    let snapshot = wait_for_first_cycle(&handle).await;

    // Only the cpu channels were selected; mem.free never gets queried
    let names: Vec<&str> = snapshot.samples.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["cpu.idle", "cpu.user"]);
    assert_eq!(snapshot.sample("cpu.idle").unwrap().value, Some(97.25));
    assert_eq!(snapshot.sample("cpu.user").unwrap().value, Some(2.5));
    assert!(snapshot.sample("mem.free").is_none());

    // The view saw the same cycle
    let recorded = snapshots.lock().unwrap();
    assert_eq!(recorded[0].cycle, snapshot.cycle);
    assert_eq!(
        recorded[0].sample("cpu.idle").unwrap().value,
        Some(97.25)
    );
    drop(recorded);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_views_notified_in_registration_order() {
    let backend: Arc<dyn MetricBackend> = Arc::new(ScriptedBackend::new(&["cpu.idle"], 1.0));

    let (mut sampler, handle) = Sampler::new(backend, &patterns(&["cpu.*"]), LONG_INTERVAL)
        .await
        .unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    sampler.add_view(Box::new(TaggedView::new("first", log.clone())));
    sampler.add_view(Box::new(TaggedView::new("second", log.clone())));

    tokio::spawn(sampler.run());
    wait_for_first_cycle(&handle).await;
    handle.poll_now().await.unwrap();

    let recorded = log.lock().unwrap().clone();
    assert_eq!(
        recorded,
        vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
    );

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_view_added_mid_run_sees_only_subsequent_cycles() {
    let backend: Arc<dyn MetricBackend> = Arc::new(ScriptedBackend::new(&["cpu.idle"], 1.0));
    let handle = SamplerHandle::spawn(backend, &patterns(&["cpu.*"]), LONG_INTERVAL)
        .await
        .unwrap();

    let registered_at = wait_for_first_cycle(&handle).await.cycle;

    let (view, snapshots) = RecordingView::new();
    handle.add_view(Box::new(view)).await.unwrap();

    handle.poll_now().await.unwrap();
    handle.poll_now().await.unwrap();

    let cycles: Vec<u64> = snapshots.lock().unwrap().iter().map(|s| s.cycle).collect();
    assert_eq!(cycles.len(), 2);
    assert!(cycles.iter().all(|&c| c > registered_at));

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_empty_selection_still_notifies_views() {
    let backend: Arc<dyn MetricBackend> = Arc::new(ScriptedBackend::new(&["disk.io"], 1.0));

    let (mut sampler, handle) = Sampler::new(backend, &patterns(&["cpu.*"]), LONG_INTERVAL)
        .await
        .unwrap();
    assert!(sampler.measurements().is_empty());

    let (view, snapshots) = RecordingView::new();
    sampler.add_view(Box::new(view));

    tokio::spawn(sampler.run());
    wait_for_first_cycle(&handle).await;

    let recorded = snapshots.lock().unwrap();
    assert_eq!(recorded[0].cycle, 1);
    assert!(recorded[0].samples.is_empty());
    drop(recorded);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_snapshot_accessor_reflects_latest_completed_cycle() {
    let backend: Arc<dyn MetricBackend> = Arc::new(
        ScriptedBackend::new(&["cpu.idle"], 3.0).script("cpu.idle", vec![Ok(1.0), Ok(2.0)]),
    );
    let handle = SamplerHandle::spawn(backend, &patterns(&["cpu.*"]), LONG_INTERVAL)
        .await
        .unwrap();

    let first = wait_for_first_cycle(&handle).await;
    assert_eq!(first.sample("cpu.idle").unwrap().value, Some(1.0));

    let second = handle.poll_now().await.unwrap();
    assert_eq!(second.sample("cpu.idle").unwrap().value, Some(2.0));

    // Snapshot does not run a cycle; it reports the last completed one
    let current = handle.snapshot().await.unwrap();
    assert_eq!(current.cycle, second.cycle);
    assert_eq!(current.sample("cpu.idle").unwrap().value, Some(2.0));

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_ends_the_run_and_further_commands_fail() {
    let backend: Arc<dyn MetricBackend> = Arc::new(ScriptedBackend::new(&["cpu.idle"], 1.0));

    let (sampler, handle) = Sampler::new(backend, &patterns(&["cpu.*"]), LONG_INTERVAL)
        .await
        .unwrap();
    let task = tokio::spawn(sampler.run());

    handle.stop().await.unwrap();

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("run should return after stop")
        .unwrap();

    assert!(handle.poll_now().await.is_err());
    assert!(handle.snapshot().await.is_err());
}
