use std::sync::Arc;
use std::time::Duration;

use httptest::matchers::{all_of, contains, request, url_decoded};
use httptest::responders::{json_encoded, status_code};
use httptest::{Expectation, Server};
use parking_lot::Mutex;
use serde_json::json;

use heatmap_client::{
    ActivitySummary, HeatmapApi, HeatmapBackend, MapTileCounts, PollOutcome, ProcessingState,
    QueryParams, SessionToken, StatusLine, StatusPoller, StatusView,
};

#[derive(Default)]
struct RecordingView {
    lines: Mutex<Vec<StatusLine>>,
}

impl StatusView for RecordingView {
    fn show_status(&self, line: &StatusLine) {
        self.lines.lock().push(line.clone());
    }
}

fn api(server: &Server) -> HeatmapApi {
    HeatmapApi::new(&server.url("/").to_string(), Duration::from_secs(5)).expect("api client")
}

#[tokio::test]
async fn reads_processing_state_with_tile_counts() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/processingstate"),
            request::query(url_decoded(contains(("token", "tok-1"))))
        ])
        .respond_with(json_encoded(json!({
            "athlete_state": { "state": "ProcessingMap" },
            "map_state": { "processing": 2, "failed": 1, "completed": 7 }
        }))),
    );

    let state = api(&server)
        .processing_state(&SessionToken::new("tok-1"))
        .await
        .expect("processing state");
    assert_eq!(
        state,
        ProcessingState::ProcessingMap(MapTileCounts::new(2, 1, 7))
    );
}

#[tokio::test]
async fn poller_stops_after_map_is_complete() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/processingstate"))
            .times(1)
            .respond_with(json_encoded(json!({
                "athlete_state": { "state": "ProcessingMap" },
                "map_state": { "processing": 0, "failed": 0, "completed": 10 }
            }))),
    );

    let view = Arc::new(RecordingView::default());
    let poller = StatusPoller::new(
        Arc::new(api(&server)),
        view.clone(),
        SessionToken::new("tok-2"),
        Duration::from_millis(20),
    );

    tokio::time::timeout(Duration::from_secs(5), poller.run())
        .await
        .expect("poller finished");
    assert!(!poller.timer().is_active());
    assert_eq!(view.lines.lock()[0].text, "Map is fully up to date");
}

#[tokio::test]
async fn server_errors_leave_timer_running() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/processingstate"))
            .respond_with(status_code(500)),
    );

    let view = Arc::new(RecordingView::default());
    let poller = StatusPoller::new(
        Arc::new(api(&server)),
        view.clone(),
        SessionToken::new("tok-3"),
        Duration::from_secs(5),
    );

    assert_eq!(poller.poll_once().await, PollOutcome::FetchFailed);
    assert!(poller.timer().is_active());
    assert!(view.lines.lock().is_empty());
}

#[tokio::test]
async fn summarizes_unprocessed_activities() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/unprocessedactivities"),
            request::query(url_decoded(contains(("token", "tok-4")))),
            request::query(url_decoded(contains(("lat", "1.5"))))
        ])
        .respond_with(json_encoded(json!({
            "ActivityRefresh": {
                "Total": 250,
                "New": [{ "id": 1 }, { "id": 2 }],
                "Unsynced": [{ "id": 2 }]
            }
        }))),
    );

    let summary = api(&server)
        .unprocessed_activities(&QueryParams::parse("?token=tok-4&lat=1.5"))
        .await
        .expect("summary");
    assert_eq!(
        summary,
        ActivitySummary {
            total: 250,
            new: 2,
            unsynced: 1
        }
    );
}

#[tokio::test]
async fn sync_failure_is_reported() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/syncactivities"))
            .respond_with(status_code(502)),
    );

    let result = api(&server)
        .sync_activities(&QueryParams::parse("?token=tok-5"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn share_returns_url_path() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/share"))
            .respond_with(json_encoded(json!({ "url_path": "/shared/9f2c" }))),
    );

    let path = api(&server).share_path().await.expect("share path");
    assert_eq!(path, "/shared/9f2c");
}
