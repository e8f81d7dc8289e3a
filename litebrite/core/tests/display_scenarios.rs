//! End-to-end display scenarios
//!
//! These tests drive the public API the way the CLI does: a throttled
//! transport shared between lease acquisition and the writer, against a
//! scripted mock of the display service. Tokio time is paused so throttle and
//! backoff delays are observable without waiting.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::Instant;

use litebrite_core::encoder;
use litebrite_core::{
    show, ContentEncoder, DisplayConfig, DisplaySink, DisplayWriter, Lease, LeaseError,
    LeaseManager, MockTransport, RetryPolicy, Throttled, TransportError, WriteError,
};

const BASE: &str = "http://display.local/peggy";

fn config() -> DisplayConfig {
    DisplayConfig::default().with_base_url(BASE)
}

fn throttled(mock: &Arc<MockTransport>, config: &DisplayConfig) -> Throttled<Arc<MockTransport>> {
    Throttled::from_config(Arc::clone(mock), config)
}

fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(elapsed >= expected, "elapsed {elapsed:?} < {expected:?}");
    assert!(
        elapsed < expected + Duration::from_millis(100),
        "elapsed {elapsed:?} >> {expected:?}"
    );
}

// =============================================================================
// Lease acquisition
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_lease_after_n_failures() {
    let config = config();
    let mock = Arc::new(MockTransport::new());
    mock.push_failures(3);
    mock.push_ok(json!({
        "result": "success",
        "lease_code": "L33T",
        "lease_expiry": "2026-10-19T12:05:00Z"
    }));

    let manager = LeaseManager::from_config(throttled(&mock, &config), &config).unwrap();

    let start = Instant::now();
    let lease = manager.acquire(5).await.unwrap();

    assert_eq!(lease.code(), "L33T");
    assert_eq!(mock.request_count(), 4);
    assert!(mock
        .requests()
        .iter()
        .all(|url| url == &format!("{BASE}/get_lease/5")));
    // 3 backoffs of 15s plus 4 throttle delays of 200ms
    assert_elapsed(start, Duration::from_millis(3 * 15_000 + 4 * 200));
}

#[tokio::test(start_paused = true)]
async fn test_bounded_lease_acquisition_gives_up() {
    let mut config = config();
    config.lease_max_attempts = Some(2);
    let mock = Arc::new(MockTransport::new());
    mock.push_err(TransportError::Network("connection refused".into()));
    mock.push_err(TransportError::Status { status: 503 });

    let manager = LeaseManager::from_config(throttled(&mock, &config), &config).unwrap();
    assert_eq!(manager.policy(), RetryPolicy::bounded(2, Duration::from_secs(15)));

    let err = manager.acquire(1).await.unwrap_err();
    assert_eq!(
        err,
        LeaseError::Exhausted {
            attempts: 2,
            last_error: TransportError::Status { status: 503 },
        }
    );
}

// =============================================================================
// Writing
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_clear_writes_every_row_blank() {
    let config = config();
    let mock = Arc::new(MockTransport::new());
    let writer =
        DisplayWriter::from_config(throttled(&mock, &config), Lease::from_code("abc"), &config)
            .unwrap();

    let start = Instant::now();
    writer.clear().await.unwrap();

    let blank = "%20".repeat(80);
    let expected: Vec<String> = (0..12)
        .map(|row| format!("{BASE}/write/abc/{row}/0/{blank}"))
        .collect();
    assert_eq!(mock.requests(), expected);
    assert_elapsed(start, Duration::from_millis(12 * 200));
}

#[tokio::test(start_paused = true)]
async fn test_long_line_spills_to_next_row() {
    let config = config();
    let mock = Arc::new(MockTransport::new());
    let writer =
        DisplayWriter::from_config(throttled(&mock, &config), Lease::from_code("abc"), &config)
            .unwrap();

    let written = writer.write(0, 0, &"A".repeat(85)).await.unwrap();

    assert_eq!(written, 2);
    assert_eq!(
        mock.requests(),
        vec![
            format!("{BASE}/write/abc/0/0/{}", "A".repeat(80)),
            format!("{BASE}/write/abc/1/0/{}{}", "A".repeat(5), "%20".repeat(75)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rejected_row_stops_the_write() {
    let config = config();
    let mock = Arc::new(MockTransport::new());
    mock.push_ok(json!({"result": "success"}));
    mock.push_failure();

    let writer =
        DisplayWriter::from_config(throttled(&mock, &config), Lease::from_code("abc"), &config)
            .unwrap();

    let err = writer
        .write(0, 0, "first\nsecond\nthird")
        .await
        .unwrap_err();

    assert_eq!(mock.request_count(), 2);
    assert!(mock.requests()[1].contains("/write/abc/1/0/second"));
    assert!(matches!(err, WriteError::Transport { row: 1, written: 1, .. }));
    assert!(err.transport_error().is_some_and(TransportError::is_rejection));
}

#[tokio::test(start_paused = true)]
async fn test_acquire_then_show() {
    let config = config().with_grid(3, 10);
    let mock = Arc::new(MockTransport::new());
    mock.push_ok(json!({"result": "success", "lease_code": "xyz"}));

    let transport = Arc::new(throttled(&mock, &config));
    let lease = LeaseManager::from_config(Arc::clone(&transport), &config)
        .unwrap()
        .acquire(config.lease_minutes)
        .await
        .unwrap();
    let writer = DisplayWriter::from_config(transport, lease, &config).unwrap();

    let written = show(&writer, "Hello_World`").await.unwrap();
    assert_eq!(written, 2);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1 + 3 + 2);
    assert_eq!(requests[0], format!("{BASE}/get_lease/1"));
    assert_eq!(requests[4], format!("{BASE}/write/xyz/0/0/Hello-Worl"));
    assert_eq!(
        requests[5],
        format!("{BASE}/write/xyz/1/0/d'{}", "%20".repeat(8))
    );
}

#[tokio::test(start_paused = true)]
async fn test_unthrottled_writes_do_not_wait() {
    let config = config().with_throttle(Duration::ZERO).with_grid(2, 4);
    let mock = Arc::new(MockTransport::new());
    let writer =
        DisplayWriter::from_config(throttled(&mock, &config), Lease::from_code("abc"), &config)
            .unwrap();

    let start = Instant::now();
    writer.clear().await.unwrap();
    writer.write(1, 0, "ok").await.unwrap();

    assert_eq!(mock.request_count(), 3);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

// =============================================================================
// Encoding properties
// =============================================================================

#[test]
fn test_encoded_rows_are_grid_ready() {
    let grid_encoder = ContentEncoder::new(80);
    let text = "Ünïcödé headlines: {braces}, [brackets] & <tags>\n\
                a_very_long_identifier_that_goes_on_and_on_and_on_well_past_the_eighty_column_limit_of_the_display\n\
                plain words that wrap normally across the grid boundary without any trouble at all, really";

    for row in grid_encoder.encode(text) {
        assert_eq!(row.chars().count(), 80);
        assert!(row
            .chars()
            .all(|c| c == encoder::MASK || encoder::is_allowed(c)));
        assert!(!row.contains('_'));
        assert_eq!(grid_encoder.encode_line(&row), row);
    }
}
