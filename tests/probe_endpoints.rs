use std::time::{Duration, Instant};
use studypulse::{DependencyEndpoint, DependencyProber, MonitorError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn health_endpoint(status: u16, delay: Option<Duration>) -> MockServer {
    let server = MockServer::start().await;

    let mut template = ResponseTemplate::new(status);
    if let Some(delay) = delay {
        template = template.set_delay(delay);
    }

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(template)
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_healthy_endpoint_reports_true() {
    let server = health_endpoint(200, None).await;
    let prober = DependencyProber::new(
        vec![DependencyEndpoint::new(
            "evolution_api",
            &format!("{}/health", server.uri()),
        )],
        Duration::from_secs(5),
    );

    let statuses = prober.check_all().await;
    assert_eq!(statuses.get("evolution_api"), Some(&true));
}

#[tokio::test]
async fn test_non_200_status_reports_false() {
    // Only HTTP 200 counts as up; other success-family codes do not
    let server = health_endpoint(503, None).await;
    let endpoint = DependencyEndpoint::new("sms_gateway", &format!("{}/health", server.uri()));
    let prober = DependencyProber::new(vec![endpoint.clone()], Duration::from_secs(5));

    let statuses = prober.check_all().await;
    assert_eq!(statuses.get("sms_gateway"), Some(&false));

    // The underlying probe reports the status it saw
    let err = prober.probe(&endpoint).await.unwrap_err();
    match err {
        MonitorError::ProbeFailure(details) => {
            assert!(details.contains("503"), "unexpected details: {}", details)
        }
        other => panic!("expected probe failure, got: {}", other),
    }
}

#[tokio::test]
async fn test_timed_out_endpoint_reports_false() {
    let server = health_endpoint(200, Some(Duration::from_secs(5))).await;
    let prober = DependencyProber::new(
        vec![DependencyEndpoint::new(
            "evolution_api",
            &format!("{}/health", server.uri()),
        )],
        Duration::from_millis(200),
    );

    let started = Instant::now();
    let statuses = prober.check_all().await;

    assert_eq!(statuses.get("evolution_api"), Some(&false));
    // The probe gave up at its timeout instead of waiting out the delay
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "probe did not respect its timeout: {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_probes_run_concurrently_and_independently() {
    let slow = health_endpoint(200, Some(Duration::from_secs(5))).await;
    let fast = health_endpoint(200, None).await;

    let prober = DependencyProber::new(
        vec![
            DependencyEndpoint::new("slow_service", &format!("{}/health", slow.uri())),
            DependencyEndpoint::new("fast_service", &format!("{}/health", fast.uri())),
        ],
        Duration::from_millis(500),
    );

    let started = Instant::now();
    let statuses = prober.check_all().await;
    let elapsed = started.elapsed();

    // The slow endpoint times out without dragging the fast one down
    assert_eq!(statuses.get("slow_service"), Some(&false));
    assert_eq!(statuses.get("fast_service"), Some(&true));

    // Total duration tracks the single timeout, not the sum of both probes
    assert!(
        elapsed < Duration::from_millis(1500),
        "probes appear to have run sequentially: {:?}",
        elapsed
    );
}
