use declare_metrics::domain::model::{JobStatus, MetricValue, RedundancyStatus};
use declare_metrics::{
    HttpVerifierChannel, MetricsEngine, MetricsError, VerificationChannel,
    VerificationOrchestrator, VerifierSettings,
};
use httpmock::prelude::*;
use std::time::Duration;

fn fast_settings() -> VerifierSettings {
    VerifierSettings {
        initial_delay: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
        max_attempts: 2,
        overall_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_submit_returns_command_id() {
    let server = MockServer::start();
    let submit_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/commands")
            .json_body(serde_json::json!({
                "instanceId": "i-test",
                "modelPath": "models/order.decl"
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"commandId": "cmd-42"}));
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let job_id = channel.submit("models/order.decl").await.unwrap();

    submit_mock.assert();
    assert_eq!(job_id, "cmd-42");
}

#[tokio::test]
async fn test_submit_rejection_is_channel_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/commands");
        then.status(503);
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let err = channel.submit("models/order.decl").await.unwrap_err();

    assert!(matches!(err, MetricsError::ChannelError { .. }));
}

#[tokio::test]
async fn test_poll_maps_remote_status() {
    let server = MockServer::start();
    let poll_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/commands/cmd-1")
            .query_param("instance", "i-test");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"status": "InProgress"}));
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let snapshot = channel.poll("cmd-1").await.unwrap();

    poll_mock.assert();
    assert_eq!(snapshot.status, JobStatus::InProgress);
    assert_eq!(snapshot.output, None);
}

#[tokio::test]
async fn test_poll_404_is_job_not_visible() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/commands/cmd-9");
        then.status(404);
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let err = channel.poll("cmd-9").await.unwrap_err();

    assert!(matches!(err, MetricsError::JobNotVisible { ref job_id } if job_id == "cmd-9"));
}

#[tokio::test]
async fn test_poll_server_error_is_channel_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/commands/cmd-1");
        then.status(500);
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let err = channel.poll("cmd-1").await.unwrap_err();

    assert!(matches!(err, MetricsError::ChannelError { .. }));
}

#[tokio::test]
async fn test_end_to_end_verification_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/commands");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"commandId": "cmd-1"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/commands/cmd-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "status": "Success",
                "output": "{\"satisfiable\": true, \"redundant\": \"[]\"}"
            }));
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let orchestrator = VerificationOrchestrator::with_settings(channel, fast_settings());
    let engine = MetricsEngine::new(orchestrator);

    let text = "activity A\nactivity B\nResponse[A, B] | | |\n";
    let mapping = engine.compute(text, "models/pair.decl").await.unwrap();

    match mapping.get("BH2") {
        Some(MetricValue::Consistency(verdict)) => {
            assert_eq!(verdict.satisfiable, Some(true));
        }
        other => panic!("expected consistency verdict, got {:?}", other),
    }
    match mapping.get("BH1") {
        Some(MetricValue::Redundancy(verdict)) => {
            assert_eq!(verdict.status, RedundancyStatus::None);
        }
        other => panic!("expected redundancy verdict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_never_registering_job_exhausts_attempts() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/commands");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"commandId": "cmd-1"}));
    });
    let poll_mock = server.mock(|when, then| {
        when.method(GET).path("/commands/cmd-1");
        then.status(404);
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let orchestrator = VerificationOrchestrator::with_settings(channel, fast_settings());

    let (consistency, redundancy) = orchestrator.verify("models/pair.decl").await;

    poll_mock.assert_hits(2);
    assert_eq!(consistency.message, "Computation timed out");
    assert_eq!(redundancy.status, RedundancyStatus::TooComplex);
}

#[tokio::test]
async fn test_failed_command_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/commands");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"commandId": "cmd-1"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/commands/cmd-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"status": "Failed"}));
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let orchestrator = VerificationOrchestrator::with_settings(channel, fast_settings());

    let (consistency, redundancy) = orchestrator.verify("models/pair.decl").await;

    assert_eq!(consistency.message, "Verification command failed");
    assert_eq!(redundancy.status, RedundancyStatus::Failed);
}

#[tokio::test]
async fn test_malformed_output_over_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/commands");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"commandId": "cmd-1"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/commands/cmd-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "status": "Success",
                "output": "Segmentation fault"
            }));
    });

    let channel = HttpVerifierChannel::new(server.url(""), "i-test");
    let orchestrator = VerificationOrchestrator::with_settings(channel, fast_settings());

    let (consistency, redundancy) = orchestrator.verify("models/pair.decl").await;

    assert_eq!(consistency.message, "Invalid output format");
    assert_eq!(redundancy.status, RedundancyStatus::Failed);
}
