use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;

use research_relay::application::ports::{JobStatusReader, ProviderError};
use research_relay::application::services::{
    JobPoller, PollError, QUEUE_UNAVAILABLE, ResearchError, SubmitOutcome,
};
use research_relay::domain::{JobStatus, ResearchOptions, TokenUsage};

use super::support::{DEEP_ESTIMATE, Harness, PROVIDER_KEY, WINDOW, answer};

fn poller(harness: &Harness) -> JobPoller {
    JobPoller::new(Arc::clone(&harness.job_manager) as Arc<dyn JobStatusReader>)
}

#[tokio::test]
async fn given_saturated_provider_when_submitting_then_defers_without_calling_provider() {
    let mut harness = Harness::new(2);
    harness.saturate();

    let outcome = harness
        .orchestrator
        .submit("solid state batteries", ResearchOptions::default())
        .await
        .unwrap();

    let SubmitOutcome::Async { job_id, estimated_time } = outcome else {
        panic!("expected deferral");
    };
    assert_eq!(estimated_time, Duration::from_secs(60));
    assert_eq!(harness.provider.call_count(), 0);
    let job = harness.job_manager.get_job_status(job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.data.query, "solid state batteries");
    assert_eq!(harness.deferred.try_recv().unwrap().job_id, job_id);
}

#[tokio::test]
async fn given_partly_elapsed_window_when_deferring_deep_request_then_estimate_adds_run_time() {
    let harness = Harness::new(1);
    harness.saturate();
    harness.clock.advance(TimeDelta::seconds(20));

    let outcome = harness
        .orchestrator
        .submit("solid state batteries", ResearchOptions::deep())
        .await
        .unwrap();

    let SubmitOutcome::Async { estimated_time, .. } = outcome else {
        panic!("expected deferral");
    };
    assert_eq!(estimated_time, Duration::from_secs(40) + DEEP_ESTIMATE);
}

#[tokio::test]
async fn given_capacity_when_submitting_quick_request_then_returns_result_without_job() {
    let harness = Harness::new(5);

    let outcome = harness
        .orchestrator
        .submit("what is a qubit", ResearchOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Sync { result: answer() });
    assert_eq!(harness.provider.call_count(), 1);
    assert_eq!(harness.job_manager.job_count().await.unwrap(), 0);
    let info = harness.rate_limiter.get_rate_limit_info(PROVIDER_KEY).unwrap();
    assert_eq!(info.remaining, 4);
}

#[tokio::test]
async fn given_sync_result_with_usage_when_submitting_then_usage_is_recorded() {
    let harness = Harness::new(5);
    harness.provider.push_result(answer().with_usage(TokenUsage {
        input_tokens: 12,
        output_tokens: 30,
    }));

    harness
        .orchestrator
        .submit("what is a qubit", ResearchOptions::default())
        .await
        .unwrap();

    let snapshot = harness.usage_tracker.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.models[0].model, "m");
    assert_eq!(snapshot.models[0].output_tokens, 30);
}

#[tokio::test]
async fn given_short_query_when_submitting_then_validation_error_and_nothing_consumed() {
    let harness = Harness::new(5);

    let result = harness
        .orchestrator
        .submit("ab", ResearchOptions::default())
        .await;

    assert!(matches!(result, Err(ResearchError::Validation(_))));
    assert_eq!(harness.provider.call_count(), 0);
    let info = harness.rate_limiter.get_rate_limit_info(PROVIDER_KEY).unwrap();
    assert_eq!(info.remaining, 5);
}

#[tokio::test]
async fn given_vendor_rate_limit_when_submitting_then_request_is_deferred() {
    let mut harness = Harness::new(5);
    harness
        .provider
        .push_error(ProviderError::RateLimited { data: None });

    let outcome = harness
        .orchestrator
        .submit("what is a qubit", ResearchOptions::default())
        .await
        .unwrap();

    let SubmitOutcome::Async { job_id, .. } = outcome else {
        panic!("expected deferral");
    };
    assert_eq!(harness.provider.call_count(), 1);
    assert_eq!(
        harness.job_manager.get_job_status(job_id).await.unwrap().status,
        JobStatus::Queued
    );
    assert_eq!(harness.deferred.try_recv().unwrap().job_id, job_id);
}

#[tokio::test]
async fn given_api_error_with_429_status_when_submitting_then_request_is_deferred() {
    let harness = Harness::new(5);
    harness.provider.push_error(ProviderError::Api {
        status: Some(429),
        message: "slow down".to_string(),
        data: None,
    });

    let outcome = harness
        .orchestrator
        .submit("what is a qubit", ResearchOptions::default())
        .await
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Async { .. }));
    assert_eq!(harness.job_manager.job_count().await.unwrap(), 1);
}

#[tokio::test]
async fn given_provider_failure_when_submitting_then_error_is_surfaced_without_job() {
    let harness = Harness::new(5);
    harness.provider.push_error(ProviderError::Api {
        status: Some(500),
        message: "internal".to_string(),
        data: None,
    });

    let result = harness
        .orchestrator
        .submit("what is a qubit", ResearchOptions::default())
        .await;

    match result {
        Err(ResearchError::Provider(e)) => assert_eq!(e.status(), Some(500)),
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(harness.job_manager.job_count().await.unwrap(), 0);
}

#[tokio::test]
async fn given_capacity_when_submitting_deep_request_then_job_runs_to_completion() {
    let harness = Harness::new(5);

    let outcome = harness
        .orchestrator
        .submit("history of superconductors", ResearchOptions::deep())
        .await
        .unwrap();

    let SubmitOutcome::Async { job_id, estimated_time } = outcome else {
        panic!("expected async job");
    };
    assert_eq!(estimated_time, DEEP_ESTIMATE);

    let result = poller(&harness)
        .poll_job_status(job_id, 50, Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(result, answer());
    let job = harness.job_manager.get_job_status(job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn given_deep_request_when_provider_fails_then_job_is_marked_failed() {
    let harness = Harness::new(5);
    harness.provider.push_error(ProviderError::Api {
        status: Some(503),
        message: "unavailable".to_string(),
        data: None,
    });

    let outcome = harness
        .orchestrator
        .submit("history of superconductors", ResearchOptions::deep())
        .await
        .unwrap();
    let SubmitOutcome::Async { job_id, .. } = outcome else {
        panic!("expected async job");
    };

    let result = poller(&harness)
        .poll_job_status(job_id, 50, Duration::from_millis(10))
        .await;

    match result {
        Err(PollError::JobFailed(message)) => assert!(message.contains("unavailable")),
        other => panic!("expected failed job, got {other:?}"),
    }
}

#[tokio::test]
async fn given_deep_request_when_vendor_rate_limits_then_job_is_handed_to_worker_queue() {
    let mut harness = Harness::new(5);
    harness
        .provider
        .push_error(ProviderError::RateLimited { data: None });

    let outcome = harness
        .orchestrator
        .submit("history of superconductors", ResearchOptions::deep())
        .await
        .unwrap();
    let SubmitOutcome::Async { job_id, .. } = outcome else {
        panic!("expected async job");
    };

    let queued = tokio::time::timeout(Duration::from_secs(1), harness.deferred.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(queued.job_id, job_id);
    let job = harness.job_manager.get_job_status(job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Processing);
    assert!(job.error.is_none());
}

#[tokio::test]
async fn given_closed_queue_when_deep_request_is_vendor_rate_limited_then_job_fails() {
    let harness = Harness::new(5);
    harness
        .provider
        .push_error(ProviderError::RateLimited { data: None });
    let Harness {
        deferred,
        orchestrator,
        job_manager,
        ..
    } = harness;
    drop(deferred);

    let outcome = orchestrator
        .submit("history of superconductors", ResearchOptions::deep())
        .await
        .unwrap();
    let SubmitOutcome::Async { job_id, .. } = outcome else {
        panic!("expected async job");
    };

    let result = JobPoller::new(job_manager as Arc<dyn JobStatusReader>)
        .poll_job_status(job_id, 50, Duration::from_millis(10))
        .await;
    match result {
        Err(PollError::JobFailed(message)) => assert_eq!(message, QUEUE_UNAVAILABLE),
        other => panic!("expected failed job, got {other:?}"),
    }
}

#[tokio::test]
async fn given_closed_queue_when_deferring_then_job_is_failed_with_reason() {
    let harness = Harness::new(1);
    harness.saturate();
    let Harness {
        deferred,
        orchestrator,
        job_manager,
        ..
    } = harness;
    drop(deferred);

    let outcome = orchestrator
        .submit("solid state batteries", ResearchOptions::default())
        .await
        .unwrap();

    let SubmitOutcome::Async { job_id, .. } = outcome else {
        panic!("expected deferral");
    };
    let job = job_manager.get_job_status(job_id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some(QUEUE_UNAVAILABLE));
}

#[tokio::test]
async fn given_window_reset_when_submitting_again_then_served_synchronously() {
    let harness = Harness::new(1);
    harness.saturate();
    harness.clock.advance(WINDOW);

    let outcome = harness
        .orchestrator
        .submit("what is a qubit", ResearchOptions::default())
        .await
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Sync { .. }));
}
