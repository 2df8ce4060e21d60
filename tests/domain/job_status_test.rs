use std::str::FromStr;

use research_relay::domain::JobStatus;

const ALL: [JobStatus; 4] = [
    JobStatus::Queued,
    JobStatus::Processing,
    JobStatus::Completed,
    JobStatus::Failed,
];

#[test]
fn given_each_status_when_checking_transitions_then_only_forward_edges_are_allowed() {
    let allowed = [
        (JobStatus::Queued, JobStatus::Processing),
        (JobStatus::Processing, JobStatus::Completed),
        (JobStatus::Processing, JobStatus::Failed),
    ];

    for from in ALL {
        for to in ALL {
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&(from, to)),
                "{} -> {}",
                from,
                to
            );
        }
    }
}

#[test]
fn given_terminal_statuses_when_checking_then_reports_terminal() {
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
    assert!(!JobStatus::Queued.is_terminal());
    assert!(!JobStatus::Processing.is_terminal());
}

#[test]
fn given_wire_name_when_parsing_then_round_trips_case_insensitively() {
    assert_eq!(JobStatus::from_str("queued"), Ok(JobStatus::Queued));
    assert_eq!(JobStatus::from_str("PROCESSING"), Ok(JobStatus::Processing));
    assert_eq!(JobStatus::Completed.to_string(), "completed");
    assert!(JobStatus::from_str("cancelled").is_err());
}
