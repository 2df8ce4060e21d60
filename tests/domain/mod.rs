mod job_status_test;
mod rate_limit_window_test;
mod research_request_test;
