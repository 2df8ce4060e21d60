mod in_memory_job_repository_test;
