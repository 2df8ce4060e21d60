mod clock;
mod job_repository;
mod job_status_reader;
mod repository_error;
mod research_provider;

pub use clock::Clock;
pub use job_repository::JobRepository;
pub use job_status_reader::JobStatusReader;
pub use repository_error::RepositoryError;
pub use research_provider::{ProviderError, ResearchProvider};
