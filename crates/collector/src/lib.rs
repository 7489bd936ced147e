pub mod client;
pub mod fetcher;
pub mod metrics;
pub mod output;
pub mod pipeline;

pub use client::{GithubApiError, GraphqlClient, HttpGraphqlClient};
pub use fetcher::{FetchOutcome, FetchSettings, IssueFetcher, StopReason};
pub use pipeline::{run, run_with_client, RunSummary};
