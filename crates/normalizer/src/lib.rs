pub mod models;
pub mod payloads;
pub mod taxonomy;
pub mod transform;

pub use models::{IssueState, LabelSet, NormalizedSubmission};
pub use payloads::{IssueConnection, IssuePayload, PageInfo};
pub use taxonomy::{FlagTable, ReviewTaxonomy, TaxonomyError};
pub use transform::Classifier;
