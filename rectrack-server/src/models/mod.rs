//! Domain models with validation at construction
//!
//! Status text and legacy flags are validated when records enter the system.
//! Invalid input returns ValidationError, not panic.

pub mod dataset;
pub mod listing;
pub mod records;
pub mod status;
pub mod validation;

pub use dataset::{Dataset, DatasetError};
pub use listing::{SectionItem, SectionListing, StatusCounts};
pub use records::{Recommendation, Section};
pub use status::Status;
pub use validation::ValidationError;
