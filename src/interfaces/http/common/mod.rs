//! Building blocks shared by the HTTP modules

pub mod response;
pub mod validated_json;

pub use response::{domain_error, forbidden, status_for, ApiError, ApiResponse, EmptyData};
pub use validated_json::ValidatedJson;
