pub mod client;
pub mod dns;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod probe;
pub mod sys;
pub mod types;

pub use error::ApiError;
