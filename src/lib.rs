pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod render;
pub mod report;
pub mod responder;
pub mod session;
pub mod source;
pub mod stats;

pub use error::{EngineError, Result};
pub use filter::FilterCriteria;
pub use models::{
    ChatMessage, FeedbackRecord, HeadingLevel, RatingBucket, Section, Sender, SummaryDocument,
};
