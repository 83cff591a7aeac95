//! Labeling trigger and jobs
//!
//! The trigger enforces the disable → progress → result → re-enable bracket;
//! the job decides what a run actually does.

pub mod community;
pub mod job;
pub mod trigger;

use thiserror::Error;

pub use community::CommunityLabelingJob;
pub use job::{LabelingJob, LabelingOutcome, RemoteLabelingJob, SimulatedLabelingJob};
pub use trigger::{ClickOutcome, LabelingTrigger, ResultMessage, TriggerState};

/// Errors raised by labeling jobs
#[derive(Error, Debug)]
pub enum LabelingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Labeling endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid labeling response: {0}")]
    InvalidResponse(String),
}

pub type LabelingResult<T> = Result<T, LabelingError>;
