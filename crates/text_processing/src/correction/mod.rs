//! Implicit correction detection
//!
//! The AI tutor's structured output is often empty even when its prose
//! corrects the learner. This module recovers those corrections:
//! - [`indicators`]: does the feedback correct anything?
//! - [`extraction`]: what is the corrected wording?
//! - [`category`]: which taxonomy bucket does the mistake fall into?
//! - [`classifier`]: combines the above with any structured mistakes

pub mod category;
pub mod classifier;
pub mod extraction;
pub mod indicators;

pub use category::assign_category;
pub use classifier::TurnClassifier;
pub use extraction::{extract_fragment, Extraction};
pub use indicators::detect_indicator;
