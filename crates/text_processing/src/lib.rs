//! Text processing for tutor feedback
//!
//! This crate turns the AI tutor's free-text critique into a structured
//! verdict:
//! - **Correction detection**: ordered indicator phrases ("should be",
//!   "more natural to say", bold markup, ...)
//! - **Fragment extraction**: an ordered cascade of patterns that pull the
//!   corrected wording out of prose
//! - **Categorization**: rule-based assignment into the mistake taxonomy
//!
//! # Example
//!
//! ```ignore
//! use lingo_text_processing::TurnClassifier;
//!
//! let classifier = TurnClassifier::new();
//! let verdict = classifier.classify(
//!     "I wake up at 7 oclock every day",
//!     "Almost! It should be **o'clock** with an apostrophe.",
//!     None,
//! );
//! assert!(!verdict.is_correct());
//! ```

pub mod correction;

pub use correction::{
    assign_category, detect_indicator, extract_fragment, Extraction, TurnClassifier,
};
