//! Grading domain
//!
//! Three independent quality signals drive routing: per-document relevance,
//! grounding of the answer in the evidence, and whether the answer addresses
//! the question.

mod grade;
mod grader;

pub use grade::{AnswerGrade, GroundingGrade, RelevanceGrade, SimilarityScore};
pub use grader::{AnswerGrader, HallucinationGrader, RelevanceGrader};

#[cfg(test)]
pub use grader::mock::{MockAnswerGrader, MockHallucinationGrader, MockRelevanceGrader};
