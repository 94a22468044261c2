//! Similarity-threshold relevance grader

use async_trait::async_trait;

use crate::domain::grading::{RelevanceGrade, RelevanceGrader, SimilarityScore};
use crate::domain::DomainError;

/// Decides relevance from the retriever's similarity score, without a model call
///
/// Documents without a similarity score are graded not relevant.
#[derive(Debug, Clone)]
pub struct SimilarityThresholdGrader {
    threshold: f32,
    /// `false` when the retriever reports distances
    higher_is_better: bool,
}

impl SimilarityThresholdGrader {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            higher_is_better: true,
        }
    }

    /// With `false`, scores are distances: relevant when at or below the threshold
    pub fn with_higher_is_better(mut self, higher_is_better: bool) -> Self {
        self.higher_is_better = higher_is_better;
        self
    }

    fn passes(&self, score: f32) -> bool {
        if self.higher_is_better {
            score >= self.threshold
        } else {
            score <= self.threshold
        }
    }

    fn normalize(&self, score: f32) -> f32 {
        let relevance = if self.higher_is_better { score } else { 1.0 - score };
        relevance.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl RelevanceGrader for SimilarityThresholdGrader {
    async fn grade(
        &self,
        _question: &str,
        _document_content: &str,
        similarity: SimilarityScore,
    ) -> Result<RelevanceGrade, DomainError> {
        let Some(score) = similarity.value() else {
            return Ok(RelevanceGrade::irrelevant(0.0));
        };

        if !score.is_finite() {
            return Err(DomainError::validation(format!(
                "similarity score {} is not finite",
                score
            )));
        }

        Ok(RelevanceGrade {
            relevance: self.passes(score),
            relevance_score: self.normalize(score),
        })
    }

    fn grader_name(&self) -> &'static str {
        "threshold"
    }
}
