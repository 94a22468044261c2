use std::fmt;

use serde::{Deserialize, Serialize};

/// Similarity reported by the retriever for a document, if any
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SimilarityScore {
    Known(f32),
    #[default]
    Unknown,
}

impl SimilarityScore {
    pub fn value(&self) -> Option<f32> {
        match self {
            Self::Known(score) => Some(*score),
            Self::Unknown => None,
        }
    }
}

impl From<Option<f32>> for SimilarityScore {
    fn from(score: Option<f32>) -> Self {
        score.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(score) => write!(f, "{:.4}", score),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Relevance of one document to the question
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceGrade {
    pub relevance: bool,
    /// Continuous relevance in [0, 1]
    pub relevance_score: f32,
}

impl RelevanceGrade {
    pub fn relevant(score: f32) -> Self {
        Self {
            relevance: true,
            relevance_score: score,
        }
    }

    pub fn irrelevant(score: f32) -> Self {
        Self {
            relevance: false,
            relevance_score: score,
        }
    }
}

/// Whether an answer is supported by the evidence set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingGrade {
    pub grounded: bool,
}

/// Whether an answer addresses the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerGrade {
    pub addresses_question: bool,
}
