use async_trait::async_trait;
use std::fmt::Debug;

use super::grade::{AnswerGrade, GroundingGrade, RelevanceGrade, SimilarityScore};
use crate::domain::document::Document;
use crate::domain::DomainError;

/// Grades a single (question, document) pair
#[async_trait]
pub trait RelevanceGrader: Send + Sync + Debug {
    async fn grade(
        &self,
        question: &str,
        document_content: &str,
        similarity: SimilarityScore,
    ) -> Result<RelevanceGrade, DomainError>;

    /// Short name used in logs
    fn grader_name(&self) -> &'static str;
}

/// Checks whether a generation is supported by a document set
///
/// An empty document set supports nothing.
#[async_trait]
pub trait HallucinationGrader: Send + Sync + Debug {
    async fn grade(
        &self,
        documents: &[Document],
        generation: &str,
    ) -> Result<GroundingGrade, DomainError>;
}

/// Checks whether a generation addresses the question
#[async_trait]
pub trait AnswerGrader: Send + Sync + Debug {
    async fn grade(&self, question: &str, generation: &str) -> Result<AnswerGrade, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Grades documents by content lookup, falling back to a default verdict
    #[derive(Debug)]
    pub struct MockRelevanceGrader {
        grades: HashMap<String, RelevanceGrade>,
        default_grade: RelevanceGrade,
        seen_similarity: Mutex<Vec<SimilarityScore>>,
        failing_content: Option<String>,
        calls: AtomicUsize,
    }

    impl MockRelevanceGrader {
        pub fn new() -> Self {
            Self {
                grades: HashMap::new(),
                default_grade: RelevanceGrade::relevant(0.9),
                seen_similarity: Mutex::new(Vec::new()),
                failing_content: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_default(mut self, grade: RelevanceGrade) -> Self {
            self.default_grade = grade;
            self
        }

        pub fn with_grade(mut self, content: impl Into<String>, grade: RelevanceGrade) -> Self {
            self.grades.insert(content.into(), grade);
            self
        }

        /// Fail when asked to grade this exact content
        pub fn failing_on(mut self, content: impl Into<String>) -> Self {
            self.failing_content = Some(content.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn seen_similarity(&self) -> Vec<SimilarityScore> {
            self.seen_similarity.lock().unwrap().clone()
        }
    }

    impl Default for MockRelevanceGrader {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl RelevanceGrader for MockRelevanceGrader {
        async fn grade(
            &self,
            _question: &str,
            document_content: &str,
            similarity: SimilarityScore,
        ) -> Result<RelevanceGrade, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_similarity.lock().unwrap().push(similarity);

            if self.failing_content.as_deref() == Some(document_content) {
                return Err(DomainError::validation("malformed grader output"));
            }

            Ok(self
                .grades
                .get(document_content)
                .copied()
                .unwrap_or(self.default_grade))
        }

        fn grader_name(&self) -> &'static str {
            "mock"
        }
    }

    /// Replays scripted grounding verdicts, repeating the last one
    #[derive(Debug)]
    pub struct MockHallucinationGrader {
        verdicts: Mutex<VecDeque<bool>>,
        last: Mutex<bool>,
        document_counts: Mutex<Vec<usize>>,
        error: Option<String>,
    }

    impl MockHallucinationGrader {
        pub fn grounded() -> Self {
            Self::with_sequence([true])
        }

        pub fn ungrounded() -> Self {
            Self::with_sequence([false])
        }

        pub fn with_sequence(verdicts: impl IntoIterator<Item = bool>) -> Self {
            Self {
                verdicts: Mutex::new(verdicts.into_iter().collect()),
                last: Mutex::new(true),
                document_counts: Mutex::new(Vec::new()),
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.document_counts.lock().unwrap().len()
        }

        /// Size of the evidence set seen on each call
        pub fn document_counts(&self) -> Vec<usize> {
            self.document_counts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HallucinationGrader for MockHallucinationGrader {
        async fn grade(
            &self,
            documents: &[Document],
            _generation: &str,
        ) -> Result<GroundingGrade, DomainError> {
            self.document_counts.lock().unwrap().push(documents.len());

            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock_hallucination_grader", error));
            }

            let next = self.verdicts.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(verdict) = next {
                *last = verdict;
            }

            Ok(GroundingGrade { grounded: *last })
        }
    }

    /// Replays scripted usefulness verdicts, repeating the last one
    #[derive(Debug)]
    pub struct MockAnswerGrader {
        verdicts: Mutex<VecDeque<bool>>,
        last: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl MockAnswerGrader {
        pub fn useful() -> Self {
            Self::with_sequence([true])
        }

        pub fn not_useful() -> Self {
            Self::with_sequence([false])
        }

        pub fn with_sequence(verdicts: impl IntoIterator<Item = bool>) -> Self {
            Self {
                verdicts: Mutex::new(verdicts.into_iter().collect()),
                last: Mutex::new(true),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnswerGrader for MockAnswerGrader {
        async fn grade(&self, _question: &str, _generation: &str) -> Result<AnswerGrade, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let next = self.verdicts.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(verdict) = next {
                *last = verdict;
            }

            Ok(AnswerGrade {
                addresses_question: *last,
            })
        }
    }
}
