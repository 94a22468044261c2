//! Node actions
//!
//! Each function reads and mutates the run state for one node. Routing stays in
//! the driver; these only report what they observed.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::domain::generation::{render_chat_history, AnswerGenerator};
use crate::domain::grading::{
    AnswerGrader, HallucinationGrader, RelevanceGrade, RelevanceGrader, SimilarityScore,
};
use crate::domain::graph::{GenerationVerdict, RunState};
use crate::domain::web_search::{WebSearchProvider, WebSearchResult};
use crate::domain::DomainError;

/// Populate `documents`, attaching `similarity_score` when the backend scores hits
pub(super) async fn retrieve(state: &mut RunState, default_k: usize) -> Result<(), DomainError> {
    let k = state.top_k.unwrap_or(default_k);
    let retriever = state.retriever.clone();

    state.documents = if retriever.supports_scoring() {
        retriever
            .similarity_search_with_score(&state.question, k)
            .await?
            .into_iter()
            .map(|(doc, score)| doc.with_similarity_score(score))
            .collect()
    } else {
        retriever.retrieve(&state.question, k).await?
    };

    debug!(k, retrieved = state.documents.len(), "Documents retrieved");
    Ok(())
}

/// Drop documents graded irrelevant and stamp `relevance_score` on the rest
///
/// Sets `web_search` iff at least one document was rejected in this pass.
pub(super) async fn grade_documents(
    grader: &dyn RelevanceGrader,
    state: &mut RunState,
    concurrency: usize,
) -> Result<(), DomainError> {
    let question = state.question.as_str();

    // Built up front so no future borrows from a stream closure argument
    let pending: Vec<_> = state
        .documents
        .iter()
        .map(|doc| {
            grader.grade(
                question,
                &doc.content,
                SimilarityScore::from(doc.similarity_score()),
            )
        })
        .collect();

    let grades: Vec<RelevanceGrade> = stream::iter(pending)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let examined = grades.len();
    let mut rejected = 0usize;

    state.documents = std::mem::take(&mut state.documents)
        .into_iter()
        .zip(grades)
        .filter_map(|(doc, grade)| {
            debug!(
                relevant = grade.relevance,
                relevance_score = grade.relevance_score,
                grader = grader.grader_name(),
                "Document graded"
            );
            if grade.relevance {
                Some(doc.with_relevance_score(grade.relevance_score))
            } else {
                rejected += 1;
                None
            }
        })
        .collect();

    state.web_search = rejected > 0;

    debug!(examined, rejected, kept = state.documents.len(), "Grading pass complete");
    Ok(())
}

/// Produce a fresh answer from the current evidence and bounded history
pub(super) async fn generate(
    generator: &dyn AnswerGenerator,
    state: &mut RunState,
) -> Result<(), DomainError> {
    let history = render_chat_history(&state.chat_history);
    let answer = generator
        .generate(&state.question, &state.documents, &history)
        .await?;

    state.generation = Some(answer);
    Ok(())
}

/// Append web results after the existing documents, returning how many were added
pub(super) async fn web_search(
    provider: &dyn WebSearchProvider,
    state: &mut RunState,
    max_results: usize,
) -> Result<usize, DomainError> {
    let results = provider.search(&state.question, max_results).await?;

    let before = state.documents.len();
    state.documents.extend(
        results
            .into_iter()
            .take(max_results)
            .map(WebSearchResult::into_document),
    );
    let appended = state.documents.len() - before;

    debug!(provider = provider.provider_name(), appended, total = state.documents.len(), "Web results appended");
    Ok(appended)
}

/// Grounding first, usefulness only for grounded answers
pub(super) async fn grade_generation(
    hallucination_grader: &dyn HallucinationGrader,
    answer_grader: &dyn AnswerGrader,
    state: &RunState,
) -> Result<GenerationVerdict, DomainError> {
    let generation = state
        .generation
        .as_deref()
        .ok_or_else(|| DomainError::internal("no generation to grade"))?;

    let mut grounded = hallucination_grader
        .grade(&state.documents, generation)
        .await?
        .grounded;

    if grounded && state.documents.is_empty() {
        warn!("Grader reported an answer grounded in zero documents; treating as not supported");
        grounded = false;
    }

    let addresses_question = if grounded {
        Some(
            answer_grader
                .grade(&state.question, generation)
                .await?
                .addresses_question,
        )
    } else {
        None
    };

    Ok(GenerationVerdict::from_grades(grounded, addresses_question))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::domain::chat::ChatTurn;
    use crate::domain::document::Document;
    use crate::domain::generation::MockAnswerGenerator;
    use crate::domain::grading::{
        MockAnswerGrader, MockHallucinationGrader, MockRelevanceGrader,
    };
    use crate::domain::graph::RunInput;
    use crate::domain::retrieval::{MockRetriever, Retriever};
    use crate::domain::web_search::MockWebSearchProvider;
    use crate::infrastructure::retrieval::InMemoryRetriever;

    fn state_with(documents: Vec<Document>) -> RunState {
        let mut state =
            RunState::from_input(RunInput::new("What is a vector database?", Arc::new(InMemoryRetriever::new())));
        state.documents = documents;
        state
    }

    #[tokio::test]
    async fn test_retrieve_attaches_similarity_scores() {
        let retriever = InMemoryRetriever::with_documents(vec![
            Document::new("A vector database stores embeddings."),
            Document::new("Unrelated cooking notes."),
        ]);
        let mut state = RunState::from_input(
            RunInput::new("vector database", Arc::new(retriever)),
        );

        assert_ok!(retrieve(&mut state, 4).await);

        assert_eq!(state.documents.len(), 2);
        assert_eq!(state.documents[0].similarity_score(), Some(1.0));
        assert_eq!(state.documents[1].similarity_score(), Some(0.0));
    }

    #[tokio::test]
    async fn test_retrieve_falls_back_to_plain_search() {
        let mut retriever = MockRetriever::new();
        retriever.expect_supports_scoring().return_const(false);
        retriever.expect_similarity_search_with_score().never();
        retriever
            .expect_retrieve()
            .withf(|query: &str, k: &usize| query == "What is a vector database?" && *k == 4)
            .times(1)
            .returning(|_, _| Ok(vec![Document::new("plain hit")]));

        let mut state = RunState::from_input(RunInput::new(
            "What is a vector database?",
            Arc::new(retriever) as Arc<dyn Retriever>,
        ));

        assert_ok!(retrieve(&mut state, 4).await);

        assert_eq!(state.documents, vec![Document::new("plain hit")]);
        assert!(state.documents[0].similarity_score().is_none());
    }

    #[tokio::test]
    async fn test_retrieve_uses_caller_top_k() {
        let mut retriever = MockRetriever::new();
        retriever.expect_supports_scoring().return_const(true);
        retriever
            .expect_similarity_search_with_score()
            .withf(|_, k: &usize| *k == 2)
            .times(1)
            .returning(|_, _| Ok(vec![(Document::new("hit"), 0.42)]));

        let input = RunInput::new("q", Arc::new(retriever) as Arc<dyn Retriever>).with_top_k(2);
        let mut state = RunState::from_input(input);

        assert_ok!(retrieve(&mut state, 4).await);

        assert_eq!(state.documents[0].similarity_score(), Some(0.42));
    }

    #[tokio::test]
    async fn test_retrieve_empty_is_not_an_error() {
        let mut state = state_with(vec![Document::new("stale")]);
        assert_ok!(retrieve(&mut state, 4).await);
        assert!(state.documents.is_empty());
    }

    #[tokio::test]
    async fn test_grading_filters_and_scores() {
        let grader = MockRelevanceGrader::new()
            .with_default(RelevanceGrade::relevant(0.8))
            .with_grade("off topic", RelevanceGrade::irrelevant(0.1));
        let mut state = state_with(vec![
            Document::new("first").with_similarity_score(0.3),
            Document::new("off topic"),
            Document::new("third"),
        ]);

        grade_documents(&grader, &mut state, 2).await.unwrap();

        let contents: Vec<&str> = state.documents.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "third"]);
        assert!(state.documents.iter().all(|d| d.relevance_score() == Some(0.8)));
        assert!(state.web_search);
        assert_eq!(
            grader.seen_similarity().iter().filter(|s| **s == SimilarityScore::Unknown).count(),
            2
        );
        assert!(grader.seen_similarity().contains(&SimilarityScore::Known(0.3)));
    }

    #[tokio::test]
    async fn test_grading_all_relevant_clears_flag() {
        let grader = MockRelevanceGrader::new();
        let mut state = state_with(vec![Document::new("a"), Document::new("b")]);
        state.web_search = true;

        grade_documents(&grader, &mut state, 4).await.unwrap();

        assert_eq!(state.documents.len(), 2);
        assert!(!state.web_search);
    }

    #[tokio::test]
    async fn test_grading_preserves_order_under_concurrency() {
        let grader = MockRelevanceGrader::new()
            .with_grade("d2", RelevanceGrade::irrelevant(0.0))
            .with_grade("d5", RelevanceGrade::irrelevant(0.0));
        let docs = (0..8).map(|i| Document::new(format!("d{}", i))).collect();
        let mut state = state_with(docs);

        grade_documents(&grader, &mut state, 3).await.unwrap();

        let contents: Vec<&str> = state.documents.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["d0", "d1", "d3", "d4", "d6", "d7"]);
    }

    #[tokio::test]
    async fn test_grading_error_is_fatal() {
        let grader = MockRelevanceGrader::new().failing_on("bad");
        let mut state = state_with(vec![Document::new("good"), Document::new("bad")]);

        let error = assert_err!(grade_documents(&grader, &mut state, 1).await);
        assert!(matches!(error, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_web_search_appends_after_existing() {
        let provider = MockWebSearchProvider::new();
        let original = vec![Document::new("kept one"), Document::new("kept two")];
        let mut state = state_with(original.clone());

        let appended = assert_ok!(web_search(&provider, &mut state, 3).await);

        assert_eq!(appended, 3);
        assert_eq!(state.documents.len(), 5);
        assert_eq!(&state.documents[..2], &original[..]);
        for (i, doc) in state.documents[2..].iter().enumerate() {
            assert_eq!(
                doc.source().unwrap(),
                format!("Result 1.{}\nhttps://search.test/1/{}", i + 1, i + 1)
            );
            assert!(doc.relevance_score().is_some());
        }
    }

    #[tokio::test]
    async fn test_repeated_web_search_accumulates() {
        let provider = MockWebSearchProvider::new();
        let mut state = state_with(Vec::new());

        web_search(&provider, &mut state, 3).await.unwrap();
        web_search(&provider, &mut state, 3).await.unwrap();

        assert_eq!(state.documents.len(), 6);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_generate_renders_history_and_replaces_answer() {
        let generator = MockAnswerGenerator::new()
            .with_answer("first")
            .with_answer("second");
        let mut state = state_with(vec![Document::new("evidence")]);
        state.chat_history = vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")];

        generate(&generator, &mut state).await.unwrap();
        generate(&generator, &mut state).await.unwrap();

        assert_eq!(state.generation.as_deref(), Some("second"));
        let calls = generator.calls();
        assert_eq!(calls[0].rendered_history, "User: hi\nAssistant: hello");
        assert_eq!(calls[0].documents, calls[1].documents);
    }

    #[tokio::test]
    async fn test_grade_generation_skips_answer_check_when_ungrounded() {
        let hallucination = MockHallucinationGrader::ungrounded();
        let answer = MockAnswerGrader::useful();
        let mut state = state_with(vec![Document::new("fact")]);
        state.generation = Some("claim".to_string());

        let verdict = grade_generation(&hallucination, &answer, &state).await.unwrap();

        assert_eq!(verdict, GenerationVerdict::NotSupported);
        assert_eq!(answer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_grade_generation_verdicts() {
        let mut state = state_with(vec![Document::new("fact")]);
        state.generation = Some("claim".to_string());

        let verdict = grade_generation(
            &MockHallucinationGrader::grounded(),
            &MockAnswerGrader::not_useful(),
            &state,
        )
        .await
        .unwrap();
        assert_eq!(verdict, GenerationVerdict::NotUseful);

        let verdict = grade_generation(
            &MockHallucinationGrader::grounded(),
            &MockAnswerGrader::useful(),
            &state,
        )
        .await
        .unwrap();
        assert_eq!(verdict, GenerationVerdict::Useful);
    }

    #[tokio::test]
    async fn test_empty_evidence_is_never_accepted() {
        let hallucination = MockHallucinationGrader::grounded();
        let answer = MockAnswerGrader::useful();
        let mut state = state_with(Vec::new());
        state.generation = Some("I don't know.".to_string());

        let verdict = grade_generation(&hallucination, &answer, &state).await.unwrap();

        assert_eq!(verdict, GenerationVerdict::NotSupported);
        assert_eq!(hallucination.call_count(), 1);
        assert_eq!(answer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_grade_generation_without_answer_fails() {
        let state = state_with(vec![Document::new("fact")]);
        let result = grade_generation(
            &MockHallucinationGrader::grounded(),
            &MockAnswerGrader::useful(),
            &state,
        )
        .await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }
}
