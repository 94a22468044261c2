//! Savvy RAG
//!
//! A self-correcting retrieval-augmented question answering core:
//! - Retrieval with optional similarity scores
//! - Per-document relevance grading, by LLM or similarity threshold
//! - Web search fallback when evidence is weak
//! - Grounding and usefulness checks on every answer, with bounded retries

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{GradingStrategy, ModelConfig};
use domain::{
    AnswerGenerator, AnswerGrader, Cache, DomainError, HallucinationGrader, LlmProvider,
    RelevanceGrader, WebSearchProvider,
};
use infrastructure::{
    cache::{InMemoryCache, InMemoryCacheConfig},
    generation::LlmAnswerGenerator,
    grading::{
        LlmAnswerGrader, LlmHallucinationGrader, LlmRelevanceGrader, SimilarityThresholdGrader,
    },
    graph::{CorrectiveRagExecutor, GraphComponents},
    llm::{CachedLlmProvider, HttpClient, LlmProviderFactory, ResponseCheck},
    web_search::TavilySearchProvider,
};
use tracing::info;

/// Build the executor from the default configuration sources
pub fn create_executor() -> Result<CorrectiveRagExecutor, DomainError> {
    let config = AppConfig::load()
        .map_err(|e| DomainError::configuration(format!("Failed to load configuration: {}", e)))?;
    create_executor_with_config(&config)
}

/// Build the executor with custom configuration
pub fn create_executor_with_config(
    config: &AppConfig,
) -> Result<CorrectiveRagExecutor, DomainError> {
    let llm_provider = LlmProviderFactory::create(
        &config.llm.provider,
        config.llm_api_key().as_deref(),
        Duration::from_secs(config.llm.timeout_secs),
    )?;

    // Grader calls are deterministic enough to cache; the generator is not,
    // so a regeneration always reaches the model
    let grader_cache = grader_cache(config);
    let grader_provider = |check: ResponseCheck| match &grader_cache {
        Some((cache, ttl)) => Arc::new(
            CachedLlmProvider::new(llm_provider.clone(), cache.clone(), *ttl)
                .with_response_check(check),
        ) as Arc<dyn LlmProvider>,
        None => llm_provider.clone(),
    };

    let relevance_grader: Arc<dyn RelevanceGrader> = match config.grading.strategy {
        GradingStrategy::Llm => {
            let model = &config.llm.document_grading;
            let mut grader = LlmRelevanceGrader::new(
                grader_provider(LlmRelevanceGrader::accepts),
                &model.model,
            );
            if let Some(temperature) = model.temperature {
                grader = grader.with_temperature(temperature);
            }
            if let Some(max_tokens) = model.max_tokens {
                grader = grader.with_max_tokens(max_tokens);
            }
            Arc::new(grader)
        }
        GradingStrategy::Threshold => Arc::new(
            SimilarityThresholdGrader::new(config.grading.similarity_threshold)
                .with_higher_is_better(config.grading.higher_is_better),
        ),
    };

    let hallucination_grader: Arc<dyn HallucinationGrader> = {
        let model = &config.llm.answer_grounding;
        let mut grader = LlmHallucinationGrader::new(
            grader_provider(LlmHallucinationGrader::accepts),
            &model.model,
        );
        if let Some(temperature) = model.temperature {
            grader = grader.with_temperature(temperature);
        }
        if let Some(max_tokens) = model.max_tokens {
            grader = grader.with_max_tokens(max_tokens);
        }
        Arc::new(grader)
    };

    let answer_grader: Arc<dyn AnswerGrader> = {
        let model = &config.llm.answer_grounding;
        let mut grader = LlmAnswerGrader::new(grader_provider(LlmAnswerGrader::accepts), &model.model);
        if let Some(temperature) = model.temperature {
            grader = grader.with_temperature(temperature);
        }
        if let Some(max_tokens) = model.max_tokens {
            grader = grader.with_max_tokens(max_tokens);
        }
        Arc::new(grader)
    };

    let generator = create_generator(&config.llm.generator, llm_provider);
    let web_search = create_web_search(config)?;

    info!(
        grading = ?config.grading.strategy,
        cache = config.llm.cache.enabled,
        "Corrective RAG executor configured"
    );

    Ok(CorrectiveRagExecutor::new(GraphComponents {
        relevance_grader,
        generator,
        hallucination_grader,
        answer_grader,
        web_search,
    })
    .with_config(config.graph.clone()))
}

/// One cache shared by every grader; keys embed each grader's prompt
fn grader_cache(config: &AppConfig) -> Option<(Arc<dyn Cache>, Duration)> {
    let cache_config = &config.llm.cache;
    if !cache_config.enabled {
        return None;
    }

    let ttl = Duration::from_secs(cache_config.ttl_secs);
    let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::with_config(
        InMemoryCacheConfig::default()
            .with_max_capacity(cache_config.max_capacity)
            .with_default_ttl(ttl),
    ));

    Some((cache, ttl))
}

fn create_generator(model: &ModelConfig, provider: Arc<dyn LlmProvider>) -> Arc<dyn AnswerGenerator> {
    let mut generator = LlmAnswerGenerator::new(provider, &model.model);
    if let Some(temperature) = model.temperature {
        generator = generator.with_temperature(temperature);
    }
    if let Some(max_tokens) = model.max_tokens {
        generator = generator.with_max_tokens(max_tokens);
    }
    Arc::new(generator)
}

fn create_web_search(config: &AppConfig) -> Result<Arc<dyn WebSearchProvider>, DomainError> {
    let api_key = config.web_search_api_key().ok_or_else(|| {
        DomainError::configuration("Web search requires an API key (web_search.api_key or TAVILY_API_KEY)")
    })?;
    let client = HttpClient::with_timeout(Duration::from_secs(config.web_search.timeout_secs))?;

    Ok(Arc::new(
        TavilySearchProvider::with_base_url(client, api_key, &config.web_search.base_url)
            .with_search_depth(config.web_search.search_depth),
    ))
}
