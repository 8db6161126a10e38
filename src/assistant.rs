//! Question answering pipeline.
//!
//! ```text
//! question ──▶ PromptCache ──▶ CompletionBackend ──▶ extract_sql
//!              (spawn_blocking)                          │
//!                                                        ▼
//!        reply ◀── QueryExecutor ◀── Accepted ◀── SqlValidator
//!                                                        │
//!                                     "Ошибка: …" ◀── Rejected
//! ```
//!
//! [`Assistant::answer`] never fails: every error is turned into a reply
//! starting with [`ERROR_PREFIX`].

use std::sync::Arc;

use tokio::task;

use crate::{
    error::{AppError, worker_error},
    executor::{Database, QueryExecutor},
    extract::extract_sql,
    llm::{CompletionBackend, Temperature},
    prompt::PromptCache,
    validator::{Rejection, SqlValidator, Validation}
};

/// Prefix of every failure reply
pub const ERROR_PREFIX: &str = "Ошибка";

/// Failure of one question/answer cycle.
#[derive(Debug)]
pub enum AnswerError {
    /// The generated statement broke the read-only policy
    Rejected(Rejection),
    /// Prompt loading, completion or execution failed
    Failed(AppError)
}

impl std::fmt::Display for AnswerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(rejection) => write!(f, "query rejected: {}", rejection),
            Self::Failed(err) => f.write_str(&err.render_message())
        }
    }
}

impl From<AppError> for AnswerError {
    fn from(err: AppError) -> Self {
        Self::Failed(err)
    }
}

/// Turns free-text questions into integer answers.
pub struct Assistant<B, D> {
    prompt:      Arc<PromptCache>,
    backend:     Arc<B>,
    validator:   SqlValidator,
    executor:    QueryExecutor<D>,
    temperature: Temperature
}

impl<B, D> Assistant<B, D>
where
    B: CompletionBackend + 'static,
    D: Database
{
    pub fn new(prompt: PromptCache, backend: B, database: D) -> Self {
        Self {
            prompt: Arc::new(prompt),
            backend: Arc::new(backend),
            validator: SqlValidator::new(),
            executor: QueryExecutor::new(database),
            temperature: Temperature::default()
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }

    /// Answer a question with a decimal integer or an error reply.
    pub async fn answer(&self, question: &str) -> String {
        tracing::info!(question, "question received");
        match self.try_answer(question).await {
            Ok(value) => {
                tracing::info!(value, "question answered");
                value.to_string()
            }
            Err(err) => {
                tracing::warn!(error = %err, "question failed");
                format!("{}: {}", ERROR_PREFIX, err)
            }
        }
    }

    /// Run the pipeline, surfacing the first failure.
    pub async fn try_answer(&self, question: &str) -> Result<i64, AnswerError> {
        let raw = self.generate(question).await?;
        tracing::debug!(raw = %raw, "model output");

        let candidate = extract_sql(&raw);
        tracing::debug!(sql = %candidate, "candidate extracted");

        if let Validation::Rejected(rejection) = self.validator.validate(&candidate) {
            return Err(AnswerError::Rejected(rejection));
        }
        Ok(self.executor.execute(&candidate).await?)
    }

    /// Load the prompt and call the model off the async runtime; both block.
    async fn generate(&self, question: &str) -> Result<String, AppError> {
        let prompt = Arc::clone(&self.prompt);
        let backend = Arc::clone(&self.backend);
        let question = question.to_owned();
        let temperature = self.temperature;
        task::spawn_blocking(move || {
            let system_prompt = prompt.get()?;
            backend.complete(&question, temperature, system_prompt)
        })
        .await
        .map_err(worker_error)?
    }
}

impl<B, D> std::fmt::Debug for Assistant<B, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("prompt", &self.prompt)
            .field("validator", &self.validator)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}
