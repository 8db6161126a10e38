//! Application logic for the NL SQL Bridge CLI.
//!
//! This module contains the core application logic separated from the main
//! entry point to enable testing.

use std::{
    io::{self, Read},
    sync::Arc
};

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::JoinSet
};

use crate::{
    assistant::Assistant,
    cli::{Format, ModelArgs, Provider},
    config::Config,
    error::{AppResult, config_error, file_read_error},
    executor::Database,
    extract::extract_sql,
    llm::{CompletionBackend, LlmProvider, Temperature},
    output::{CheckReport, OutputFormat},
    prompt::{FilePromptSource, PromptCache},
    validator::SqlValidator
};

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Exit code of the check command
pub fn check_exit_code(report: &CheckReport) -> i32 {
    if report.accepted { 0 } else { 2 }
}

/// Read input from the argument itself or stdin when it is "-"
pub fn read_check_input(input: &str) -> AppResult<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        Ok(input.to_string())
    }
}

/// Extract and validate raw model output
pub fn run_check(raw: &str) -> CheckReport {
    let sql = extract_sql(raw);
    let validation = SqlValidator::new().validate(&sql);
    CheckReport::new(sql, &validation)
}

/// Resolve the LLM provider from CLI arguments and configuration
pub fn resolve_provider(args: &ModelArgs, config: &Config) -> AppResult<LlmProvider> {
    let provider = match (args.provider, &config.llm.provider) {
        (Some(provider), _) => provider,
        (None, Some(name)) => Provider::from_name(name)
            .ok_or_else(|| config_error(format!("Unknown LLM provider '{}'", name)))?,
        (None, None) => Provider::Yandex
    };
    let api_key = args.api_key.clone().or_else(|| config.llm.api_key.clone());
    let model = args
        .model
        .clone()
        .or_else(|| config.llm.model.clone())
        .unwrap_or_else(|| provider.default_model().to_string());

    Ok(match provider {
        Provider::OpenAI => LlmProvider::OpenAI {
            api_key: api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?,
            model
        },
        Provider::Anthropic => LlmProvider::Anthropic {
            api_key: api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?,
            model
        },
        Provider::Ollama => LlmProvider::Ollama {
            base_url: args
                .ollama_url
                .clone()
                .or_else(|| config.llm.ollama_url.clone())
                .unwrap_or_else(|| String::from("http://localhost:11434")),
            model
        },
        Provider::Yandex => LlmProvider::Yandex {
            api_key: api_key.ok_or_else(|| {
                config_error("API key required for YandexGPT (use --api-key or YANDEX_API_KEY)")
            })?,
            folder_id: args
                .folder_id
                .clone()
                .or_else(|| config.llm.folder_id.clone())
                .ok_or_else(|| {
                    config_error("Folder id required for YandexGPT (use --folder-id or YANDEX_FOLDER_ID)")
                })?,
            model
        }
    })
}

/// Resolve the sampling temperature, defaulting to the low SQL setting
pub fn resolve_temperature(args: &ModelArgs, config: &Config) -> AppResult<Temperature> {
    match args.temperature.or(config.llm.temperature) {
        Some(value) => Temperature::new(value),
        None => Ok(Temperature::default())
    }
}

/// Prompt cache over the configured file, or the installed one
pub fn resolve_prompt(args: &ModelArgs, config: &Config) -> PromptCache {
    let source = match args.prompt.clone().or_else(|| config.prompt.path.clone()) {
        Some(path) => FilePromptSource::new(path),
        None => FilePromptSource::installed()
    };
    PromptCache::new(source)
}

/// Resolve the database URL from the CLI argument and configuration
pub fn resolve_database_url(arg: Option<String>, config: &Config) -> AppResult<String> {
    arg.or_else(|| config.database.url.clone()).ok_or_else(|| {
        config_error("Database URL required (use --database-url, DATABASE_URL or POSTGRES_DB)")
    })
}

/// Answer every non-empty line of `input` as an independent task.
///
/// `reply` is called once per question with its 1-based line number, in
/// completion order. Returns the number of questions handled. A read error
/// is returned only after every question already read has been answered.
pub async fn serve_lines<R, B, D, F>(
    input: R,
    assistant: Arc<Assistant<B, D>>,
    reply: F
) -> AppResult<usize>
where
    R: AsyncBufRead + Unpin,
    B: CompletionBackend + 'static,
    D: Database + 'static,
    F: Fn(usize, &str)
{
    let mut lines = input.lines();
    let mut tasks = JoinSet::new();
    let mut line_no = 0;
    let mut handled = 0;
    let mut read_error = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        read_error = Some(file_read_error("stdin", e));
                        break;
                    }
                };
                line_no += 1;
                let question = line.trim().to_string();
                if question.is_empty() {
                    continue;
                }
                let assistant = Arc::clone(&assistant);
                let id = line_no;
                tasks.spawn(async move { (id, assistant.answer(&question).await) });
            }
            Some(done) = tasks.join_next(), if !tasks.is_empty() => {
                handled += deliver(done, &reply);
            }
        }
    }

    // Questions already read are still answered when input fails.
    while let Some(done) = tasks.join_next().await {
        handled += deliver(done, &reply);
    }
    match read_error {
        Some(err) => Err(err),
        None => Ok(handled)
    }
}

fn deliver(
    done: Result<(usize, String), tokio::task::JoinError>,
    reply: &impl Fn(usize, &str)
) -> usize {
    match done {
        Ok((id, text)) => {
            reply(id, &text);
            1
        }
        Err(e) => {
            tracing::error!(error = %e, "question task failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ModelArgs {
        ModelArgs {
            provider:    None,
            api_key:     None,
            model:       None,
            ollama_url:  None,
            folder_id:   None,
            temperature: None,
            prompt:      None
        }
    }

    #[test]
    fn test_default_provider_is_yandex() {
        let mut config = Config::default();
        config.llm.api_key = Some("key".into());
        config.llm.folder_id = Some("folder".into());
        let provider = resolve_provider(&args(), &config).unwrap();
        match provider {
            LlmProvider::Yandex {
                folder_id,
                model,
                ..
            } => {
                assert_eq!(folder_id, "folder");
                assert_eq!(model, "yandexgpt-lite");
            }
            other => panic!("unexpected provider {:?}", other)
        }
    }

    #[test]
    fn test_yandex_requires_folder() {
        let mut config = Config::default();
        config.llm.api_key = Some("key".into());
        assert!(resolve_provider(&args(), &config).is_err());
    }

    #[test]
    fn test_cli_provider_overrides_config() {
        let mut config = Config::default();
        config.llm.provider = Some("openai".into());
        let mut cli = args();
        cli.provider = Some(Provider::Ollama);
        cli.model = Some("codellama".into());
        let provider = resolve_provider(&cli, &config).unwrap();
        assert!(matches!(
            provider,
            LlmProvider::Ollama { ref model, .. } if model == "codellama"
        ));
    }

    #[test]
    fn test_unknown_config_provider() {
        let mut config = Config::default();
        config.llm.provider = Some("bard".into());
        assert!(resolve_provider(&args(), &config).is_err());
    }

    #[test]
    fn test_temperature_resolution() {
        let mut config = Config::default();
        assert_eq!(
            resolve_temperature(&args(), &config).unwrap(),
            Temperature::default()
        );
        config.llm.temperature = Some(0.5);
        assert_eq!(resolve_temperature(&args(), &config).unwrap().value(), 0.5);
        let mut cli = args();
        cli.temperature = Some(2.0);
        assert!(resolve_temperature(&cli, &config).is_err());
    }

    #[test]
    fn test_check_exit_codes() {
        assert_eq!(check_exit_code(&run_check("SELECT 1")), 0);
        assert_eq!(check_exit_code(&run_check("DELETE FROM videos")), 2);
    }

    #[test]
    fn test_database_url_missing() {
        assert!(resolve_database_url(None, &Config::default()).is_err());
        assert_eq!(
            resolve_database_url(Some("postgres://x".into()), &Config::default()).unwrap(),
            "postgres://x"
        );
    }
}
