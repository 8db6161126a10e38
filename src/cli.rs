use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// NL SQL Bridge - Answer analytics questions with validated, read-only SQL
#[derive(Parser, Debug)]
#[command(name = "nl-sql-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// Question in natural language
        question: String,

        #[command(flatten)]
        model: ModelArgs,

        /// Postgres connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>
    },
    /// Answer questions read line by line from stdin, concurrently
    Serve {
        #[command(flatten)]
        model: ModelArgs,

        /// Postgres connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>
    },
    /// Extract and validate SQL without calling the model or the database
    Check {
        /// Raw model output or SQL (use - for stdin)
        #[arg(default_value = "-")]
        input: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

/// Model selection shared by commands that call the LLM
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// LLM provider to use
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// API key for OpenAI, Anthropic or YandexGPT
    #[arg(short, long)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long)]
    pub ollama_url: Option<String>,

    /// YandexGPT folder id
    #[arg(long)]
    pub folder_id: Option<String>,

    /// Sampling temperature in [0, 1]
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// System prompt file
    #[arg(long)]
    pub prompt: Option<PathBuf>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama,
    Yandex
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2",
            Self::Yandex => "yandexgpt-lite"
        }
    }

    /// Parse a provider name from configuration
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" | "open-ai" => Some(Self::OpenAI),
            "anthropic" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            "yandex" | "yandexgpt" => Some(Self::Yandex),
            _ => None
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Text,
    Json
}
