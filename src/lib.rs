//! # NL SQL Bridge Library
//!
//! Natural-language analytics questions answered with model-generated,
//! read-only validated SQL.

pub mod app;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod llm;
pub mod output;
pub mod prompt;
pub mod schema;
pub mod validator;
