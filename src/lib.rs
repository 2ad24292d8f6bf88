pub mod abc;
pub mod commands;
pub mod composer;
pub mod datasets;
pub mod dictionary;
pub mod export;
pub mod gemini;
pub mod http;
pub mod library;
pub mod model;
pub mod prompts;
pub mod runtime;
pub mod studio;
