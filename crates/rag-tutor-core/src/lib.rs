//! Core types, config, errors, and transcript store for RAG Tutor.

pub mod config;
pub mod error;
pub mod session;
pub mod transcript;
pub mod types;
