//! Query client for the FAR RAG API (Federal Acquisition Regulation search).
//!
//! This crate owns everything between a tool invocation and the upstream
//! `/search` endpoint:
//! - transport selection (direct API key vs. RapidAPI marketplace gateway)
//! - request construction (one POST per call, `top_k` clamped server-side
//!   semantics enforced client-side)
//! - classification of the HTTP response into a [`outcome::QueryOutcome`]
//!   and its rendering into agent-readable text
//!
//! It intentionally contains **no** MCP protocol logic; the `far-oracle-mcp`
//! binary is the protocol-facing consumer.

pub mod config;
pub mod outcome;
pub mod query;
