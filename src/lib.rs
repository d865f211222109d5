//! pms - InsureTech Project Management Library
//!
//! Core of the `pms` console for the AI claims review automation project:
//! role-gated views over the project dashboard, a Kanban board, the product
//! backlog, phase tracking and an AI assistant, backed by the PMS REST API
//! with a sample-data fallback when the backend is unreachable.
//!
//! # Core Concepts
//!
//! - **Roles**: eight project roles, each with a fixed menu of views
//! - **Fallback**: every API call degrades to sample data and says so
//! - **Sessions**: a login persisted in the state directory
//!
//! # Module Organization
//!
//! - `api`: REST client, wire types and sample data
//! - `assistant`: AI chat conversation and canned replies
//! - `backlog`: product backlog stories and ranking
//! - `board`: Kanban columns and task cards
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml` / `.pms.toml`
//! - `dashboard`: dashboard statistics and role-specific layout
//! - `error`: Error types and result aliases
//! - `output`: human and JSON output envelopes
//! - `permission`: role permission matrix
//! - `phase`: project phases, deliverables and KPIs
//! - `role`: roles, views and capability gates
//! - `session`: login, session persistence and role resolution
//! - `ui`: terminal dashboard built on ratatui

pub mod api;
pub mod assistant;
pub mod backlog;
pub mod board;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod output;
pub mod permission;
pub mod phase;
pub mod role;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
