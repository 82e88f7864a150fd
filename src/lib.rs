// Nexus client - session, view-model store and actions for a social feed

// Core types and pure helpers
pub mod core;

// Local copies of remote rows
pub mod entities;

// Remote collaborator and the plumbing around it
pub mod infrastructure;

// Session cache, view-model store, UI state, optimistic updates
pub mod state;

// Every loader and action
pub mod client;

// Serializable page projections
pub mod views;

// HTTP shell
pub mod app_state;
pub mod shell;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use client::{NexusClient, RequestOutcome};
pub use error::{AppError, AppResult};
