//! Brix library - orchestration, builtin plugins and CLI commands
//!
//! The [`orchestrator::Orchestrator`] acquires plugins through a
//! [`brix_plugins::DispatchingPluginLoader`], feeds their contributions to an
//! [`brix_graph::ExecutionEngine`] and drives the build lifecycle.

pub mod builtin;
pub mod commands;
pub mod common;
pub mod errors;
pub mod orchestrator;
pub mod registry;

pub use brix_logger as logger;
pub use common::GlobalOpts;
