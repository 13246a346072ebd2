//! # Pathlog Architecture
//!
//! Pathlog is a small command-line tool skeleton: it runs one subcommand, then
//! processes a list of paths, printing each and appending it to a durable log
//! that survives across invocations. At most one instance runs at a time.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Binary (main.rs)                                           │
//! │  - Tracing setup, Ctrl+C hook, error lines and exit codes   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Orchestrator (run.rs)                                      │
//! │  guard → resolve command → open log → handler → paths → flush│
//! └─────────────────────────────────────────────────────────────┘
//!          │              │               │              │
//!          ▼              ▼               ▼              ▼
//!      guard.rs      command.rs      path_log.rs      tree.rs
//!   (single-instance (prefix         (store/ shelf    (lazy directory
//!    flock)           resolution)     backends)        enumeration)
//! ```
//!
//! ## Key Principle: No Process Control in the Library
//!
//! Library code returns `Result<T, PathlogError>` and writes only to the
//! `Write` sink it is handed. It never calls `std::process::exit` and never
//! writes to stderr; the binary decides how each error is shown.
//!
//! ## Configuration
//!
//! A [`config::RunConfig`] is built once from the command line and passed by
//! reference. There is no global configuration.
//!
//! ## Module Overview
//!
//! - [`run`]: the orchestrator and its state machine
//! - [`guard`]: execution guard (one live instance per binary)
//! - [`command`]: command registry and prefix resolution
//! - [`handlers`]: subcommand handlers
//! - [`path_log`]: the durable, append-only path log
//! - [`store`]: key-value shelf abstraction and backends
//! - [`tree`]: lazy recursive directory enumeration
//! - [`pathinfo`]: basename / absolute path records
//! - [`cli`]: clap argument grammar
//! - [`config`]: run configuration
//! - [`interrupt`]: Ctrl+C flag
//! - [`error`]: error types

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod interrupt;
pub mod path_log;
pub mod pathinfo;
pub mod run;
pub mod store;
pub mod tree;
