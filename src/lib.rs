//! codepad: a terminal code playground.
//!
//! Snippets in two guest languages share one transcript contract:
//! JavaScript runs on an embedded QuickJS engine, Python on a persistent
//! interpreter worker that is located and booted asynchronously on first
//! use and then shared for the life of the process.
//!
//! Neither backend is a security boundary — guest code runs with the full
//! privileges of the host process. There is also no execution timeout: a
//! snippet that never terminates stalls the playground.

pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod execution;
pub mod printer;
pub mod process;
pub mod transcript;
pub mod tui;
