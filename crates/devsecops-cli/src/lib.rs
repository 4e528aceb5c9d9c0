//! # DevSecOps CLI Library
//!
//! Command-line front end for the pipeline builder, the threat modeler and
//! the security checklist. Runs single commands or an interactive shell that
//! keeps model state between commands.

pub mod commands;
pub mod config;
pub mod interactive;

pub use commands::*;
pub use config::*;
pub use interactive::*;
