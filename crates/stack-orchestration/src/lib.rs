//! # Stack Orchestration
//!
//! Lifecycle management for Docker stacks driven through the `docker` CLI.
//!
//! A [`Stack`] is a named group of services declared across one or more
//! compose files. Deploy and teardown are not fire-and-forget: each
//! transition issues the docker command and then confirms its effect by
//! polling the CLI's textual output against expected patterns, retrying with
//! a pause until the expectation holds or the budget runs out.
//!
//! ## Example
//!
//! ```no_run
//! use stack_orchestration::Stack;
//!
//! # async fn example() -> stack_orchestration::Result<()> {
//! let stack = Stack::builder(["docker-compose.yml"])
//!     .name("demo")
//!     .build()?;
//!
//! stack.deploy().await?;
//! stack.logs("web", false).await?;
//! stack.teardown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod progress;
mod stack;

pub use config::{parse_file, parse_str, ConfigError, StackDefinition};
pub use progress::Progress;
pub use stack::{Stack, StackBuilder};

// Re-exported so callers can override check budgets without depending on the
// executor crate directly.
pub use command_validator::RetryPolicy;

/// Error types for stack lifecycle operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The stack was expected to be running but its services never appeared
    #[error("stack '{stack}' is not deployed; last status output:\n{output}")]
    NotDeployed {
        /// Stack name
        stack: String,
        /// Last captured status output
        output: String,
    },

    /// The stack was expected to be absent but its services are still listed
    #[error("stack '{stack}' is deployed; last status output:\n{output}")]
    IsDeployed {
        /// Stack name
        stack: String,
        /// Last captured status output
        output: String,
    },

    /// The deploy command never reported creation of every service
    #[error("error while deploying stack '{stack}'; output:\n\n{output}")]
    DeployFailed {
        /// Stack name
        stack: String,
        /// Captured output of the last deploy attempt
        output: String,
    },

    /// The removal command never reported removal of every service
    #[error("error while tearing down stack '{stack}'; output:\n\n{output}")]
    TeardownFailed {
        /// Stack name
        stack: String,
        /// Captured output of the last removal attempt
        output: String,
    },

    /// No services declared across the definition documents
    #[error("stack '{stack}' declares no services")]
    NoComponents {
        /// Stack name
        stack: String,
    },

    /// Definition document error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command execution error
    #[error("command execution error: {0}")]
    Executor(#[from] command_validator::Error),
}

/// Result type for stack lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;
