//! Command core - natural-language commands for a social feed
//!
//! Turns a free-text request plus a generative backend's reply into a typed
//! intent, runs the matching action, and resolves vague references to posts
//! and users with typo-tolerant fuzzy matching.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod matcher;
mod memory;
pub mod parser;
pub mod processor;
pub mod prompt;
pub mod resolver;
pub mod similarity;
pub mod store;
pub mod types;

pub use config::{CommandConfig, ConfigError};
pub use dispatcher::{ActionDispatcher, Command, PostTarget};
pub use error::{CommandError, GenerationError, StoreError};
pub use matcher::{find_users, find_users_with, UserMatchResult};
pub use parser::IntentParser;
pub use processor::CommandProcessor;
pub use resolver::{find_post, NotFoundReason, ResolveError};
pub use similarity::similarity;
pub use store::{
    InMemorySocialStore, NoopNotifier, PostFilter, RealtimeNotifier, SocialStore, TextGenerator,
};
pub use types::*;

// Python bindings
#[cfg(feature = "python")]
pub mod py;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn command_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyUserMatcher>()?;
    m.add_class::<PyIntentParser>()?;
    m.add_function(wrap_pyfunction!(py_similarity, m)?)?;
    Ok(())
}
