//! Python bindings for the matching and parsing core using PyO3

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::MatcherConfig;
use crate::matcher::find_users_with;
use crate::parser::IntentParser;
use crate::similarity::similarity;
use crate::types::UserSummary;

/// Similarity between two strings (Python function)
#[pyfunction]
pub fn py_similarity(a: &str, b: &str) -> f64 {
    similarity(a, b)
}

/// Python wrapper for the user matcher over an in-process directory
#[pyclass]
pub struct PyUserMatcher {
    directory: Vec<UserSummary>,
    config: MatcherConfig,
}

#[pymethods]
impl PyUserMatcher {
    #[new]
    #[pyo3(signature = (threshold = None, max_results = None))]
    fn new(threshold: Option<f64>, max_results: Option<usize>) -> Self {
        let mut config = MatcherConfig::default();
        if let Some(threshold) = threshold {
            config.threshold = threshold;
        }
        if let Some(max_results) = max_results {
            config.max_results = max_results;
        }
        Self {
            directory: Vec::new(),
            config,
        }
    }

    #[pyo3(signature = (id, username, name = None))]
    fn add_user(&mut self, id: String, username: String, name: Option<String>) {
        let mut user = UserSummary::new(id, username);
        user.name = name;
        self.directory.push(user);
    }

    /// Ranked matches as a list of dicts
    fn find<'py>(&self, query: &str, py: Python<'py>) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let result = find_users_with(query, &self.directory, &self.config);
        let label = result.confidence.map(|c| c.as_str());

        result
            .matches
            .iter()
            .map(|m| -> PyResult<Bound<'py, PyDict>> {
                let dict = PyDict::new_bound(py);
                dict.set_item("id", m.user.id.as_str())?;
                dict.set_item("username", &m.user.username)?;
                dict.set_item("name", m.user.name.as_deref())?;
                dict.set_item("tier", format!("{:?}", m.tier).to_lowercase())?;
                dict.set_item("score", m.score)?;
                dict.set_item("confidence", label)?;
                Ok(dict)
            })
            .collect()
    }

    fn clear(&mut self) {
        self.directory.clear();
    }

    fn len(&self) -> usize {
        self.directory.len()
    }
}

/// Python wrapper for the intent parser
#[pyclass]
pub struct PyIntentParser {
    parser: IntentParser,
}

#[pymethods]
impl PyIntentParser {
    #[new]
    fn new() -> Self {
        Self {
            parser: IntentParser::new(),
        }
    }

    /// Parse a backend reply; returns the intent as a JSON string
    fn parse(&self, raw: &str) -> PyResult<String> {
        let intent = self.parser.parse(raw);
        serde_json::to_string(&intent)
            .map_err(|e| PyValueError::new_err(format!("Failed to serialize intent: {}", e)))
    }
}
