//! Analysis tasks run over every uploaded image.
//!
//! A task is a value implementing [`AnalysisTask`]. The [`TaskRegistry`] holds an ordered list
//! of tasks and runs each of them against an upload, isolating failures: a task that errors
//! is recorded in the `errors` map of the [`TaskResult`] and the remaining tasks still run.
//!
//! To add a task, implement [`AnalysisTask`] and append it in [`TaskRegistry::default_tasks`]
//! (or build a registry with [`TaskRegistry::new`]).

pub mod average_pixel;

pub use average_pixel::AveragePixel;

use crate::upload::UploadedFile;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::io::Cursor;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Read-only view of an upload handed to a single task
#[derive(Debug, Clone)]
pub struct TaskInput {
    content: Bytes,
    filename: String,
}

impl TaskInput {
    fn from_upload(file: &UploadedFile) -> Self {
        Self {
            content: file.content.clone(),
            filename: file.filename.clone(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// A fresh cursor positioned at the start of the upload
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.content.clone())
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// A single named analysis over an uploaded image
pub trait AnalysisTask: Send + Sync {
    /// Key under which the task's value (or error) is reported
    fn name(&self) -> &str;

    /// Run the analysis.
    ///
    /// `Ok(None)` means the task has nothing to report yet (for instance because the work was
    /// handed off elsewhere); it is not a failure.
    fn execute(&self, input: &TaskInput) -> anyhow::Result<Option<Value>>;
}

/// Outcome of running every registered task over one upload.
///
/// Serializes flat: each successful task is a top-level key and failures are nested under
/// `errors`, which is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(flatten)]
    pub results: Map<String, Value>,
    #[serde(default)]
    pub errors: Map<String, Value>,
}

impl TaskResult {
    pub fn to_value(&self) -> Value {
        let mut value = self.results.clone();
        value.insert("errors".to_string(), Value::Object(self.errors.clone()));
        Value::Object(value)
    }
}

/// Ordered list of analysis tasks
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<Arc<dyn AnalysisTask>>,
}

impl TaskRegistry {
    pub fn new(tasks: Vec<Arc<dyn AnalysisTask>>) -> Self {
        Self { tasks }
    }

    /// Registry with every built-in task, in execution order
    pub fn default_tasks() -> Self {
        Self::new(vec![Arc::new(AveragePixel)])
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Run every task, in registration order, over its own view of `file`.
    ///
    /// A task that returns an error or panics is reported under `errors`; the rest still run.
    pub fn process(&self, file: &UploadedFile) -> TaskResult {
        let mut outcome = TaskResult::default();

        for task in &self.tasks {
            let input = TaskInput::from_upload(file);
            let executed = catch_unwind(AssertUnwindSafe(|| task.execute(&input)))
                .unwrap_or_else(|payload| Err(anyhow::anyhow!("task panicked: {}", panic_message(payload.as_ref()))));

            match executed {
                Ok(Some(value)) if !is_empty_value(&value) => {
                    outcome.results.insert(task.name().to_string(), value);
                }
                Ok(_) => {
                    tracing::debug!(task = task.name(), "Task produced no value");
                }
                Err(e) => {
                    tracing::warn!(task = task.name(), filename = input.filename(), "Task failed: {:#}", e);
                    outcome.errors.insert(task.name().to_string(), Value::String(e.to_string()));
                }
            }
        }

        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Whether a task value counts as "nothing to report"
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
