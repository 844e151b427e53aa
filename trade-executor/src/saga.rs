//! Ordered multi-store mutations with compensating actions

use common::error::{Error, Result};
use futures::future::BoxFuture;
use tracing::{debug, error, info};

/// A lazily started step action
pub type Action<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a>;

struct Step<'a> {
    name: &'static str,
    forward: Action<'a>,
    compensate: Option<Action<'a>>,
}

/// Ordered list of (forward, compensation) pairs run by [`Saga::run`].
///
/// Forward actions run one at a time in insertion order; nothing starts until
/// the previous step succeeded. On the first failure the compensations of the
/// already completed steps run newest first. If every compensation succeeds
/// the original failure is returned with the step name as context. If any
/// compensation fails the result is [`Error::InconsistentState`].
pub struct Saga<'a> {
    label: String,
    steps: Vec<Step<'a>>,
}

impl<'a> Saga<'a> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step that can be undone
    pub fn step<F, C>(mut self, name: &'static str, forward: F, compensate: C) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a,
        C: FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a,
    {
        self.steps.push(Step {
            name,
            forward: Box::new(forward),
            compensate: Some(Box::new(compensate)),
        });
        self
    }

    /// Append a step with nothing to undo. Only useful as the last step.
    pub fn final_step<F>(mut self, name: &'static str, forward: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a,
    {
        self.steps.push(Step {
            name,
            forward: Box::new(forward),
            compensate: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step, compensating on the first failure
    pub async fn run(self) -> Result<()> {
        let Saga { label, steps } = self;
        let mut completed: Vec<(&'static str, Option<Action<'a>>)> = Vec::with_capacity(steps.len());

        for step in steps {
            debug!(saga = %label, step = step.name, "Running saga step");

            if let Err(err) = (step.forward)().await {
                error!(saga = %label, step = step.name, error = %err, "Saga step failed, compensating");
                return Err(unwind(&label, step.name, err, completed).await);
            }

            completed.push((step.name, step.compensate));
        }

        debug!(saga = %label, "Saga completed");
        Ok(())
    }
}

async fn unwind(
    label: &str,
    failed_step: &'static str,
    cause: Error,
    completed: Vec<(&'static str, Option<Action<'_>>)>,
) -> Error {
    let mut compensation_failures = Vec::new();

    for (name, compensate) in completed.into_iter().rev() {
        let Some(compensate) = compensate else {
            continue;
        };

        match compensate().await {
            Ok(()) => info!(saga = %label, step = name, "Compensated saga step"),
            Err(comp_err) => {
                error!(
                    saga = %label,
                    step = name,
                    failed_step,
                    cause = %cause,
                    error = %comp_err,
                    "DOUBLE FAULT: compensation failed, durable state is inconsistent and needs manual reconciliation"
                );
                compensation_failures.push(format!("{}: {}", name, comp_err));
            }
        }
    }

    if compensation_failures.is_empty() {
        return cause.context(format!("{} aborted at step '{}'", label, failed_step));
    }

    Error::InconsistentState(format!(
        "{}: step '{}' failed ({}) and compensation failed ({})",
        label,
        failed_step,
        cause,
        compensation_failures.join("; ")
    ))
}
