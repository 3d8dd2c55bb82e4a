//! Error-Reporting Collaborator
//!
//! Every failure raised by a linking callback is caught and handed to the
//! compiler's exception handler; linking then continues with the remaining
//! callbacks and children. The handler is the one observability channel the
//! compiler has.

use std::cell::RefCell;

/// Receives every recovered callback failure.
pub trait ExceptionHandler {
    fn handle(&self, error: anyhow::Error);
}

/// Default handler: writes the failure chain to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrExceptionHandler;

impl ExceptionHandler for StderrExceptionHandler {
    fn handle(&self, error: anyhow::Error) {
        eprintln!("linking callback failed: {error:#}");
    }
}

/// Keeps every reported failure for later inspection. Meant for tests and
/// tooling that assert on the reporting channel.
#[derive(Default)]
pub struct CollectingExceptionHandler {
    errors: RefCell<Vec<anyhow::Error>>,
}

impl CollectingExceptionHandler {
    pub fn new() -> CollectingExceptionHandler {
        CollectingExceptionHandler::default()
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    /// Drain the collected failures.
    pub fn take(&self) -> Vec<anyhow::Error> {
        self.errors.borrow_mut().drain(..).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors
            .borrow()
            .iter()
            .map(|error| error.to_string())
            .collect()
    }
}

impl ExceptionHandler for CollectingExceptionHandler {
    fn handle(&self, error: anyhow::Error) {
        self.errors.borrow_mut().push(error);
    }
}
