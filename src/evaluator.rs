//! The host's evaluate-script seam.
//!
//! The windowing host owns the embedded renderer and exposes a primitive
//! that evaluates script source inside the page (WebKitGTK's
//! `run_javascript`, wry's `evaluate_script`, and so on). The bridge only
//! ever talks to that primitive through this trait; it never inspects the
//! evaluation result.

/// Host-provided primitive that evaluates script source in the page.
pub trait ScriptEvaluator: Send + Sync {
    /// Evaluate `script` in the script environment.
    ///
    /// The bridge does not depend on the evaluation result; implementations
    /// may run the script asynchronously.
    fn evaluate(&self, script: &str);
}

impl<F> ScriptEvaluator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn evaluate(&self, script: &str) {
        self(script);
    }
}

/// Evaluator that discards every snippet. Useful for headless hosts and
/// tests that only observe metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEvaluator;

impl ScriptEvaluator for NullEvaluator {
    fn evaluate(&self, _script: &str) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ScriptEvaluator;
    use parking_lot::Mutex;

    /// Records every evaluated snippet for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingEvaluator {
        scripts: Mutex<Vec<String>>,
    }

    impl RecordingEvaluator {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn scripts(&self) -> Vec<String> {
            self.scripts.lock().clone()
        }
    }

    impl ScriptEvaluator for RecordingEvaluator {
        fn evaluate(&self, script: &str) {
            self.scripts.lock().push(script.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_null_evaluator_accepts_anything() {
        NullEvaluator.evaluate("window.x = 1;");
    }

    #[test]
    fn test_closures_are_evaluators() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let evaluator = move |_script: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        };

        evaluator.evaluate("a");
        evaluator.evaluate("b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_recording_evaluator_captures_in_order() {
        let evaluator = testing::RecordingEvaluator::new();
        evaluator.evaluate("first");
        evaluator.evaluate("second");
        assert_eq!(evaluator.scripts(), vec!["first", "second"]);
    }
}
