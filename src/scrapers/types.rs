use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

type Callback = dyn Fn(&str) + Send + Sync;

/// Fire-and-forget progress notifications for whoever drives a scrape
#[derive(Clone, Default)]
pub struct ProgressSink {
    callback: Option<Arc<Callback>>,
}

impl ProgressSink {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// A sink that only logs
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        debug!(progress = message);
        if let Some(callback) = &self.callback {
            callback(message);
        }
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Shared "keep going" flag, checked between cities
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Ask the run to stop before the next city
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_sink_forwards_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            ProgressSink::new(move |msg| seen.lock().unwrap().push(msg.to_string()))
        };
        sink.emit("first");
        sink.clone().emit(String::from("second"));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_silent_sink_does_nothing() {
        ProgressSink::silent().emit("ignored");
    }

    #[test]
    fn test_run_flag_shared_between_clones() {
        let flag = RunFlag::new();
        let handle = flag.clone();
        assert!(flag.is_running());
        handle.stop();
        assert!(!flag.is_running());
        flag.resume();
        assert!(handle.is_running());
    }
}
