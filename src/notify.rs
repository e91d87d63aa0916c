//! Failure notification sink.
//!
//! Every failed API call is reported here exactly once before the error is
//! returned to the caller.

/// Receives one human-readable message per failed request.
pub trait FailureSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Prints failures to stderr. The client has already logged them at warn.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl FailureSink for ConsoleSink {
    fn report(&self, message: &str) {
        eprintln!("request failed: {}", message);
    }
}

/// Collects reported messages (tests).
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl FailureSink for RecordingSink {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
