//! Forwarding of container output to `tracing`.

use crate::request::LogSource;
use futures::future::{BoxFuture, FutureExt};
use testcontainers::core::logs::consumer::LogConsumer;
use testcontainers::core::logs::LogFrame;

/// Tracing target for forwarded container output.
pub const LOG_TARGET: &str = "oxia_testcontainers::container";

/// Emits every line a container writes as an info-level `tracing` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogForwarder {
    label: String,
}

impl LogForwarder {
    /// Create a forwarder that prefixes lines with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Label prepended to each forwarded line.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Forward a single line.
    pub fn forward(&self, source: LogSource, line: &str) {
        tracing::info!(target: LOG_TARGET, "[{}] {}: {}", self.label, source, line);
    }

    /// Forward a raw frame, one event per non-empty line.
    pub fn forward_bytes(&self, source: LogSource, bytes: &[u8]) {
        for line in split_lines(bytes) {
            self.forward(source, &line);
        }
    }
}

impl LogConsumer for LogForwarder {
    fn accept<'a>(&'a self, record: &'a LogFrame) -> BoxFuture<'a, ()> {
        async move {
            match record {
                LogFrame::StdOut(bytes) => self.forward_bytes(LogSource::Stdout, bytes),
                LogFrame::StdErr(bytes) => self.forward_bytes(LogSource::Stderr, bytes),
            }
        }
        .boxed()
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[test]
    fn test_split_lines() {
        let lines = split_lines(b"first\r\n\nsecond\n   \nthird");
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_split_lines_invalid_utf8() {
        let lines = split_lines(b"ok \xff\xfe line\n");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("ok "));
        assert!(lines[0].ends_with(" line"));
    }

    #[test]
    fn test_label() {
        let forwarder = LogForwarder::new("oxia-standalone");
        assert_eq!(forwarder.label(), "oxia-standalone");
    }

    #[test]
    fn test_accept_frames() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Recorder(events.clone()));
        let forwarder = LogForwarder::new("oxia-standalone");

        tracing::subscriber::with_default(subscriber, || {
            futures::executor::block_on(async {
                forwarder
                    .accept(&LogFrame::StdOut("first\n\nStarted Grpc server\n".into()))
                    .await;
                forwarder.accept(&LogFrame::StdErr("warning\n".into())).await;
            })
        });

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|(level, target, _)| *level == Level::INFO && target == LOG_TARGET));

        let messages: Vec<&str> = events.iter().map(|(_, _, m)| m.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "[oxia-standalone] stdout: first",
                "[oxia-standalone] stdout: Started Grpc server",
                "[oxia-standalone] stderr: warning",
            ]
        );
    }

    /// Records (level, target, message) of every event.
    struct Recorder(Arc<Mutex<Vec<(Level, String, String)>>>);

    impl<S: Subscriber> Layer<S> for Recorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut message = MessageVisitor(String::new());
            event.record(&mut message);
            let metadata = event.metadata();
            self.0.lock().unwrap().push((
                *metadata.level(),
                metadata.target().to_string(),
                message.0,
            ));
        }
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }
}
