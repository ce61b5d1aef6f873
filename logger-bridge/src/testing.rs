// In-memory sinks for unit tests
use crate::dispatcher::{Dispatcher, SinkSet};
use crate::sink::Sink;
use log_config::LoggingConfig;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[derive(Clone, Default)]
pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

pub(crate) struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.0))
    }
}

pub(crate) fn dispatch(dispatcher: Dispatcher) -> Dispatch {
    Dispatch::new(Registry::default().with(dispatcher))
}

pub(crate) fn capture(config: &LoggingConfig) -> (Dispatch, Capture, SinkSet) {
    capture_with(config, None)
}

pub(crate) fn capture_with(
    config: &LoggingConfig,
    script_name: Option<&str>,
) -> (Dispatch, Capture, SinkSet) {
    let output = Capture::default();
    let sinks = SinkSet::new(vec![Sink::with_writer("capture", config, output.clone())]);
    let dispatcher = Dispatcher::new(sinks.clone()).with_script_name(script_name);
    (dispatch(dispatcher), output, sinks)
}
