//! Output collaborators: renderers and typing signals.

use chatsim_core::Record;
use parking_lot::Mutex;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Renderer rejected record: {0}")]
    Rejected(String),
}

/// Consumer of emitted records.
pub trait Renderer: Send + Sync {
    fn render(&self, record: &Record, auto_scroll: bool) -> Result<(), RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Record, bool) -> Result<(), RenderError> + Send + Sync,
{
    fn render(&self, record: &Record, auto_scroll: bool) -> Result<(), RenderError> {
        self(record, auto_scroll)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&self, _record: &Record, _auto_scroll: bool) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Writes one JSON object per line.
pub struct JsonLinesRenderer<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Renderer for JsonLinesRenderer<W> {
    fn render(&self, record: &Record, _auto_scroll: bool) -> Result<(), RenderError> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Render `record`, logging instead of propagating errors and panics.
///
/// Returns `true` when the renderer succeeded.
pub fn render_guarded(renderer: &dyn Renderer, record: &Record, auto_scroll: bool) -> bool {
    match catch_unwind(AssertUnwindSafe(|| renderer.render(record, auto_scroll))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Renderer failed on {}: {}", record.id, e);
            false
        }
        Err(_) => {
            warn!("Renderer panicked on {}", record.id);
            false
        }
    }
}

/// "Someone is typing" indicator.
pub trait TypingSignal: Send + Sync {
    fn typing(&self, names: &[String], duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTyping;

impl TypingSignal for NoopTyping {
    fn typing(&self, _names: &[String], _duration: Duration) {}
}

/// Reports typing through the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTyping;

impl TypingSignal for LogTyping {
    fn typing(&self, names: &[String], duration: Duration) {
        info!("{} typing for {}ms", names.join(", "), duration.as_millis());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatsim_core::{EmptyDirectory, PoolConfig};
    use chatsim_generator::Synthesizer;
    use std::sync::Arc;

    fn record() -> Record {
        let config = PoolConfig::default().with_size(50);
        Synthesizer::new(config, Arc::new(EmptyDirectory)).record_at(0)
    }

    #[test]
    fn test_json_lines() {
        let renderer = JsonLinesRenderer::new(Vec::new());
        let record = record();
        renderer.render(&record, true).unwrap();
        renderer.render(&record, false).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Record = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_guarded_swallows_errors_and_panics() {
        let record = record();
        assert!(render_guarded(&NoopRenderer, &record, true));

        let failing = |_: &Record, _: bool| -> Result<(), RenderError> {
            Err(RenderError::Rejected("full".to_string()))
        };
        assert!(!render_guarded(&failing, &record, true));

        let panicking = |_: &Record, _: bool| -> Result<(), RenderError> { panic!("boom") };
        assert!(!render_guarded(&panicking, &record, true));
    }
}
