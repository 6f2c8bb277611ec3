//! Bulk render of the first records of a source.

use crate::render::{render_guarded, Renderer};
use chatsim_pool::RecordSource;
use tracing::{debug, warn};

/// Records rendered by [`inject_initial`] when no count is given.
pub const DEFAULT_INJECT_COUNT: usize = 40;

/// Outcome of an [`inject_initial`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectSummary {
    pub rendered: usize,
    pub failed: usize,
}

/// Render the first `min(total, count)` records with auto-scroll off.
///
/// Renderer failures are logged and counted; they never stop the run.
pub fn inject_initial(
    source: &dyn RecordSource,
    renderer: &dyn Renderer,
    count: usize,
) -> InjectSummary {
    let limit = match source.total_size() {
        Some(total) => (count as u64).min(total),
        None => count as u64,
    };

    let mut summary = InjectSummary::default();
    for index in 0..limit {
        let Some(record) = source.fetch(index) else {
            break;
        };
        if render_guarded(renderer, &record, false) {
            summary.rendered += 1;
        } else {
            summary.failed += 1;
        }
    }

    if summary.failed > 0 {
        warn!(
            "Injected {} records, {} failed to render",
            summary.rendered, summary.failed
        );
    } else {
        debug!("Injected {} records", summary.rendered);
    }
    summary
}
