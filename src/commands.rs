//! Command implementations behind the CLI.

use crate::args::{CommonGenerateArgs, PeopleArgs, StreamArgs, ViewArgs};
use anyhow::Context;
use chatsim_core::Record;
use chatsim_generator::{Synthesizer, SyntheticPeople};
use chatsim_pool::{
    estimate_for_duration, materialize_in_background, EstimateParams, MessagePool, PagedView,
    RecordSource, ViewInfo, ViewOptions,
};
use chatsim_stream::{
    inject_initial, Emitter, JsonLinesRenderer, LogTyping, StreamOptions, TokioScheduler,
    TypingOptions,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Materialize off the async runtime's worker threads.
pub async fn materialize(common: &CommonGenerateArgs) -> anyhow::Result<MessagePool> {
    let config = common.to_config()?;
    let directory = common.directory();
    info!(
        "Generating {} records (seed base {}, {} senders)",
        config.size,
        config.seed_base,
        directory.len()
    );
    materialize_in_background(config, directory)
        .await
        .context("Materialization task failed")
}

/// `generate`: materialize, optionally save, print statistics.
pub async fn run_generate(
    common: CommonGenerateArgs,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let pool = materialize(&common).await?;
    if let Some(path) = output {
        let written = pool
            .export_to_file(path, 0, None)
            .with_context(|| format!("Failed to write pool to {path:?}"))?;
        info!("Wrote {} records to {:?}", written, path);
    }
    print_json(pool.stats())
}

/// `export`: write `[start, end)` of a materialized pool.
pub async fn run_export(
    common: CommonGenerateArgs,
    start: usize,
    end: Option<usize>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let pool = materialize(&common).await?;
    match output {
        Some(path) => {
            let written = pool
                .export_to_file(path, start, end)
                .with_context(|| format!("Failed to export to {path:?}"))?;
            info!("Exported {} records to {:?}", written, path);
        }
        None => {
            let json = pool.export_json(start, end).context("Failed to export")?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PageOutput {
    pub info: ViewInfo,
    pub records: Vec<Record>,
}

/// Build the view selected by the flags.
pub async fn build_view(common: &CommonGenerateArgs, view: &ViewArgs) -> anyhow::Result<PagedView> {
    let options = ViewOptions::new(view.page_size, view.cache_pages).with_wrap(view.wrap);
    if view.materialize {
        let pool = materialize(common).await?;
        Ok(PagedView::over_pool(Arc::new(pool), options))
    } else {
        let synthesizer = Synthesizer::new(common.to_config()?, common.directory());
        Ok(PagedView::over_synthesizer(Arc::new(synthesizer), options))
    }
}

/// `page`: read consecutive pages through a paged view.
pub async fn run_page(
    common: CommonGenerateArgs,
    view: ViewArgs,
    start: u64,
    pages: usize,
) -> anyhow::Result<()> {
    let paged = build_view(&common, &view).await?;
    let records = paged.prefetch(start, pages).into_iter().flatten().collect();
    print_json(&PageOutput {
        info: paged.info(),
        records,
    })
}

/// `stream`: emit JSON lines until `count` records or Ctrl-C.
pub async fn run_stream(common: CommonGenerateArgs, stream: StreamArgs) -> anyhow::Result<()> {
    let pool = Arc::new(materialize(&common).await?);
    let renderer = Arc::new(JsonLinesRenderer::new(io::stdout()));

    let mut injected = 0;
    if stream.inject > 0 {
        let summary = inject_initial(pool.as_ref(), renderer.as_ref(), stream.inject);
        info!("Injected {} initial records", summary.rendered);
        injected = summary.rendered + summary.failed;
    }

    let mut options = StreamOptions::default()
        .with_rate(stream.rate)
        .with_start_index(stream_start(stream.start_index, injected))
        .with_seed(stream.stream_seed)
        .with_typing(TypingOptions {
            fraction: stream.typing_fraction.clamp(0.0, 1.0),
            ..TypingOptions::default()
        });
    if let Some(jitter) = stream.jitter_ms {
        options = options.with_jitter_ms(jitter);
    }

    let scheduler = TokioScheduler::try_current().context("No tokio runtime for the stream")?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let emitter = Emitter::builder(pool.clone(), Arc::new(scheduler))
        .renderer(renderer)
        .typing(Arc::new(LogTyping))
        .observer(move |_, index| {
            let _ = tx.send(index);
        })
        .options(options)
        .build();

    emitter.start();
    let mut emitted = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            index = rx.recv() => {
                if index.is_none() {
                    break;
                }
                emitted += 1;
                if stream.count.is_some_and(|count| emitted >= count) {
                    break;
                }
            }
        }
    }
    emitter.stop();
    info!("Streamed {} records from a pool of {:?}", emitted, pool.total_size());
    Ok(())
}

/// First live index: injected records are not emitted again.
fn stream_start(start_index: u64, injected: usize) -> u64 {
    start_index.max(injected as u64)
}

/// `estimate`: totals for a simulated period.
pub fn run_estimate(msgs_per_min: u64, days: u64, avg_per_person_per_day: u64) -> anyhow::Result<()> {
    print_json(&estimate_for_duration(EstimateParams {
        msgs_per_min,
        duration_days: days,
        avg_msgs_per_person_per_day: avg_per_person_per_day,
    }))
}

/// `people`: print the sender directory.
pub fn run_people(people: PeopleArgs, limit: Option<usize>) -> anyhow::Result<()> {
    let directory = SyntheticPeople::generate(people.to_config());
    let shown = limit.unwrap_or(usize::MAX).min(directory.people().len());
    print_json(&directory.people()[..shown])
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to serialize output")?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_starts_after_injected_records() {
        assert_eq!(stream_start(0, 40), 40);
        assert_eq!(stream_start(100, 40), 100);
        assert_eq!(stream_start(7, 0), 7);
    }
}
