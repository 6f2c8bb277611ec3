//! Timer-driven stream emitter.
//!
//! Emits one record per tick from a [`RecordSource`] to a [`Renderer`],
//! then reports it to an optional observer. Ticks are scheduled one at a
//! time through a [`Scheduler`], so only one timer is ever pending for the
//! loop itself.
//!
//! All callbacks run while holding a reentrant emit gate. [`Emitter::stop`]
//! takes the same gate, which makes it synchronous: once it returns no
//! further render or observer call happens, and it can still be called from
//! inside one of those callbacks.

use crate::render::{render_guarded, NoopRenderer, NoopTyping, Renderer, TypingSignal};
use crate::scheduler::{Scheduler, TimerHandle};
use chatsim_core::Record;
use chatsim_generator::XorShift32;
use chatsim_pool::RecordSource;
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MIN_RATE_PER_MIN: u32 = 1;
pub const MAX_RATE_PER_MIN: u32 = 2000;

/// Lower bound on any tick delay.
pub const MIN_DELAY_MS: u64 = 20;

/// Observer invoked after each emitted record with its source index.
pub type EmitObserver = Arc<dyn Fn(&Record, u64) + Send + Sync>;

/// Typing simulation settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingOptions {
    /// Probability a record is preceded by a typing signal; 0 disables it
    pub fraction: f64,
    pub per_char_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for TypingOptions {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            per_char_ms: 45,
            min_ms: 300,
            max_ms: 1800,
        }
    }
}

impl TypingOptions {
    /// Typing duration for a text of `chars` characters.
    pub fn duration_for(&self, chars: usize) -> Duration {
        let ms = (chars as u64)
            .saturating_mul(self.per_char_ms)
            .clamp(self.min_ms, self.max_ms.max(self.min_ms));
        Duration::from_millis(ms)
    }
}

/// Emission settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamOptions {
    /// Records per minute, clamped to [1, 2000]
    pub rate_per_min: u32,
    /// Jitter span in ms; `None` means a quarter of the base interval
    pub jitter_ms: Option<u64>,
    pub start_index: u64,
    /// Seed of the emitter's own jitter/restart generator
    pub seed: u32,
    /// After the end of a bounded source, restart somewhere below this index
    pub restart_window: u64,
    pub typing: TypingOptions,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            rate_per_min: 45,
            jitter_ms: None,
            start_index: 0,
            seed: 0x5EED_1234,
            restart_window: 1000,
            typing: TypingOptions::default(),
        }
    }
}

impl StreamOptions {
    pub fn with_rate(mut self, rate_per_min: u32) -> Self {
        self.rate_per_min = rate_per_min;
        self
    }

    pub fn with_jitter_ms(mut self, jitter_ms: u64) -> Self {
        self.jitter_ms = Some(jitter_ms);
        self
    }

    pub fn with_start_index(mut self, start_index: u64) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_restart_window(mut self, restart_window: u64) -> Self {
        self.restart_window = restart_window;
        self
    }

    pub fn with_typing(mut self, typing: TypingOptions) -> Self {
        self.typing = typing;
        self
    }
}

/// Base tick interval for a rate: `round(60000 / rate)` ms.
pub fn base_interval_ms(rate_per_min: u32) -> u64 {
    let rate = rate_per_min.clamp(MIN_RATE_PER_MIN, MAX_RATE_PER_MIN);
    (60_000.0 / rate as f64).round() as u64
}

/// Builder for [`Emitter`]; collaborators default to no-ops.
pub struct EmitterBuilder {
    source: Arc<dyn RecordSource>,
    scheduler: Arc<dyn Scheduler>,
    renderer: Arc<dyn Renderer>,
    typing: Arc<dyn TypingSignal>,
    observer: Option<EmitObserver>,
    options: StreamOptions,
}

impl EmitterBuilder {
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn typing(mut self, typing: Arc<dyn TypingSignal>) -> Self {
        self.typing = typing;
        self
    }

    pub fn observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Record, u64) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Emitter {
        let options = self.options;
        let state = EmitterState {
            cursor: options.start_index,
            rate_per_min: options.rate_per_min.clamp(MIN_RATE_PER_MIN, MAX_RATE_PER_MIN),
            jitter_ms: options.jitter_ms,
            restart_window: options.restart_window.max(1),
            typing: options.typing,
            rng: XorShift32::new(options.seed),
            timer: None,
            deferred: HashMap::new(),
            next_deferred: 0,
        };
        Emitter {
            inner: Arc::new(EmitterInner {
                source: self.source,
                scheduler: self.scheduler,
                renderer: self.renderer,
                typing: self.typing,
                observer: self.observer,
                gate: ReentrantMutex::new(()),
                state: Mutex::new(state),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
        }
    }
}

/// Handle to a stream emitter. Clones control the same emitter.
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<EmitterInner>,
}

struct EmitterInner {
    source: Arc<dyn RecordSource>,
    scheduler: Arc<dyn Scheduler>,
    renderer: Arc<dyn Renderer>,
    typing: Arc<dyn TypingSignal>,
    observer: Option<EmitObserver>,
    gate: ReentrantMutex<()>,
    state: Mutex<EmitterState>,
    running: AtomicBool,
    // bumped on every start so stale ticks from an earlier run are ignored
    generation: AtomicU64,
}

struct EmitterState {
    cursor: u64,
    rate_per_min: u32,
    jitter_ms: Option<u64>,
    restart_window: u64,
    typing: TypingOptions,
    rng: XorShift32,
    timer: Option<Box<dyn TimerHandle>>,
    deferred: HashMap<u64, Box<dyn TimerHandle>>,
    next_deferred: u64,
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Emitter")
            .field("running", &self.is_running())
            .field("cursor", &state.cursor)
            .field("rate_per_min", &state.rate_per_min)
            .finish()
    }
}

impl Emitter {
    pub fn builder(source: Arc<dyn RecordSource>, scheduler: Arc<dyn Scheduler>) -> EmitterBuilder {
        EmitterBuilder {
            source,
            scheduler,
            renderer: Arc::new(NoopRenderer),
            typing: Arc::new(NoopTyping),
            observer: None,
            options: StreamOptions::default(),
        }
    }

    /// Start the loop. Does nothing if already running.
    pub fn start(&self) {
        let _gate = self.inner.gate.lock();
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (cursor, rate) = {
            let state = self.inner.state.lock();
            (state.cursor, state.rate_per_min)
        };
        info!("Stream started at index {} ({} msgs/min)", cursor, rate);
        EmitterInner::schedule_next(&self.inner, generation);
    }

    /// Stop the loop and cancel everything pending.
    ///
    /// After this returns no render or observer call is made, including
    /// deferred renders waiting on a typing signal.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        // Waits for an in-flight tick on another thread; reentrant on this one.
        let _gate = self.inner.gate.lock();
        let (timer, deferred) = {
            let mut state = self.inner.state.lock();
            (state.timer.take(), std::mem::take(&mut state.deferred))
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
        for handle in deferred.values() {
            handle.cancel();
        }
        debug!("Stream stopped ({} deferred renders cancelled)", deferred.len());
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Index of the next record to emit.
    pub fn cursor(&self) -> u64 {
        self.inner.state.lock().cursor
    }

    pub fn rate_per_min(&self) -> u32 {
        self.inner.state.lock().rate_per_min
    }

    /// Change the rate; applies from the next scheduled tick.
    pub fn set_rate(&self, rate_per_min: u32) {
        let rate = rate_per_min.clamp(MIN_RATE_PER_MIN, MAX_RATE_PER_MIN);
        self.inner.state.lock().rate_per_min = rate;
        debug!("Stream rate set to {} msgs/min", rate);
    }

    /// Emit the record at the cursor now and advance, whether or not the
    /// loop is running. Returns the emitted index.
    pub fn trigger_once(&self) -> Option<u64> {
        let _gate = self.inner.gate.lock();
        EmitterInner::emit_next(&self.inner, None)
    }
}

impl EmitterInner {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn live(&self, generation: Option<u64>) -> bool {
        generation.map_or(true, |g| self.is_current(g))
    }

    fn next_delay(state: &mut EmitterState) -> Duration {
        let interval = base_interval_ms(state.rate_per_min) as f64;
        let jitter = state
            .jitter_ms
            .map(|j| j as f64)
            .unwrap_or_else(|| (interval * 0.25).round());
        let r = state.rng.next_f64();
        let delay = (interval + (r * jitter - jitter / 2.0)).max(MIN_DELAY_MS as f64);
        Duration::from_millis(delay.round() as u64)
    }

    fn schedule_next(this: &Arc<Self>, generation: u64) {
        let delay = Self::next_delay(&mut this.state.lock());
        let weak: Weak<Self> = Arc::downgrade(this);
        let handle = this.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Self::tick(&inner, generation);
                }
            }),
        );

        let mut state = this.state.lock();
        if this.is_current(generation) {
            state.timer = Some(handle);
        } else {
            drop(state);
            handle.cancel();
        }
    }

    fn tick(this: &Arc<Self>, generation: u64) {
        let _gate = this.gate.lock();
        if !this.is_current(generation) {
            return;
        }
        this.state.lock().timer = None;
        Self::emit_next(this, Some(generation));
        if this.is_current(generation) {
            Self::schedule_next(this, generation);
        }
    }

    /// Pull the record at the cursor, advancing it (and jumping back near
    /// the start once a bounded, non-wrapping source is exhausted).
    fn take_next(&self, state: &mut EmitterState) -> Option<(u64, Record)> {
        if let Some(total) = self.source.total_size() {
            if state.cursor >= total && !self.source.wraps() {
                let window = state.restart_window.min(total);
                let jump = (state.rng.next_f64() * window as f64).floor() as u64;
                debug!("Source exhausted at {}, restarting at {}", state.cursor, jump);
                state.cursor = jump;
            }
        }
        let index = state.cursor;
        let record = self.source.fetch(index)?;
        state.cursor = index.saturating_add(1);
        Some((index, record))
    }

    fn emit_next(this: &Arc<Self>, generation: Option<u64>) -> Option<u64> {
        let (index, record, typing) = {
            let mut state = this.state.lock();
            let Some((index, record)) = this.take_next(&mut state) else {
                warn!("No record available at index {}", state.cursor);
                return None;
            };
            let options = state.typing;
            let typing = (options.fraction > 0.0 && state.rng.chance(options.fraction))
                .then(|| options.duration_for(record.text.chars().count()));
            (index, record, typing)
        };

        match typing {
            Some(duration) => Self::defer(this, generation, index, record, duration),
            None => this.deliver(&record, index, generation),
        }
        Some(index)
    }

    /// Signal typing for `duration`, then render through the scheduler.
    fn defer(
        this: &Arc<Self>,
        generation: Option<u64>,
        index: u64,
        record: Record,
        duration: Duration,
    ) {
        if !this.live(generation) {
            return;
        }
        let names = vec![record.sender_display_name.clone()];
        if catch_unwind(AssertUnwindSafe(|| this.typing.typing(&names, duration))).is_err() {
            warn!("Typing signal panicked on {}", record.id);
        }

        let id = {
            let mut state = this.state.lock();
            state.next_deferred += 1;
            state.next_deferred
        };
        let weak: Weak<Self> = Arc::downgrade(this);
        let handle = this.scheduler.schedule(
            duration,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.deliver_deferred(id, &record, index, generation);
                }
            }),
        );
        this.state.lock().deferred.insert(id, handle);
    }

    fn deliver_deferred(&self, id: u64, record: &Record, index: u64, generation: Option<u64>) {
        let _gate = self.gate.lock();
        // stop() drains the map, so a missing entry means cancelled
        if self.state.lock().deferred.remove(&id).is_none() {
            return;
        }
        self.deliver(record, index, generation);
    }

    fn deliver(&self, record: &Record, index: u64, generation: Option<u64>) {
        if !self.live(generation) {
            return;
        }
        render_guarded(self.renderer.as_ref(), record, true);

        if !self.live(generation) {
            return;
        }
        if let Some(observer) = &self.observer {
            if catch_unwind(AssertUnwindSafe(|| observer(record, index))).is_err() {
                warn!("Emit observer panicked on {}", record.id);
            }
        }
    }
}
