//! Tick driver: refresh every module on the configured interval

use crate::collectors::SystemMetricsProvider;
use crate::config::{Configuration, ModuleKey, MAX_INTERVAL};
use crate::display::{FieldLayout, LineRenderer, Segment};
use crate::error::{Result, StatusError};
use crate::modules::{Module, ModuleRegistry, RenderedField};
use rayon::prelude::*;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

struct Slot {
    key: ModuleKey,
    module: Box<dyn Module>,
    layout: FieldLayout,
}

/// Outcome of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Fields in display order
    pub fields: Vec<RenderedField>,
    /// The rendered line, newline included
    pub line: String,
    /// Modules that showed their fallback this tick
    pub fallbacks: usize,
    pub next_deadline: Instant,
}

/// When the tick after one due at `scheduled` should run.
///
/// A tick that finishes after the next one was due defers it to `finished`
/// instead of dropping it, so ticks never overlap and never pile up.
pub fn next_deadline(scheduled: Instant, interval: Duration, finished: Instant) -> Instant {
    match scheduled.checked_add(interval) {
        Some(due) => due.max(finished),
        None => finished,
    }
}

pub struct Poller {
    slots: Vec<Slot>,
    provider: Box<dyn SystemMetricsProvider>,
    renderer: LineRenderer,
    interval: Duration,
    state: PollerState,
    ticks: u64,
    deadline: Option<Instant>,
}

impl Poller {
    /// Build every module named in `order`. Unknown module types and bad
    /// options are reported here, before any polling starts.
    pub fn new(
        config: &Configuration,
        registry: &ModuleRegistry,
        provider: Box<dyn SystemMetricsProvider>,
    ) -> Result<Self> {
        let interval = config.general.interval;
        if interval == 0 || interval > MAX_INTERVAL {
            return Err(StatusError::Config(format!(
                "interval must be between 1 and {} seconds, got {}",
                MAX_INTERVAL, interval
            )));
        }

        let mut slots = Vec::new();
        for instance in config.instances() {
            let module = registry.build(&instance)?;
            let layout = FieldLayout::from_instance(&instance)?;
            debug!(module = %instance.key, "Module ready");
            slots.push(Slot {
                key: instance.key,
                module,
                layout,
            });
        }

        info!(
            modules = slots.len(),
            interval = config.general.interval,
            "Poller configured"
        );

        Ok(Poller {
            slots,
            provider,
            renderer: LineRenderer::new(&config.general),
            interval: Duration::from_secs(config.general.interval),
            state: PollerState::Idle,
            ticks: 0,
            deadline: None,
        })
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks completed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Due time of the next tick, once the first tick has run
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Render one module, substituting its fallback on failure
    fn render_slot(slot: &Slot, provider: &dyn SystemMetricsProvider) -> (RenderedField, bool) {
        match panic::catch_unwind(AssertUnwindSafe(|| slot.module.render(provider))) {
            Ok(Ok(field)) => (field, false),
            Ok(Err(err)) => {
                if err.is_recoverable() {
                    debug!(module = %slot.key, error = %err, "Metric unavailable, showing fallback");
                } else {
                    warn!(module = %slot.key, error = %err, "Module failed, showing fallback");
                }
                (slot.module.fallback(), true)
            }
            Err(_) => {
                error!(module = %slot.key, "Module panicked, showing fallback");
                (slot.module.fallback(), true)
            }
        }
    }

    /// Run one tick that was started at `now`.
    ///
    /// Metric queries of all modules run concurrently; every one completes
    /// before the line is rendered, and fields keep the declared order.
    pub fn tick_at(&mut self, now: Instant) -> TickReport {
        let started = Instant::now();
        let scheduled = self.deadline.unwrap_or(now);
        self.state = PollerState::Polling;

        let provider: &dyn SystemMetricsProvider = self.provider.as_ref();
        let results: Vec<(RenderedField, bool)> = self
            .slots
            .par_iter()
            .map(|slot| Self::render_slot(slot, provider))
            .collect();

        let fallbacks = results.iter().filter(|(_, fell_back)| *fell_back).count();
        let fields: Vec<RenderedField> = results.into_iter().map(|(field, _)| field).collect();

        let segments: Vec<Segment> = self
            .slots
            .iter()
            .zip(&fields)
            .map(|(slot, field)| Segment {
                key: &slot.key,
                field: field.clone(),
                layout: &slot.layout,
            })
            .collect();
        let line = self.renderer.render(&segments, self.ticks);

        self.ticks += 1;
        let finished = now + started.elapsed();
        let next = next_deadline(scheduled, self.interval, finished);
        self.deadline = Some(next);
        self.state = PollerState::Idle;

        TickReport {
            fields,
            line,
            fallbacks,
            next_deadline: next,
        }
    }

    /// Poll until `max_ticks` lines were written, or forever.
    ///
    /// Each line is written with a single write and flushed, so stopping the
    /// process never leaves half a line behind.
    pub fn run<W: Write>(&mut self, out: &mut W, max_ticks: Option<u64>) -> Result<()> {
        let header = self.renderer.header();
        if !header.is_empty() {
            out.write_all(header.as_bytes())?;
            out.flush()?;
        }

        loop {
            if max_ticks.map_or(false, |max| self.ticks >= max) {
                return Ok(());
            }

            if let Some(deadline) = self.deadline {
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                }
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.tick_at(Instant::now())));
            let line = match outcome {
                Ok(report) => report.line,
                Err(_) => {
                    error!(tick = self.ticks, "Tick panicked");
                    let line = self
                        .renderer
                        .render_failure(&StatusError::unavailable("tick", "internal error"), self.ticks);
                    self.ticks += 1;
                    self.state = PollerState::Idle;
                    let now = Instant::now();
                    self.deadline = Some(next_deadline(now, self.interval, now));
                    line
                }
            };

            out.write_all(line.as_bytes())?;
            out.flush()?;
        }
    }
}
