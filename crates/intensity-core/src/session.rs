//! Holder of the current analysis run.
//!
//! Every user-triggered analysis takes a ticket from [`AnalysisSession::begin`].
//! Starting a new analysis supersedes all outstanding tickets: a run that
//! completes under a superseded ticket is discarded rather than published, so
//! results from a previous region/resolution never reach the views.
//!
//! The published run is swapped as a whole behind an `Arc`; readers see
//! either the previous run or the new one.

use log::warn;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::analysis::{run_analysis, AnalysisRun};
use crate::context::AnalysisContext;
use crate::error::{IntensityError, Result};
use crate::histogram::ZonalHistogrammer;
use crate::view::{category_view, interval_series, CategoryView, IntervalSeries, Scope};

/// Claim on publishing the result of one analysis.
#[derive(Debug, Clone)]
pub struct RunTicket {
    generation: u64,
    context: AnalysisContext,
}

impl RunTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    generation: AtomicU64,
    current: RwLock<Option<Arc<AnalysisRun>>>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new analysis; all earlier tickets become stale.
    pub fn begin(&self, context: AnalysisContext) -> RunTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RunTicket { generation, context }
    }

    /// Publish `run` if `ticket` is still the latest one.
    pub fn complete(&self, ticket: RunTicket, run: AnalysisRun) -> Result<Arc<AnalysisRun>> {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let latest = self.generation.load(Ordering::SeqCst);
        if ticket.generation != latest {
            warn!(
                "discarding run {} for {}: superseded by run {}",
                ticket.generation,
                ticket.context.region(),
                latest
            );
            return Err(IntensityError::StaleRun { ticket: ticket.generation, current: latest });
        }
        let run = Arc::new(run);
        *slot = Some(Arc::clone(&run));
        Ok(run)
    }

    /// Record that the analysis behind `ticket` failed.
    ///
    /// When the ticket is still current the published run is withdrawn, since
    /// it describes a selection the user has moved away from.
    pub fn fail(&self, ticket: &RunTicket) {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if ticket.generation == self.generation.load(Ordering::SeqCst) {
            *slot = None;
        }
    }

    /// Begin, run and publish an analysis in one call.
    pub fn run<H>(&self, context: AnalysisContext, histogrammer: &H) -> Result<Arc<AnalysisRun>>
    where
        H: ZonalHistogrammer + ?Sized,
    {
        let ticket = self.begin(context);
        match run_analysis(ticket.context(), histogrammer) {
            Ok(run) => self.complete(ticket, run),
            Err(err) => {
                if err.is_user_facing() {
                    warn!("analysis of {} failed: {err}", ticket.context().region());
                }
                self.fail(&ticket);
                Err(err)
            }
        }
    }

    /// The published run.
    pub fn current(&self) -> Result<Arc<AnalysisRun>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(IntensityError::EmptyAnalysisRun)
    }

    pub fn interval_series(&self) -> Result<IntervalSeries> {
        let run = self.current()?;
        Ok(interval_series(&run))
    }

    pub fn category_view(&self, scope: &Scope) -> Result<CategoryView> {
        let run = self.current()?;
        category_view(&run, scope)
    }
}
