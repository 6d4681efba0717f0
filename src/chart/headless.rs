//! Headless chart engine
//!
//! Keeps points in memory without drawing and counts lifecycle calls.
//! Backs `view --headless`.

use super::{
    AreaSeries, AreaSeriesOptions, ChartEngine, ChartError, ChartOptions, ChartOptionsPatch,
    ChartSurface, Container, SeriesId, SeriesPoint, SurfaceState, UpsertKind,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Lifecycle counters shared between an engine and its surfaces
#[derive(Debug, Default)]
pub struct EngineStats {
    surfaces_created: AtomicUsize,
    surfaces_removed: AtomicUsize,
    series_added: AtomicUsize,
    series_removed: AtomicUsize,
    updates: AtomicUsize,
}

impl EngineStats {
    pub fn surfaces_created(&self) -> usize {
        self.surfaces_created.load(Ordering::Relaxed)
    }

    pub fn surfaces_removed(&self) -> usize {
        self.surfaces_removed.load(Ordering::Relaxed)
    }

    pub fn series_added(&self) -> usize {
        self.series_added.load(Ordering::Relaxed)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces_created() - self.surfaces_removed()
    }

    pub fn live_series(&self) -> usize {
        self.series_added() - self.series_removed.load(Ordering::Relaxed)
    }
}

/// Engine producing [`HeadlessSurface`]s
#[derive(Debug)]
pub struct HeadlessEngine {
    max_points: usize,
    stats: Arc<EngineStats>,
    fail_next_series: bool,
}

impl HeadlessEngine {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points,
            stats: Arc::new(EngineStats::default()),
            fail_next_series: false,
        }
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        Arc::clone(&self.stats)
    }

    /// Make the next surface refuse its first series
    #[cfg(test)]
    pub(crate) fn fail_next_series(&mut self) {
        self.fail_next_series = true;
    }
}

impl ChartEngine for HeadlessEngine {
    type Surface = HeadlessSurface;

    fn create_surface(
        &mut self,
        container: Container,
        options: ChartOptions,
    ) -> Result<HeadlessSurface, ChartError> {
        self.stats.surfaces_created.fetch_add(1, Ordering::Relaxed);
        Ok(HeadlessSurface {
            state: SurfaceState::new(container, options, self.max_points),
            stats: Arc::clone(&self.stats),
            patches: Vec::new(),
            fail_series: std::mem::take(&mut self.fail_next_series),
        })
    }
}

/// In-memory surface
#[derive(Debug)]
pub struct HeadlessSurface {
    state: SurfaceState,
    stats: Arc<EngineStats>,
    patches: Vec<ChartOptionsPatch>,
    fail_series: bool,
}

impl HeadlessSurface {
    pub fn series(&self) -> &[AreaSeries] {
        &self.state.series
    }

    /// Every options patch applied since creation, oldest first
    pub fn applied_patches(&self) -> &[ChartOptionsPatch] {
        &self.patches
    }
}

impl ChartSurface for HeadlessSurface {
    fn add_area_series(&mut self, options: AreaSeriesOptions) -> Result<SeriesId, ChartError> {
        if std::mem::take(&mut self.fail_series) {
            return Err(ChartError::Engine("series rejected".into()));
        }
        self.stats.series_added.fetch_add(1, Ordering::Relaxed);
        Ok(self.state.add_area_series(options))
    }

    fn update(&mut self, series: SeriesId, point: SeriesPoint) -> Result<UpsertKind, ChartError> {
        let kind = self.state.update(series, point)?;
        self.stats.updates.fetch_add(1, Ordering::Relaxed);
        Ok(kind)
    }

    fn apply_options(&mut self, patch: &ChartOptionsPatch) -> Result<(), ChartError> {
        self.state.apply_options(patch);
        self.patches.push(*patch);
        Ok(())
    }

    fn options(&self) -> &ChartOptions {
        &self.state.options
    }

    fn remove(self) {
        self.stats
            .series_removed
            .fetch_add(self.state.series.len(), Ordering::Relaxed);
        self.stats.surfaces_removed.fetch_add(1, Ordering::Relaxed);
    }
}
