//! Drawing engine abstraction

use super::{
    AreaSeriesOptions, ChartOptions, ChartOptionsPatch, Container, SeriesData, SeriesPoint,
    UpsertKind,
};
use thiserror::Error;

/// Chart errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChartError {
    /// A new point was older than the series' last point
    #[error("Time must be increasing: last point at {last}, got {attempted}")]
    TimeRegression { last: i64, attempted: i64 },
    /// No surface is attached
    #[error("No chart surface attached")]
    Detached,
    /// The series does not belong to this surface
    #[error("Unknown series: {0:?}")]
    UnknownSeries(SeriesId),
    /// Engine-specific failure
    #[error("Chart engine error: {0}")]
    Engine(String),
}

/// Handle of a series on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(pub usize);

/// Creates drawing surfaces
pub trait ChartEngine {
    type Surface: ChartSurface;

    /// Construct a surface bound to `container`
    fn create_surface(
        &mut self,
        container: Container,
        options: ChartOptions,
    ) -> Result<Self::Surface, ChartError>;
}

/// A live drawing surface
pub trait ChartSurface {
    /// Attach an area-style series
    fn add_area_series(&mut self, options: AreaSeriesOptions) -> Result<SeriesId, ChartError>;

    /// Insert a point after the last one, or amend the last one in place
    fn update(&mut self, series: SeriesId, point: SeriesPoint) -> Result<UpsertKind, ChartError>;

    fn apply_options(&mut self, patch: &ChartOptionsPatch) -> Result<(), ChartError>;

    fn options(&self) -> &ChartOptions;

    /// Release the surface and everything it holds
    fn remove(self);
}

/// An area series and its points
#[derive(Debug, Clone)]
pub struct AreaSeries {
    pub id: SeriesId,
    pub options: AreaSeriesOptions,
    pub data: SeriesData,
}

/// Bookkeeping shared by the surface implementations
#[derive(Debug, Clone)]
pub struct SurfaceState {
    pub container: Container,
    pub options: ChartOptions,
    pub series: Vec<AreaSeries>,
    max_points: usize,
}

impl SurfaceState {
    pub fn new(container: Container, options: ChartOptions, max_points: usize) -> Self {
        Self {
            container,
            options,
            series: Vec::new(),
            max_points,
        }
    }

    pub fn add_area_series(&mut self, options: AreaSeriesOptions) -> SeriesId {
        let id = SeriesId(self.series.len());
        self.series.push(AreaSeries {
            id,
            options,
            data: SeriesData::new(self.max_points),
        });
        id
    }

    pub fn update(&mut self, id: SeriesId, point: SeriesPoint) -> Result<UpsertKind, ChartError> {
        self.series
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ChartError::UnknownSeries(id))?
            .data
            .upsert(point)
    }

    pub fn apply_options(&mut self, patch: &ChartOptionsPatch) {
        self.options.apply(patch);
    }
}
