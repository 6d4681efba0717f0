//! Chart module
//!
//! Drawing-engine abstraction, the surface lifecycle owner, and the
//! reconciler that maps ticks onto the series.

mod headless;
mod options;
mod owner;
mod reconciler;
mod series;
mod surface;
mod terminal;
mod viewport;

pub use headless::{EngineStats, HeadlessEngine, HeadlessSurface};
pub use options::{
    AreaSeriesOptions, ChartOptions, ChartOptionsPatch, Color, Container, GridOptions,
    LayoutOptions, TimeScaleOptions,
};
pub use owner::{ChartOwner, ContainerLayout};
pub use reconciler::{Clock, ReconciledPoint, SystemClock, TickReconciler, TimeBasis};
pub use series::{SeriesData, SeriesPoint, UpsertKind};
pub use surface::{AreaSeries, ChartEngine, ChartError, ChartSurface, SeriesId, SurfaceState};
pub use terminal::{TerminalEngine, TerminalSurface};
pub use viewport::{ResizeSubscription, Viewport, ViewportSize};
