//! Chart surface lifecycle

use super::{
    AreaSeriesOptions, ChartEngine, ChartError, ChartOptions, ChartOptionsPatch, ChartSurface,
    Container, ResizeSubscription, SeriesId, SeriesPoint, UpsertKind, Viewport, ViewportSize,
};

/// Maps the viewport onto the surface container
pub type ContainerLayout = fn(ViewportSize) -> Container;

struct Attached<S> {
    surface: S,
    series: SeriesId,
    resize: ResizeSubscription,
}

/// Owns the one drawing surface and its one area series
///
/// `attach` acquires both and subscribes to viewport resizes; `detach`
/// unsubscribes and releases them. Dropping the owner detaches.
pub struct ChartOwner<E: ChartEngine> {
    engine: E,
    layout: ContainerLayout,
    fixed_height: Option<u32>,
    series_options: AreaSeriesOptions,
    attached: Option<Attached<E::Surface>>,
}

impl<E: ChartEngine> ChartOwner<E> {
    pub fn new(engine: E, layout: ContainerLayout) -> Self {
        Self {
            engine,
            layout,
            fixed_height: None,
            series_options: AreaSeriesOptions::default(),
            attached: None,
        }
    }

    /// Keep the surface at `height` instead of the container height
    pub fn with_fixed_height(mut self, height: Option<u32>) -> Self {
        self.fixed_height = height;
        self
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn surface(&self) -> Option<&E::Surface> {
        self.attached.as_ref().map(|a| &a.surface)
    }

    pub fn series(&self) -> Option<SeriesId> {
        self.attached.as_ref().map(|a| a.series)
    }

    /// Create the surface and series; a no-op while already attached
    ///
    /// Returns whether a new surface was created.
    pub fn attach(&mut self, viewport: &Viewport) -> Result<bool, ChartError> {
        if self.attached.is_some() {
            return Ok(false);
        }

        let container = (self.layout)(viewport.size());
        let height = self.fixed_height.unwrap_or(container.height);
        let options = ChartOptions::dark(container.width, height);

        let mut surface = self.engine.create_surface(container, options)?;
        let series = match surface.add_area_series(self.series_options) {
            Ok(id) => id,
            Err(e) => {
                surface.remove();
                return Err(e);
            }
        };

        tracing::debug!(
            width = container.width,
            height,
            "Chart surface attached"
        );

        self.attached = Some(Attached {
            surface,
            series,
            resize: viewport.subscribe(),
        });
        Ok(true)
    }

    /// Apply a pending viewport resize as a width-only update
    pub fn poll_resize(&mut self) -> Result<bool, ChartError> {
        let Some(attached) = self.attached.as_mut() else {
            return Ok(false);
        };
        let Some(size) = attached.resize.poll() else {
            return Ok(false);
        };

        let container = (self.layout)(size);
        if attached.surface.options().width == container.width {
            return Ok(false);
        }
        attached
            .surface
            .apply_options(&ChartOptionsPatch::width(container.width))?;
        tracing::debug!(width = container.width, "Chart surface resized");
        Ok(true)
    }

    /// Insert or amend a point on the series
    pub fn update(&mut self, point: SeriesPoint) -> Result<UpsertKind, ChartError> {
        let attached = self.attached.as_mut().ok_or(ChartError::Detached)?;
        attached.surface.update(attached.series, point)
    }

    /// Unsubscribe and release the surface; returns whether one was attached
    pub fn detach(&mut self) -> bool {
        let Some(attached) = self.attached.take() else {
            return false;
        };
        attached.resize.unsubscribe();
        attached.surface.remove();
        tracing::debug!("Chart surface released");
        true
    }
}

impl<E: ChartEngine> Drop for ChartOwner<E> {
    fn drop(&mut self) {
        self.detach();
    }
}
