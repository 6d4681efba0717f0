//! Tick to series reconciliation
//!
//! The series only accepts a point later than its last one, or an amendment
//! of the last one. Ticks are mapped onto whole seconds and then clamped so
//! the coordinate never goes backwards:
//!
//! - coordinate = floor(`server_time`), or floor(now) when it is missing
//! - coordinate = max(previous coordinate, coordinate)
//! - same coordinate as before: the last point is amended with the new price

use super::{ChartEngine, ChartError, ChartOwner, SeriesPoint, UpsertKind};
use crate::feed::Tick;
use crate::telemetry::{increment_counter, set_gauge, CounterMetric, GaugeMetric};
use crate::ui::DisplayState;
use chrono::{DateTime, Utc};

/// Source of wall-clock time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where a coordinate's time came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBasis {
    /// The tick's `server_time`
    Server,
    /// Local wall clock, `server_time` was missing or zero
    WallClock,
}

/// A tick mapped onto the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciledPoint {
    pub point: SeriesPoint,
    pub basis: TimeBasis,
    /// The computed coordinate, when it was behind and got clamped forward
    pub clamped_from: Option<i64>,
    /// Replaces the series' last point instead of appending
    pub amends: bool,
}

/// Maps ticks onto a non-decreasing time axis
#[derive(Debug)]
pub struct TickReconciler<C: Clock = SystemClock> {
    clock: C,
    last_time: Option<i64>,
}

impl Default for TickReconciler<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> TickReconciler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last_time: None,
        }
    }

    /// Coordinate of the last point handed to the chart
    pub fn last_coordinate(&self) -> Option<i64> {
        self.last_time
    }

    /// Map `tick` and advance the time axis
    pub fn reconcile(&mut self, tick: &Tick) -> ReconciledPoint {
        let reconciled = self.derive(tick);
        self.last_time = Some(reconciled.point.time);
        reconciled
    }

    /// Reconcile `tick` onto the owner's series and update `display`
    ///
    /// Does nothing when no surface is attached. The time axis only advances
    /// once the series has accepted the point.
    pub fn apply<E: ChartEngine>(
        &mut self,
        tick: &Tick,
        owner: &mut ChartOwner<E>,
        display: &mut DisplayState,
    ) -> Result<Option<ReconciledPoint>, ChartError> {
        if !owner.is_attached() {
            tracing::debug!(price = tick.price, "No chart surface, skipping tick");
            return Ok(None);
        }

        let mut reconciled = self.derive(tick);
        let kind = owner.update(reconciled.point)?;
        self.last_time = Some(reconciled.point.time);
        // A fresh series after a remount has nothing to amend
        reconciled.amends = kind == UpsertKind::Amended;

        if reconciled.basis == TimeBasis::WallClock {
            increment_counter(CounterMetric::TimeFallback);
            tracing::debug!(
                time = reconciled.point.time,
                "Tick without server_time, using wall clock"
            );
        }
        if let Some(computed) = reconciled.clamped_from {
            increment_counter(CounterMetric::TimeClamped);
            tracing::warn!(
                computed,
                time = reconciled.point.time,
                "Tick time behind last point, clamped forward"
            );
        }
        if reconciled.amends {
            increment_counter(CounterMetric::PointsAmended);
        }
        increment_counter(CounterMetric::TicksApplied);
        set_gauge(GaugeMetric::LastPrice, tick.price);

        display.record(tick.price, self.clock.now());
        Ok(Some(reconciled))
    }

    fn derive(&self, tick: &Tick) -> ReconciledPoint {
        let (computed, basis) = match tick.server_seconds() {
            Some(t) => (t, TimeBasis::Server),
            None => (self.clock.now().timestamp(), TimeBasis::WallClock),
        };

        let time = match self.last_time {
            Some(last) => last.max(computed),
            None => computed,
        };

        ReconciledPoint {
            point: SeriesPoint::new(time, tick.price),
            basis,
            clamped_from: (time != computed).then_some(computed),
            amends: self.last_time == Some(time),
        }
    }
}
