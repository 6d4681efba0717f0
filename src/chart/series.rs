//! Series point storage

use super::ChartError;
use std::collections::VecDeque;

/// One plotted point; `time` is whole unix seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// What an upsert did to the series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    /// A new point after the previous last one
    Appended,
    /// The last point's value was replaced
    Amended,
}

/// Time-ordered points with bounded history
///
/// New points must be strictly later than the last one; a point at the
/// last time amends it; anything earlier is rejected.
#[derive(Debug, Clone)]
pub struct SeriesData {
    points: VecDeque<SeriesPoint>,
    max_points: usize,
}

impl SeriesData {
    pub fn new(max_points: usize) -> Self {
        Self {
            points: VecDeque::new(),
            max_points: max_points.max(1),
        }
    }

    pub fn upsert(&mut self, point: SeriesPoint) -> Result<UpsertKind, ChartError> {
        match self.points.back_mut() {
            Some(last) if point.time < last.time => Err(ChartError::TimeRegression {
                last: last.time,
                attempted: point.time,
            }),
            Some(last) if point.time == last.time => {
                last.value = point.value;
                Ok(UpsertKind::Amended)
            }
            _ => {
                self.points.push_back(point);
                while self.points.len() > self.max_points {
                    self.points.pop_front();
                }
                Ok(UpsertKind::Appended)
            }
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.back()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points as `(x, y)` pairs for plotting
    pub fn to_xy(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.time as f64, p.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_amend() {
        let mut data = SeriesData::new(10);
        assert_eq!(data.upsert(SeriesPoint::new(1000, 100.0)), Ok(UpsertKind::Appended));
        assert_eq!(data.upsert(SeriesPoint::new(1000, 101.0)), Ok(UpsertKind::Amended));
        assert_eq!(data.upsert(SeriesPoint::new(1001, 102.0)), Ok(UpsertKind::Appended));

        let points: Vec<_> = data.points().copied().collect();
        assert_eq!(
            points,
            vec![SeriesPoint::new(1000, 101.0), SeriesPoint::new(1001, 102.0)]
        );
    }

    #[test]
    fn test_regression_rejected() {
        let mut data = SeriesData::new(10);
        data.upsert(SeriesPoint::new(1001, 1.0)).unwrap();
        let err = data.upsert(SeriesPoint::new(1000, 2.0)).unwrap_err();
        assert_eq!(
            err,
            ChartError::TimeRegression {
                last: 1001,
                attempted: 1000
            }
        );
        assert_eq!(data.len(), 1);
        assert_eq!(data.last().unwrap().value, 1.0);
    }

    #[test]
    fn test_oldest_points_evicted() {
        let mut data = SeriesData::new(3);
        for t in 0..5 {
            data.upsert(SeriesPoint::new(t, t as f64)).unwrap();
        }
        assert_eq!(data.len(), 3);
        assert_eq!(data.to_xy(), vec![(2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
    }
}
