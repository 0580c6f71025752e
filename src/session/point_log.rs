use std::sync::Arc;

use crate::models::FusedPoint;

/// Ordered, append-only record of fused points for one session.
///
/// Points keep arrival order; nothing is deduplicated or re-sorted.
#[derive(Debug, Clone, Default)]
pub struct PointLog {
    points: Vec<FusedPoint>,
}

impl PointLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, point: FusedPoint) {
        self.points.push(point);
    }

    /// Immutable copy of the log as it is right now.
    pub fn snapshot(&self) -> Arc<[FusedPoint]> {
        Arc::from(self.points.as_slice())
    }

    pub fn as_slice(&self) -> &[FusedPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&FusedPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawFix;
    use chrono::{Duration, Utc};

    #[test]
    fn keeps_arrival_order_not_timestamp_order() {
        let now = Utc::now();
        let late = FusedPoint::from_fix(&RawFix::new(now, 0.0, 0.0, 2.0, 1.0), None);
        let early = FusedPoint::from_fix(
            &RawFix::new(now - Duration::seconds(30), 0.0, 0.0, 1.0, 1.0),
            None,
        );

        let mut log = PointLog::new();
        log.append(late.clone());
        log.append(early.clone());

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id(), late.id());
        assert_eq!(snapshot[1].id(), early.id());
    }

    #[test]
    fn snapshot_is_detached_from_later_appends() {
        let mut log = PointLog::new();
        log.append(FusedPoint::from_fix(&RawFix::new(Utc::now(), 0.0, 0.0, 1.0, 1.0), None));
        let snapshot = log.snapshot();
        log.append(FusedPoint::from_fix(&RawFix::new(Utc::now(), 0.0, 0.0, 2.0, 1.0), None));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);

        log.clear();
        assert!(log.is_empty());
        assert_eq!(snapshot.len(), 1);
    }
}
