//! Stateless distance metrics for path cost and search heuristics.

use skirmish_core::TilePoint;

/// Selectable distance metric families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CostMetric {
    /// `|dx| + |dy|`; the right metric for cardinal-only movement.
    Manhattan,
    /// `max(|dx|, |dy|)`; diagonal steps cost the same as cardinal ones.
    Diagonal,
    /// `sqrt(dx^2 + dy^2)`; diagonal steps cost more than cardinal ones.
    Euclidean,
}

/// Computes distances between tiles under a metric fixed at construction.
///
/// Pure and deterministic; the same calculator instance accumulates path
/// cost and serves as the search heuristic so the two can never diverge.
#[derive(Clone, Copy, Debug)]
pub struct MoveCostCalculator {
    metric: CostMetric,
}

impl MoveCostCalculator {
    /// Creates a calculator for the provided metric.
    #[must_use]
    pub const fn new(metric: CostMetric) -> Self {
        Self { metric }
    }

    /// The metric this calculator was constructed with.
    #[must_use]
    pub const fn metric(&self) -> CostMetric {
        self.metric
    }

    /// Distance between two tiles under the configured metric.
    #[must_use]
    pub fn cost(&self, from: TilePoint, to: TilePoint) -> f32 {
        let dx = (from.x() - to.x()).abs() as f32;
        let dy = (from.y() - to.y()).abs() as f32;
        match self.metric {
            CostMetric::Manhattan => dx + dy,
            CostMetric::Diagonal => dx.max(dy),
            CostMetric::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}

impl Default for MoveCostCalculator {
    fn default() -> Self {
        Self::new(CostMetric::Manhattan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_sums_axis_deltas() {
        let calculator = MoveCostCalculator::new(CostMetric::Manhattan);
        assert_eq!(
            calculator.cost(TilePoint::new(0, 0), TilePoint::new(3, 4)),
            7.0
        );
    }

    #[test]
    fn diagonal_takes_the_larger_delta() {
        let calculator = MoveCostCalculator::new(CostMetric::Diagonal);
        assert_eq!(
            calculator.cost(TilePoint::new(0, 0), TilePoint::new(3, 4)),
            4.0
        );
    }

    #[test]
    fn euclidean_is_the_true_distance() {
        let calculator = MoveCostCalculator::new(CostMetric::Euclidean);
        assert_eq!(
            calculator.cost(TilePoint::new(0, 0), TilePoint::new(3, 4)),
            5.0
        );
    }

    #[test]
    fn metrics_are_symmetric() {
        for metric in [CostMetric::Manhattan, CostMetric::Diagonal, CostMetric::Euclidean] {
            let calculator = MoveCostCalculator::new(metric);
            let a = TilePoint::new(-2, 5);
            let b = TilePoint::new(4, -1);
            assert_eq!(calculator.cost(a, b), calculator.cost(b, a));
        }
    }
}
