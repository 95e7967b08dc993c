use std::ops::Range;

use ndarray::ArrayView1;

use crate::error::KMeansError;

pub trait Distance {
    /// Number of components the metric expects on both sides.
    fn dim(&self) -> usize;

    fn squared_distance(&self, us: ArrayView1<f64>, them: ArrayView1<f64>) -> f64;

    fn distance(&self, us: ArrayView1<f64>, them: ArrayView1<f64>) -> f64 {
        self.squared_distance(us, them).sqrt()
    }
}

/// A contiguous run of feature components sharing one weight.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionGroup {
    pub name: String,
    pub range: Range<usize>,
    pub weight: f64,
}

impl DimensionGroup {
    pub fn new(name: &str, range: Range<usize>, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            range,
            weight,
        }
    }
}

/// `sqrt(sum_g w_g * sum_{i in g} (a_i - b_i)^2)` over groups that partition `0..dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedMetric {
    groups: Vec<DimensionGroup>,
}

impl WeightedMetric {
    pub fn new(groups: Vec<DimensionGroup>) -> Result<Self, KMeansError> {
        let metric = Self { groups };
        metric.check()?;
        Ok(metric)
    }

    /// Plain euclidean distance: one `position` group of weight 1.
    pub fn euclidean(dim: usize) -> Self {
        Self {
            groups: vec![DimensionGroup::new("position", 0..dim, 1.0)],
        }
    }

    /// Normalised `(x, y)` followed by normalised `(r, g, b)`.
    pub fn position_color(position_weight: f64, color_weight: f64) -> Self {
        Self {
            groups: vec![
                DimensionGroup::new("position", 0..2, position_weight),
                DimensionGroup::new("color", 2..5, color_weight),
            ],
        }
    }

    pub fn groups(&self) -> &[DimensionGroup] {
        &self.groups
    }

    /// Groups must be non-empty, in order, and cover every component exactly once.
    pub fn check(&self) -> Result<(), KMeansError> {
        if self.groups.is_empty() {
            return Err(KMeansError::InvalidMetric("no dimension groups".to_string()));
        }
        let mut next = 0;
        for group in &self.groups {
            if group.range.start != next || group.range.is_empty() {
                return Err(KMeansError::InvalidMetric(format!(
                    "group '{}' covers {:?}, expected a non-empty range starting at {}",
                    group.name, group.range, next
                )));
            }
            if !group.weight.is_finite() || group.weight < 0.0 {
                return Err(KMeansError::InvalidMetric(format!(
                    "group '{}' has weight {}, weights must be finite and non-negative",
                    group.name, group.weight
                )));
            }
            next = group.range.end;
        }
        Ok(())
    }
}

impl Distance for WeightedMetric {
    fn dim(&self) -> usize {
        self.groups.last().map_or(0, |group| group.range.end)
    }

    fn squared_distance(&self, us: ArrayView1<f64>, them: ArrayView1<f64>) -> f64 {
        assert_eq!(us.len(), them.len(), "feature vectors differ in dimension");
        assert_eq!(us.len(), self.dim(), "feature vector does not match the metric");

        self.groups
            .iter()
            .map(|group| {
                let sum: f64 = group
                    .range
                    .clone()
                    .map(|i| {
                        let diff = us[i] - them[i];
                        diff * diff
                    })
                    .sum();
                group.weight * sum
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn euclidean_matches_pythagoras() {
        let metric = WeightedMetric::euclidean(3);
        let a = array![0.0, 0.0, 0.0];
        let b = array![1.0, 2.0, 2.0];
        assert_eq!(metric.distance(a.view(), b.view()), 3.0);
    }

    #[test]
    fn groups_are_weighted_independently() {
        let metric = WeightedMetric::position_color(1.0, 4.0);
        let a = array![0.0, 0.0, 0.0, 0.0, 0.0];
        let b = array![0.3, 0.4, 0.5, 0.0, 0.0];
        // 1 * (0.09 + 0.16) + 4 * 0.25
        let expected = (0.25f64 + 1.0).sqrt();
        assert!((metric.distance(a.view(), b.view()) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_ignores_group() {
        let metric = WeightedMetric::position_color(0.0, 1.0);
        let a = array![0.0, 0.0, 0.2, 0.2, 0.2];
        let b = array![1.0, 1.0, 0.2, 0.2, 0.2];
        assert_eq!(metric.distance(a.view(), b.view()), 0.0);
    }

    #[test]
    #[should_panic(expected = "differ in dimension")]
    fn mismatched_dimension_panics() {
        let metric = WeightedMetric::euclidean(3);
        let a = array![0.0, 0.0, 0.0];
        let b = array![0.0, 0.0];
        metric.distance(a.view(), b.view());
    }

    #[test]
    fn rejects_gaps_and_negative_weights() {
        let gap = WeightedMetric::new(vec![
            DimensionGroup::new("position", 0..2, 1.0),
            DimensionGroup::new("color", 3..5, 1.0),
        ]);
        assert!(matches!(gap, Err(KMeansError::InvalidMetric(_))));

        let negative = WeightedMetric::new(vec![DimensionGroup::new("position", 0..3, -1.0)]);
        assert!(matches!(negative, Err(KMeansError::InvalidMetric(_))));

        assert!(WeightedMetric::new(vec![]).is_err());
        assert_eq!(WeightedMetric::position_color(1.0, 2.0).dim(), 5);
    }
}
