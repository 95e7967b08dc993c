use ndarray::ArrayView2;

use crate::distance::Distance;

/// Within-cluster sum of squared (weighted) distances.
pub fn calculate_inertia<M: Distance>(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    labels: &[usize],
    metric: &M,
) -> f64 {
    data.rows()
        .into_iter()
        .zip(labels)
        .map(|(point, &label)| metric.squared_distance(point, centroids.row(label)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightedMetric;
    use ndarray::array;

    #[test]
    fn sums_squared_distances_to_assigned_centroid() {
        let data = array![[0.0, 0.0], [2.0, 0.0], [10.0, 10.0]];
        let centroids = array![[1.0, 0.0], [10.0, 11.0]];
        let metric = WeightedMetric::euclidean(2);
        let inertia = calculate_inertia(data.view(), centroids.view(), &[0, 0, 1], &metric);
        assert_eq!(inertia, 3.0);
    }
}
