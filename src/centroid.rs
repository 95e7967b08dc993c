use ndarray::{Array2, ArrayView1, Zip};

/// Running per-cluster sums and counts for one Assignment Step.
#[derive(Debug, Clone)]
pub struct ClusterAccumulator {
    sums: Array2<f64>,
    counts: Vec<usize>,
}

impl ClusterAccumulator {
    pub fn new(k: usize, dim: usize) -> Self {
        Self {
            sums: Array2::zeros((k, dim)),
            counts: vec![0; k],
        }
    }

    pub fn reset(&mut self) {
        self.sums.fill(0.0);
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    pub fn absorb(&mut self, cluster: usize, point: ArrayView1<f64>) {
        let mut sum = self.sums.row_mut(cluster);
        sum += &point;
        self.counts[cluster] += 1;
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Some component of some centroid moved by more than epsilon.
    pub moved: bool,
    /// Clusters that received no points and kept their previous centroid.
    pub empty_clusters: Vec<usize>,
}

/// Replaces every non-empty cluster's centroid by the mean of its points. Empty clusters
/// keep their centroid bit for bit.
pub fn update_centroids(
    centroids: &mut Array2<f64>,
    accumulator: &ClusterAccumulator,
    epsilon: f64,
) -> UpdateOutcome {
    assert_eq!(centroids.dim(), accumulator.sums.dim());

    let mut moved = false;
    let mut empty_clusters = Vec::new();

    for (idx, (mut centroid, sum)) in centroids
        .rows_mut()
        .into_iter()
        .zip(accumulator.sums.rows())
        .enumerate()
    {
        let count = accumulator.counts[idx];
        if count == 0 {
            log::debug!("cluster {} received no points, keeping its centroid", idx);
            empty_clusters.push(idx);
            continue;
        }

        Zip::from(&mut centroid).and(&sum).for_each(|c, &s| {
            let mean = s / count as f64;
            if (mean - *c).abs() > epsilon {
                moved = true;
            }
            *c = mean;
        });
    }

    UpdateOutcome {
        moved,
        empty_clusters,
    }
}
