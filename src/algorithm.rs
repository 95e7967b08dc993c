use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::centroid::{update_centroids, ClusterAccumulator};
use crate::distance::{Distance, WeightedMetric};
use crate::error::KMeansError;
use crate::inertia::calculate_inertia;
use crate::initialization::Initializer;

#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Hard cap on the iteration counter. The loop stops here even without convergence.
    pub max_iters: usize,

    /// A centroid component moving by more than this counts as movement.
    pub epsilon: f64,

    pub init: Initializer,

    pub metric: WeightedMetric,
}

impl KMeansConfig {
    pub const DEFAULT_EPSILON: f64 = 1e-4;

    /// Raw 3-D coordinates, plain euclidean distance.
    pub fn point_cloud(k: usize) -> Self {
        Self {
            k,
            max_iters: 1000,
            epsilon: Self::DEFAULT_EPSILON,
            init: Initializer::TailSlice,
            metric: WeightedMetric::euclidean(3),
        }
    }

    /// Pixels as `(x, y, r, g, b)` with separately weighted position and colour.
    pub fn image_segmentation(k: usize, position_weight: f64, color_weight: f64) -> Self {
        Self {
            k,
            max_iters: 100,
            epsilon: Self::DEFAULT_EPSILON,
            init: Initializer::UniformSample,
            metric: WeightedMetric::position_color(position_weight, color_weight),
        }
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_init(mut self, init: Initializer) -> Self {
        self.init = init;
        self
    }

    pub fn with_metric(mut self, metric: WeightedMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn validate(&self, data: ArrayView2<f64>) -> Result<(), KMeansError> {
        self.metric.check()?;

        if data.nrows() == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        if self.k == 0 {
            return Err(KMeansError::ZeroClusters);
        }
        if self.k > data.nrows() {
            return Err(KMeansError::TooManyClusters {
                k: self.k,
                points: data.nrows(),
            });
        }
        if data.ncols() != self.metric.dim() {
            return Err(KMeansError::DimensionMismatch {
                expected: self.metric.dim(),
                found: data.ncols(),
            });
        }
        if let Some(((point, component), value)) =
            data.indexed_iter().find(|(_, value)| !value.is_finite())
        {
            return Err(KMeansError::NonFinite {
                point,
                component,
                value: *value,
            });
        }
        if self.max_iters == 0 {
            return Err(KMeansError::InvalidConfig(
                "max_iters must be at least 1".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(KMeansError::InvalidConfig(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// States of the iteration controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initialized,
    Assigning,
    Updating,
    Converged,
    MaxIterationsReached,
}

impl Phase {
    /// Transition out of `Updating`. `iterations` counts the loop-backs taken so far; the
    /// caller increments it when this returns `Assigning`.
    pub fn after_update(changed: bool, moved: bool, iterations: usize, max_iters: usize) -> Self {
        if !changed && !moved {
            Phase::Converged
        } else if iterations >= max_iters {
            Phase::MaxIterationsReached
        } else {
            Phase::Assigning
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    MaxIterationsReached,
}

#[derive(Debug, Clone)]
pub struct KMeansResult {
    pub centroids: Array2<f64>,
    pub labels: Vec<usize>,
    /// Loop-backs from Updating to Assigning, never more than `max_iters`.
    pub iterations: usize,
    pub termination: Termination,
    pub inertia: f64,
    /// Clusters that received no points in the last pass.
    pub empty_clusters: Vec<usize>,
}

/// Index of the closest centroid. Ties go to the lowest index.
pub fn nearest_centroid<M: Distance>(
    point: ArrayView1<f64>,
    centroids: ArrayView2<f64>,
    metric: &M,
) -> usize {
    let mut min_distance = f64::INFINITY;
    let mut best = 0;
    for (idx, centroid) in centroids.rows().into_iter().enumerate() {
        let distance = metric.distance(point, centroid);
        if distance < min_distance {
            min_distance = distance;
            best = idx;
        }
    }
    best
}

/// Assignment Step. Overwrites `labels`, refills `accumulator` and reports whether any
/// label differs from the previous pass.
pub fn assign_points<M: Distance>(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    metric: &M,
    labels: &mut [usize],
    accumulator: &mut ClusterAccumulator,
) -> bool {
    assert_eq!(data.nrows(), labels.len());

    accumulator.reset();
    let mut changed = false;
    for (point, label) in data.rows().into_iter().zip(labels.iter_mut()) {
        let best = nearest_centroid(point, centroids, metric);
        if *label != best {
            changed = true;
            *label = best;
        }
        accumulator.absorb(best, point);
    }
    changed
}

pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    /// Seeds centroids with the configured initializer, then iterates.
    pub fn fit<R: Rng + ?Sized>(
        &self,
        data: ArrayView2<f64>,
        rng: &mut R,
    ) -> Result<KMeansResult, KMeansError> {
        self.config.validate(data)?;
        let centroids = self.config.init.initialize(data, self.config.k, rng);
        log::info!("initialized {} centroids ({:?})", self.config.k, self.config.init);
        Ok(self.iterate(data, centroids))
    }

    /// Iterates from caller supplied centroids.
    pub fn fit_from(
        &self,
        data: ArrayView2<f64>,
        centroids: Array2<f64>,
    ) -> Result<KMeansResult, KMeansError> {
        self.config.validate(data)?;
        if centroids.nrows() != self.config.k {
            return Err(KMeansError::InvalidConfig(format!(
                "expected {} initial centroids, got {}",
                self.config.k,
                centroids.nrows()
            )));
        }
        if centroids.ncols() != data.ncols() {
            return Err(KMeansError::DimensionMismatch {
                expected: data.ncols(),
                found: centroids.ncols(),
            });
        }
        Ok(self.iterate(data, centroids))
    }

    fn iterate(&self, data: ArrayView2<f64>, mut centroids: Array2<f64>) -> KMeansResult {
        let metric = &self.config.metric;
        let mut labels = vec![0usize; data.nrows()];
        let mut accumulator = ClusterAccumulator::new(centroids.nrows(), data.ncols());
        let mut iterations = 0;
        let mut changed = false;
        let mut empty_clusters = Vec::new();
        let mut phase = Phase::Initialized;

        let termination = loop {
            phase = match phase {
                Phase::Initialized => Phase::Assigning,
                Phase::Assigning => {
                    changed = assign_points(
                        data,
                        centroids.view(),
                        metric,
                        &mut labels,
                        &mut accumulator,
                    );
                    Phase::Updating
                }
                Phase::Updating => {
                    let outcome =
                        update_centroids(&mut centroids, &accumulator, self.config.epsilon);

                    if log::log_enabled!(log::Level::Debug) {
                        let inertia =
                            calculate_inertia(data, centroids.view(), &labels, metric);
                        log::debug!(
                            "iteration {}: changed={} moved={} inertia={} centroids={:?}",
                            iterations,
                            changed,
                            outcome.moved,
                            inertia,
                            centroids.rows().into_iter().map(|c| c.to_vec()).collect::<Vec<_>>()
                        );
                    }
                    if iterations % 10 == 0 {
                        log::info!("Finished iteration {}", iterations);
                    }

                    empty_clusters = outcome.empty_clusters;
                    let next = Phase::after_update(
                        changed,
                        outcome.moved,
                        iterations,
                        self.config.max_iters,
                    );
                    if next == Phase::Assigning {
                        iterations += 1;
                    }
                    next
                }
                Phase::Converged => break Termination::Converged,
                Phase::MaxIterationsReached => break Termination::MaxIterationsReached,
            };
        };

        match termination {
            Termination::Converged => log::info!("Converged after {} iterations", iterations),
            Termination::MaxIterationsReached => log::info!(
                "Stopped at the iteration cap ({}) without converging",
                self.config.max_iters
            ),
        }
        if !empty_clusters.is_empty() {
            log::debug!("clusters left empty: {:?}", empty_clusters);
        }

        let inertia = calculate_inertia(data, centroids.view(), &labels, metric);

        KMeansResult {
            centroids,
            labels,
            iterations,
            termination,
            inertia,
            empty_clusters,
        }
    }
}
