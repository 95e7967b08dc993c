use ndarray::{s, Array2, ArrayView2, Axis};
use rand::Rng;

/// How the first `k` centroids are picked from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Initializer {
    /// The last `k` points, in input order. Reproducible for a fixed input, but the
    /// quality of the seeds depends on how the input happens to be ordered.
    TailSlice,
    /// `k` independent uniform draws with replacement; seeds may coincide.
    UniformSample,
}

impl Initializer {
    pub fn initialize<R: Rng + ?Sized>(
        &self,
        data: ArrayView2<f64>,
        k: usize,
        rng: &mut R,
    ) -> Array2<f64> {
        assert!(k >= 1 && k <= data.nrows(), "k must be in 1..=points");

        match self {
            Initializer::TailSlice => tail_slice(data, k),
            Initializer::UniformSample => uniform_sample(data, k, rng),
        }
    }
}

pub fn tail_slice(data: ArrayView2<f64>, k: usize) -> Array2<f64> {
    data.slice(s![data.nrows() - k.., ..]).to_owned()
}

pub fn uniform_sample<R: Rng + ?Sized>(
    data: ArrayView2<f64>,
    k: usize,
    rng: &mut R,
) -> Array2<f64> {
    let indices: Vec<usize> = (0..k).map(|_| rng.gen_range(0..data.nrows())).collect();
    log::debug!("sampled initial centroids from rows {:?}", indices);
    data.select(Axis(0), &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn tail_slice_keeps_input_order() {
        let data = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let centroids = Initializer::TailSlice.initialize(data.view(), 2, &mut rng);
        assert_eq!(centroids, array![[2.0, 2.0], [3.0, 3.0]]);
    }

    #[test]
    fn uniform_sample_is_reproducible_for_a_seed() {
        let data = Array2::from_shape_fn((50, 3), |(i, j)| (i * 3 + j) as f64);
        let a = uniform_sample(data.view(), 5, &mut StdRng::seed_from_u64(42));
        let b = uniform_sample(data.view(), 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        for row in a.rows() {
            assert!(data.rows().into_iter().any(|r| r == row));
        }
    }

    #[test]
    fn uniform_sample_draws_with_replacement() {
        let data = array![[0.0], [1.0]];
        let duplicated = (0..64).any(|seed| {
            let c = uniform_sample(data.view(), 2, &mut StdRng::seed_from_u64(seed));
            c[[0, 0]] == c[[1, 0]]
        });
        assert!(duplicated);
    }
}
