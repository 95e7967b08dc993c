pub mod algorithm;
pub mod bmp;
pub mod centroid;
pub mod cli;
pub mod distance;
pub mod error;
pub mod inertia;
pub mod initialization;
pub mod load;
pub mod logger;
pub mod segment;

pub use self::{
    algorithm::KMeans, algorithm::KMeansConfig, algorithm::KMeansResult, algorithm::Termination,
    bmp::BmpImage, distance::DimensionGroup, distance::Distance, distance::WeightedMetric,
    error::BmpError, error::KMeansError, error::LoadError, initialization::Initializer,
};
