use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::algorithm::KMeansConfig;
use crate::initialization::Initializer;

#[derive(Parser, Clone, Debug)]
#[command(name = "kmeans")]
#[command(about = "K-means clustering of 3-D point clouds and 24-bit BMP images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(about = "Cluster 3-D points (random or read from a text file)")]
    Points(PointsArgs),

    #[command(about = "Segment a 24-bit BMP by position and colour")]
    Image(ImageArgs),
}

#[derive(clap::Args, Clone, Debug)]
pub struct EngineParams {
    /// Maximum number of iterations (default 1000 for points, 100 for images)
    #[arg(long, help_heading = "Clustering")]
    pub max_iters: Option<usize>,

    /// Centroid displacement that still counts as movement
    #[arg(long, default_value_t = KMeansConfig::DEFAULT_EPSILON, help_heading = "Clustering")]
    pub epsilon: f64,

    /// Initial centroid strategy (default tail-slice for points, uniform-sample for images)
    #[arg(long, value_enum, help_heading = "Clustering")]
    pub init: Option<Initializer>,

    /// Seed for the random generator (drawn from the OS when absent)
    #[arg(long, help_heading = "Clustering")]
    pub seed: Option<u64>,
}

impl EngineParams {
    /// Overrides the per-instantiation defaults with whatever was given on the command line.
    pub fn apply(&self, mut config: KMeansConfig) -> KMeansConfig {
        if let Some(max_iters) = self.max_iters {
            config = config.with_max_iters(max_iters);
        }
        if let Some(init) = self.init {
            config = config.with_init(init);
        }
        config.with_epsilon(self.epsilon)
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct PointsArgs {
    /// Number of clusters
    #[arg(short, long, default_value_t = 3)]
    pub k: usize,

    /// Whitespace separated 3-D points, one per line (random points when absent)
    #[arg(short, long, help_heading = "I/O")]
    pub input: Option<PathBuf>,

    /// Points and their labels
    #[arg(long, default_value = "cluster_data.txt", help_heading = "I/O")]
    pub data_out: PathBuf,

    /// Final centroids
    #[arg(long, default_value = "centroids.txt", help_heading = "I/O")]
    pub centroids_out: PathBuf,

    /// Number of random points
    #[arg(long, default_value_t = 10000, help_heading = "Random points")]
    pub count: usize,

    /// Lower bound of every coordinate
    #[arg(long, default_value_t = -5.0, allow_hyphen_values = true, help_heading = "Random points")]
    pub low: f64,

    /// Upper bound (exclusive) of every coordinate
    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true, help_heading = "Random points")]
    pub high: f64,

    #[command(flatten)]
    pub engine: EngineParams,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ImageArgs {
    /// Number of clusters
    #[arg(short, long, default_value_t = 16)]
    pub k: usize,

    /// Uncompressed 24-bit BMP to segment
    #[arg(short, long, default_value = "low_res_image.bmp", help_heading = "I/O")]
    pub input: PathBuf,

    /// Segmented BMP
    #[arg(short, long, default_value = "output.bmp", help_heading = "I/O")]
    pub output: PathBuf,

    /// Colour dump of the input pixels (x y color_sum r g b)
    #[arg(long, help_heading = "I/O")]
    pub original_colors: Option<PathBuf>,

    /// Colour dump of the segmented pixels (x y color_sum r g b)
    #[arg(long, help_heading = "I/O")]
    pub segmented_colors: Option<PathBuf>,

    /// Final centroids (x y r g b)
    #[arg(long, help_heading = "I/O")]
    pub centroids_out: Option<PathBuf>,

    /// Cluster label of every pixel, top row first
    #[arg(long, help_heading = "I/O")]
    pub labels_out: Option<PathBuf>,

    /// Weight of the squared position distance
    #[arg(long, default_value_t = 1.0, help_heading = "Weights")]
    pub position_weight: f64,

    /// Weight of the squared colour distance
    #[arg(long, default_value_t = 4.0, help_heading = "Weights")]
    pub color_weight: f64,

    #[command(flatten)]
    pub engine: EngineParams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn per_instantiation_defaults_survive_when_not_overridden() {
        let cli = Cli::parse_from(["kmeans", "points"]);
        let Commands::Points(args) = cli.command else {
            panic!("expected points");
        };
        let config = args.engine.apply(KMeansConfig::point_cloud(args.k));
        assert_eq!(config.max_iters, 1000);
        assert_eq!(config.init, Initializer::TailSlice);
        assert_eq!(args.low, -5.0);

        let cli = Cli::parse_from([
            "kmeans",
            "image",
            "--max-iters",
            "7",
            "--init",
            "tail-slice",
            "--color-weight",
            "2",
        ]);
        let Commands::Image(args) = cli.command else {
            panic!("expected image");
        };
        let config = args.engine.apply(KMeansConfig::image_segmentation(
            args.k,
            args.position_weight,
            args.color_weight,
        ));
        assert_eq!(config.max_iters, 7);
        assert_eq!(config.init, Initializer::TailSlice);
        assert_eq!(config.k, 16);
        assert_eq!(config.metric.groups()[1].weight, 2.0);
    }
}
