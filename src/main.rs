use std::error::Error;

use clap::Parser;
use log::LevelFilter;
use rand::{rngs::StdRng, SeedableRng};

use kmeans_weighted_bmp_segmentation::cli::{Cli, Commands, ImageArgs, PointsArgs};
use kmeans_weighted_bmp_segmentation::load::{
    generate_points, load_points, save_centroids, save_labeled_points, save_labels,
};
use kmeans_weighted_bmp_segmentation::logger::init_logger;
use kmeans_weighted_bmp_segmentation::segment::{
    pixels_to_features, render_segmented, save_color_data, segmented_features,
};
use kmeans_weighted_bmp_segmentation::{BmpImage, KMeans, KMeansConfig, KMeansResult};

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn report(result: &KMeansResult) {
    log::info!(
        "{:?} after {} iterations - Inertia: {}",
        result.termination,
        result.iterations,
        result.inertia
    );
    if !result.empty_clusters.is_empty() {
        log::warn!("clusters without points: {:?}", result.empty_clusters);
    }
}

fn run_points(args: &PointsArgs) -> Result<(), Box<dyn Error>> {
    let mut rng = make_rng(args.engine.seed);

    let data = match &args.input {
        Some(path) => load_points(path)?,
        None => generate_points(args.count, 3, args.low, args.high, &mut rng)?,
    };

    let config = args.engine.apply(KMeansConfig::point_cloud(args.k));
    log::info!("Starting KMeans on {} points: {:?}", data.nrows(), config);
    let result = KMeans::new(config).fit(data.view(), &mut rng)?;
    report(&result);

    save_labeled_points(&args.data_out, data.view(), &result.labels)?;
    save_centroids(&args.centroids_out, result.centroids.view())?;
    log::info!(
        "Data written to {} and {}",
        args.data_out.display(),
        args.centroids_out.display()
    );
    Ok(())
}

fn run_image(args: &ImageArgs) -> Result<(), Box<dyn Error>> {
    let image = BmpImage::read(&args.input)?;
    log::info!("Image loaded: {}x{}", image.width(), image.height());

    let features = pixels_to_features(&image);
    if let Some(path) = &args.original_colors {
        save_color_data(path, features.view())?;
    }

    let config = args.engine.apply(KMeansConfig::image_segmentation(
        args.k,
        args.position_weight,
        args.color_weight,
    ));
    log::info!("Starting KMeans on {} pixels: {:?}", features.nrows(), config);
    let mut rng = make_rng(args.engine.seed);
    let result = KMeans::new(config).fit(features.view(), &mut rng)?;
    report(&result);

    if let Some(path) = &args.segmented_colors {
        let segmented =
            segmented_features(features.view(), result.centroids.view(), &result.labels);
        save_color_data(path, segmented.view())?;
    }
    if let Some(path) = &args.centroids_out {
        save_centroids(path, result.centroids.view())?;
    }
    if let Some(path) = &args.labels_out {
        save_labels(path, &result.labels)?;
    }

    render_segmented(&image, features.view(), result.centroids.view(), &result.labels)?
        .write(&args.output)?;
    log::info!("Segmented image saved to {}", args.output.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logger(level).expect("Failed to initialize logger");

    let outcome = match &cli.command {
        Commands::Points(args) => run_points(args),
        Commands::Image(args) => run_image(args),
    };
    if let Err(e) = outcome {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("finished");
}
