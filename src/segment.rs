use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::{s, Array2, ArrayView2};

use crate::bmp::BmpImage;
use crate::error::BmpError;

/// Components of a pixel feature vector.
pub const PIXEL_DIMS: usize = 5;
const COLOR: std::ops::Range<usize> = 2..5;

/// One row per pixel, top row first: `x / width, y / height, r, g, b` with channels in `[0, 1]`.
pub fn pixels_to_features(image: &BmpImage) -> Array2<f64> {
    let width = image.width();
    let height = image.height();
    Array2::from_shape_fn((width * height, PIXEL_DIMS), |(idx, component)| {
        let (x, y) = (idx % width, idx / width);
        let [b, g, r] = image.pixels()[idx];
        match component {
            0 => x as f64 / width as f64,
            1 => y as f64 / height as f64,
            2 => r as f64 / 255.0,
            3 => g as f64 / 255.0,
            _ => b as f64 / 255.0,
        }
    })
}

fn channel_to_byte(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

/// BGR bytes from the colour components of each feature row.
pub fn features_to_pixels(features: ArrayView2<f64>) -> Vec<[u8; 3]> {
    features
        .rows()
        .into_iter()
        .map(|f| {
            [
                channel_to_byte(f[4]),
                channel_to_byte(f[3]),
                channel_to_byte(f[2]),
            ]
        })
        .collect()
}

/// Every pixel keeps its position and takes the colour of its cluster's centroid.
pub fn segmented_features(
    features: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    labels: &[usize],
) -> Array2<f64> {
    let mut segmented = features.to_owned();
    for (mut row, &label) in segmented.rows_mut().into_iter().zip(labels) {
        row.slice_mut(s![COLOR]).assign(&centroids.slice(s![label, COLOR]));
    }
    segmented
}

/// `image` repainted with cluster colours. `features` must come from `pixels_to_features(image)`.
pub fn render_segmented(
    image: &BmpImage,
    features: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    labels: &[usize],
) -> Result<BmpImage, BmpError> {
    let segmented = segmented_features(features, centroids, labels);
    image.with_pixels(features_to_pixels(segmented.view()))
}

/// `x y color_sum r g b` per pixel.
pub fn save_color_data(path: &Path, features: ArrayView2<f64>) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for f in features.rows() {
        let (r, g, b) = (f[2], f[3], f[4]);
        writeln!(out, "{} {} {} {} {} {}", f[0], f[1], r + g + b, r, g, b)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{KMeans, KMeansConfig};
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    fn checkerboard() -> BmpImage {
        // 3 wide so every row carries padding
        let pixels = (0..3 * 4)
            .map(|i| if (i % 3 + i / 3) % 2 == 0 { [0, 0, 255] } else { [255, 255, 255] })
            .collect();
        BmpImage::new(3, 4, pixels).unwrap()
    }

    #[test]
    fn features_are_normalised_top_down() {
        let image = BmpImage::new(2, 2, vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [51, 102, 153]])
            .unwrap();
        let features = pixels_to_features(&image);
        assert_eq!(features.row(0).to_vec(), vec![0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(features.row(1).to_vec(), vec![0.5, 0.0, 0.0, 1.0, 0.0]);
        assert_eq!(features.row(2).to_vec(), vec![0.0, 0.5, 1.0, 0.0, 0.0]);
        assert_eq!(features.row(3).to_vec(), vec![0.5, 0.5, 0.6, 0.4, 0.2]);
    }

    #[test]
    fn identity_assignment_reproduces_original_bytes() {
        let original = checkerboard().encode();
        let image = BmpImage::decode(&original).unwrap();
        let features = pixels_to_features(&image);

        // every pixel its own cluster
        let labels: Vec<usize> = (0..features.nrows()).collect();
        let rebuilt = render_segmented(&image, features.view(), features.view(), &labels).unwrap();
        assert_eq!(rebuilt.encode(), original);
    }

    #[test]
    fn segmentation_paints_cluster_colours() {
        let image = checkerboard();
        let features = pixels_to_features(&image);
        let config = KMeansConfig::image_segmentation(2, 0.0, 1.0);
        let result = KMeans::new(config)
            .fit(features.view(), &mut StdRng::seed_from_u64(1))
            .unwrap();

        let segmented = render_segmented(
            &image,
            features.view(),
            result.centroids.view(),
            &result.labels,
        )
        .unwrap();
        let mut colours: Vec<[u8; 3]> = segmented.pixels().to_vec();
        colours.sort();
        colours.dedup();
        assert!(colours.len() <= 2);
        assert_eq!(segmented.pixels().len(), 12);
    }

    #[test]
    fn colour_dump_has_six_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colors.txt");
        let features = array![[0.0, 0.5, 1.0, 0.5, 0.25]];
        save_color_data(&path, features.view()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "0 0.5 1.75 1 0.5 0.25\n"
        );
    }

    #[test]
    fn channels_are_rounded_and_clamped() {
        assert_eq!(channel_to_byte(-0.2), 0);
        assert_eq!(channel_to_byte(1.3), 255);
        assert_eq!(channel_to_byte(0.5), 128);
        assert_eq!(channel_to_byte(100.0 / 255.0), 100);
    }
}
