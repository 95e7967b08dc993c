use thiserror::Error;

/// Input validation failures. A run that hits one of these produces no result.
#[derive(Debug, Error)]
pub enum KMeansError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("number of clusters must be at least 1")]
    ZeroClusters,
    #[error("number of clusters ({k}) cannot be greater than the number of data points ({points})")]
    TooManyClusters { k: usize, points: usize },
    #[error("feature dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("point {point} has non-finite component {component} ({value})")]
    NonFinite {
        point: usize,
        component: usize,
        value: f64,
    },
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Decode failures of the BMP reader. The reader never hands out a partially decoded image.
#[derive(Debug, Error)]
pub enum BmpError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("file ends before the {0} is complete")]
    Truncated(&'static str),
    #[error("not a BMP file (signature 0x{0:04X}, expected 0x4D42)")]
    BadSignature(u16),
    #[error("only 24-bit BMP files are supported, this image is {0}-bit")]
    UnsupportedBitDepth(u16),
    #[error("compressed BMP files are not supported (compression {0})")]
    Compressed(u32),
    #[error("unsupported image dimensions {width}x{height}")]
    UnsupportedDimensions { width: i32, height: i32 },
    #[error("expected {expected} pixels, got {found}")]
    PixelCountMismatch { expected: usize, found: usize },
}

/// Failures reading a whitespace separated point file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("invalid coordinate range [{low}, {high})")]
    InvalidRange { low: f64, high: f64 },
    #[error("line {line}: expected {expected} values, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
}
