use std::fs;
use std::path::Path;

use crate::error::BmpError;

pub const SIGNATURE: u16 = 0x4D42;
pub const FILE_HEADER_SIZE: usize = 14;
pub const INFO_HEADER_SIZE: usize = 40;

/// Bytes of zero padding that bring a 24-bit row up to a multiple of four.
pub fn row_padding(width: usize) -> usize {
    (4 - (width * 3) % 4) % 4
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn i32_at(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub file_type: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub offset_data: u32,
}

impl FileHeader {
    fn parse(bytes: &[u8]) -> Self {
        Self {
            file_type: u16_at(bytes, 0),
            file_size: u32_at(bytes, 2),
            reserved1: u16_at(bytes, 6),
            reserved2: u16_at(bytes, 8),
            offset_data: u32_at(bytes, 10),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.file_type.to_le_bytes());
        out.extend_from_slice(&self.file_size.to_le_bytes());
        out.extend_from_slice(&self.reserved1.to_le_bytes());
        out.extend_from_slice(&self.reserved2.to_le_bytes());
        out.extend_from_slice(&self.offset_data.to_le_bytes());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    fn parse(bytes: &[u8]) -> Self {
        Self {
            size: u32_at(bytes, 0),
            width: i32_at(bytes, 4),
            height: i32_at(bytes, 8),
            planes: u16_at(bytes, 12),
            bit_count: u16_at(bytes, 14),
            compression: u32_at(bytes, 16),
            size_image: u32_at(bytes, 20),
            x_pixels_per_meter: i32_at(bytes, 24),
            y_pixels_per_meter: i32_at(bytes, 28),
            colors_used: u32_at(bytes, 32),
            colors_important: u32_at(bytes, 36),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out.extend_from_slice(&self.compression.to_le_bytes());
        out.extend_from_slice(&self.size_image.to_le_bytes());
        out.extend_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.colors_used.to_le_bytes());
        out.extend_from_slice(&self.colors_important.to_le_bytes());
    }
}

/// An uncompressed 24-bit bitmap. Pixels are BGR triplets stored top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpImage {
    file_header: FileHeader,
    info_header: InfoHeader,
    pixels: Vec<[u8; 3]>,
}

impl BmpImage {
    pub fn new(width: usize, height: usize, pixels: Vec<[u8; 3]>) -> Result<Self, BmpError> {
        let (w, h) = match (i32::try_from(width), i32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(BmpError::UnsupportedDimensions {
                    width: i32::try_from(width).unwrap_or(i32::MAX),
                    height: i32::try_from(height).unwrap_or(i32::MAX),
                })
            }
        };
        let template = Self {
            file_header: FileHeader {
                file_type: SIGNATURE,
                file_size: 0,
                reserved1: 0,
                reserved2: 0,
                offset_data: 0,
            },
            info_header: InfoHeader {
                size: INFO_HEADER_SIZE as u32,
                width: w,
                height: h,
                planes: 1,
                bit_count: 24,
                compression: 0,
                size_image: 0,
                x_pixels_per_meter: 0,
                y_pixels_per_meter: 0,
                colors_used: 0,
                colors_important: 0,
            },
            pixels: Vec::new(),
        };
        template.with_pixels(pixels)
    }

    /// Same headers, different pixels.
    pub fn with_pixels(&self, pixels: Vec<[u8; 3]>) -> Result<Self, BmpError> {
        let expected = self.width() * self.height();
        if pixels.len() != expected {
            return Err(BmpError::PixelCountMismatch {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            file_header: self.file_header,
            info_header: self.info_header,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.info_header.width as usize
    }

    pub fn height(&self) -> usize {
        self.info_header.height as usize
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    /// BGR triplet at column `x`, row `y` counted from the top.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.pixels[y * self.width() + x]
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, BmpError> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(BmpError::Truncated("file header"));
        }
        let file_header = FileHeader::parse(&bytes[..FILE_HEADER_SIZE]);
        if file_header.file_type != SIGNATURE {
            return Err(BmpError::BadSignature(file_header.file_type));
        }

        if bytes.len() < FILE_HEADER_SIZE + INFO_HEADER_SIZE {
            return Err(BmpError::Truncated("info header"));
        }
        let info_header =
            InfoHeader::parse(&bytes[FILE_HEADER_SIZE..FILE_HEADER_SIZE + INFO_HEADER_SIZE]);

        log::debug!(
            "BMP: size {} bytes, data offset {}, {}x{}, {} bpp, compression {}",
            file_header.file_size,
            file_header.offset_data,
            info_header.width,
            info_header.height,
            info_header.bit_count,
            info_header.compression
        );

        if info_header.bit_count != 24 {
            return Err(BmpError::UnsupportedBitDepth(info_header.bit_count));
        }
        if info_header.compression != 0 {
            return Err(BmpError::Compressed(info_header.compression));
        }
        if info_header.width <= 0 || info_header.height <= 0 {
            return Err(BmpError::UnsupportedDimensions {
                width: info_header.width,
                height: info_header.height,
            });
        }

        let width = info_header.width as usize;
        let height = info_header.height as usize;
        let stride = width * 3 + row_padding(width);
        let offset = file_header.offset_data as usize;
        // the last row may come without its padding
        let needed = offset + stride * (height - 1) + width * 3;
        if bytes.len() < needed {
            return Err(BmpError::Truncated("pixel data"));
        }

        let mut pixels = vec![[0u8; 3]; width * height];
        // rows are stored bottom-up
        for row in 0..height {
            let start = offset + row * stride;
            let y = height - 1 - row;
            for x in 0..width {
                let at = start + x * 3;
                pixels[y * width + x] = [bytes[at], bytes[at + 1], bytes[at + 2]];
            }
        }

        Ok(Self {
            file_header,
            info_header,
            pixels,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let width = self.width();
        let height = self.height();
        let padding = row_padding(width);
        let image_size = (width * 3 + padding) * height;
        let header_size = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

        let file_header = FileHeader {
            file_size: (image_size + header_size) as u32,
            offset_data: header_size as u32,
            ..self.file_header
        };
        let info_header = InfoHeader {
            size: INFO_HEADER_SIZE as u32,
            size_image: image_size as u32,
            bit_count: 24,
            compression: 0,
            ..self.info_header
        };

        let mut out = Vec::with_capacity(header_size + image_size);
        file_header.write_to(&mut out);
        info_header.write_to(&mut out);
        for y in (0..height).rev() {
            for pixel in &self.pixels[y * width..(y + 1) * width] {
                out.extend_from_slice(pixel);
            }
            out.extend(std::iter::repeat(0u8).take(padding));
        }
        out
    }

    pub fn read(path: &Path) -> Result<Self, BmpError> {
        let bytes = fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn write(&self, path: &Path) -> Result<(), BmpError> {
        fs::write(path, self.encode())?;
        Ok(())
    }
}
