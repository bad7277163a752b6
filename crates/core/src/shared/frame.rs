use std::path::Path;

use ndarray::{Array2, ArrayView3, ArrayViewMut3};

/// A decoded raster: contiguous RGB bytes in row-major order.
///
/// Each request decodes its own frame, so the drawing surface is never
/// shared between invocations.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Decodes the image at `path`, detecting the format from its content.
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .to_rgb8();
        Ok(Self::from(img))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Luma plane using `0.299 R + 0.587 G + 0.114 B`, shaped (rows, cols).
    pub fn to_grayscale(&self) -> Array2<u8> {
        let rgb = self.as_ndarray();
        Array2::from_shape_fn((self.height as usize, self.width as usize), |(r, c)| {
            let luma = 0.299 * rgb[[r, c, 0]] as f64
                + 0.587 * rgb[[r, c, 1]] as f64
                + 0.114 * rgb[[r, c, 2]] as f64;
            luma as u8
        })
    }

    pub fn into_rgb_image(self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

impl From<image::RgbImage> for Frame {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height)
    }
}
