//! Transform engine
//!
//! Orchestrates the three composition policies over the image-primitives
//! collaborator:
//!
//! - crop: resolve with `Inverse` so the box is filled with overflow on
//!   one axis, then trim the overflow from the origin
//! - pad (no-crop): resolve with `Auto` so the image fits within the box,
//!   then center it on a canvas of the exact requested size
//! - plain resize: resolve with `Inverse`, serve the resolved dimensions
//!
//! Crop wins when both flags are set. The engine returns encoded bytes
//! and never touches the cache; persisting is the caller's concern so a
//! failed render can never leave a partial artifact behind.

use crate::config::Options;
use crate::error::ImageflyError;
use crate::params::TransformRequest;
use crate::primitives::ImagePrimitives;
use crate::resize::{resolve, Master};

/// Renders encoded variants from decoded sources
pub struct TransformEngine<'a, P: ImagePrimitives> {
    primitives: &'a P,
    options: &'a Options,
}

impl<'a, P: ImagePrimitives> TransformEngine<'a, P> {
    pub fn new(primitives: &'a P, options: &'a Options) -> Self {
        Self {
            primitives,
            options,
        }
    }

    /// Render the variant described by `request` from an already decoded
    /// source of `src_width` x `src_height`.
    pub fn render(
        &self,
        handle: P::Handle,
        src_width: u32,
        src_height: u32,
        request: &TransformRequest,
    ) -> Result<Vec<u8>, ImageflyError> {
        let handle = if request.crop {
            let dims = resolve(
                src_width,
                src_height,
                request.width,
                request.height,
                Master::Inverse,
            );
            let resized = self.primitives.resize(handle, dims.width, dims.height)?;
            // The parser back-fills a square box for `c`, but an
            // order-sensitive URL can still leave one side empty; the
            // resolved dimension stands in for it then.
            let box_width = request.width.unwrap_or(dims.width);
            let box_height = request.height.unwrap_or(dims.height);
            self.primitives.crop(resized, box_width, box_height, 0, 0)?
        } else if request.no_crop {
            let dims = resolve(
                src_width,
                src_height,
                request.width,
                request.height,
                Master::Auto,
            );
            let resized = self.primitives.resize(handle, dims.width, dims.height)?;
            let canvas_width = request.width.unwrap_or(dims.width);
            let canvas_height = request.height.unwrap_or(dims.height);
            self.primitives.compose_on_canvas(
                canvas_width,
                canvas_height,
                &self.options.nc_color,
                resized,
            )?
        } else {
            let dims = resolve(
                src_width,
                src_height,
                request.width,
                request.height,
                Master::Inverse,
            );
            self.primitives.resize(handle, dims.width, dims.height)?
        };

        let quality = request.quality.unwrap_or(self.options.quality);
        self.primitives.encode(handle, quality)
    }
}
