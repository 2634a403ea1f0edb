//! Image primitives boundary
//!
//! The pipeline core never touches pixels directly; it drives the
//! [`ImagePrimitives`] collaborator, which owns decoding, scaling,
//! cropping, canvas composition and encoding. The production
//! implementation is [`ImageCodec`]: the `image` crate for codec work
//! and `fast_image_resize` (Lanczos3) for scaling.

use std::io::Cursor;
use std::num::NonZeroU32;
use std::path::Path;

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::ImageflyError;

/// Codec and resize capability injected into the transform engine
#[cfg_attr(test, mockall::automock(type Handle = ();))]
pub trait ImagePrimitives {
    /// Opaque decoded-image handle, owned by the implementation
    type Handle: Send;

    /// Decode the file at `path`, returning its natural dimensions
    fn decode(&self, path: &Path) -> Result<(u32, u32, Self::Handle), ImageflyError>;

    /// Scale to exactly `width` x `height`
    fn resize(
        &self,
        handle: Self::Handle,
        width: u32,
        height: u32,
    ) -> Result<Self::Handle, ImageflyError>;

    /// Crop a `width` x `height` window at offset (`x`, `y`)
    fn crop(
        &self,
        handle: Self::Handle,
        width: u32,
        height: u32,
        x: u32,
        y: u32,
    ) -> Result<Self::Handle, ImageflyError>;

    /// Center the image on a `width` x `height` canvas filled with
    /// `background` (hex RGB, e.g. `#ffffff`)
    fn compose_on_canvas(
        &self,
        width: u32,
        height: u32,
        background: &str,
        handle: Self::Handle,
    ) -> Result<Self::Handle, ImageflyError>;

    /// Encode to the handle's source format at the given quality
    fn encode(&self, handle: Self::Handle, quality: u8) -> Result<Vec<u8>, ImageflyError>;

    /// MIME type for a file path, by extension
    fn mime_type(&self, path: &Path) -> String;
}

/// Production implementation backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

/// Decoded image plus the format it was decoded from; variants are
/// always re-encoded to the source format
#[derive(Debug)]
pub struct CodecHandle {
    image: DynamicImage,
    format: ImageFormat,
}

impl ImagePrimitives for ImageCodec {
    type Handle = CodecHandle;

    fn decode(&self, path: &Path) -> Result<(u32, u32, CodecHandle), ImageflyError> {
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|_| ImageflyError::SourceNotFound {
                path: path.to_path_buf(),
            })?;
        let format = reader.format().unwrap_or(ImageFormat::Jpeg);
        let image = reader
            .decode()
            .map_err(|e| ImageflyError::TransformFailure(e.to_string()))?;
        let (width, height) = (image.width(), image.height());
        Ok((width, height, CodecHandle { image, format }))
    }

    fn resize(
        &self,
        handle: CodecHandle,
        width: u32,
        height: u32,
    ) -> Result<CodecHandle, ImageflyError> {
        let src_width = NonZeroU32::new(handle.image.width())
            .ok_or_else(|| ImageflyError::TransformFailure("source width is 0".to_string()))?;
        let src_height = NonZeroU32::new(handle.image.height())
            .ok_or_else(|| ImageflyError::TransformFailure("source height is 0".to_string()))?;
        let dst_width = NonZeroU32::new(width)
            .ok_or_else(|| ImageflyError::TransformFailure("target width is 0".to_string()))?;
        let dst_height = NonZeroU32::new(height)
            .ok_or_else(|| ImageflyError::TransformFailure("target height is 0".to_string()))?;

        let src_image = Image::from_vec_u8(
            src_width,
            src_height,
            handle.image.to_rgba8().into_raw(),
            PixelType::U8x4,
        )
        .map_err(|e| ImageflyError::TransformFailure(format!("resize source: {:?}", e)))?;

        let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);
        let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
        resizer
            .resize(&src_image.view(), &mut dst_image.view_mut())
            .map_err(|e| ImageflyError::TransformFailure(format!("resize: {:?}", e)))?;

        let buffer = RgbaImage::from_raw(width, height, dst_image.into_vec()).ok_or_else(|| {
            ImageflyError::TransformFailure("resize output buffer mismatch".to_string())
        })?;

        Ok(CodecHandle {
            image: DynamicImage::ImageRgba8(buffer),
            format: handle.format,
        })
    }

    fn crop(
        &self,
        handle: CodecHandle,
        width: u32,
        height: u32,
        x: u32,
        y: u32,
    ) -> Result<CodecHandle, ImageflyError> {
        Ok(CodecHandle {
            image: handle.image.crop_imm(x, y, width, height),
            format: handle.format,
        })
    }

    fn compose_on_canvas(
        &self,
        width: u32,
        height: u32,
        background: &str,
        handle: CodecHandle,
    ) -> Result<CodecHandle, ImageflyError> {
        let mut canvas = RgbaImage::from_pixel(width, height, parse_hex_color(background));
        let overlay = handle.image.to_rgba8();
        let x = width.saturating_sub(overlay.width()) / 2;
        let y = height.saturating_sub(overlay.height()) / 2;
        image::imageops::overlay(&mut canvas, &overlay, x as i64, y as i64);
        Ok(CodecHandle {
            image: DynamicImage::ImageRgba8(canvas),
            format: handle.format,
        })
    }

    fn encode(&self, handle: CodecHandle, quality: u8) -> Result<Vec<u8>, ImageflyError> {
        match handle.format {
            ImageFormat::Jpeg => {
                let rgb = handle.image.to_rgb8();
                let mut buffer = Cursor::new(Vec::new());
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
                encoder
                    .encode_image(&rgb)
                    .map_err(|e| ImageflyError::TransformFailure(e.to_string()))?;
                Ok(buffer.into_inner())
            }
            ImageFormat::WebP => {
                // `image` decodes WebP but does not encode it
                let rgba = handle.image.to_rgba8();
                let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
                Ok(encoder.encode(quality as f32).to_vec())
            }
            format => {
                let mut buffer = Cursor::new(Vec::new());
                handle
                    .image
                    .write_to(&mut buffer, format)
                    .map_err(|e| ImageflyError::TransformFailure(e.to_string()))?;
                Ok(buffer.into_inner())
            }
        }
    }

    fn mime_type(&self, path: &Path) -> String {
        let extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "application/octet-stream",
        }
        .to_string()
    }
}

/// Parse `#rrggbb` into an opaque pixel; anything malformed falls back
/// to white rather than failing the request.
fn parse_hex_color(color: &str) -> Rgba<u8> {
    let hex = color.trim_start_matches('#');
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        let channel = |i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(255);
        Rgba([channel(0), channel(2), channel(4), 255])
    } else {
        Rgba([255, 255, 255, 255])
    }
}
