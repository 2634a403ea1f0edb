//! URL parameter parsing
//!
//! Turns a hyphen-delimited token string (e.g. `c-w300-h300-q75`) into an
//! immutable [`TransformRequest`]. Recognized tokens:
//!
//! - `w<int>` target width
//! - `h<int>` target height
//! - `q<int>` encoding quality (1-100)
//! - `c` crop to the exact box
//! - `nc` no-crop: fit within the box and pad onto a canvas
//!
//! Any other token is preserved verbatim for downstream collaborators
//! (watermarking and the like); the parser does not interpret them.

use std::path::{Path, PathBuf};

use crate::config::Options;
use crate::error::ImageflyError;

/// Parsed resize/crop intent for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    /// Absolute path of the source file
    pub source: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Crop to the exact requested box (wins over `no_crop` when both set)
    pub crop: bool,
    /// Fit within the box and center on a filled canvas
    pub no_crop: bool,
    pub quality: Option<u8>,
    /// Unrecognized tokens, in URL order, duplicates removed
    pub extras: Vec<String>,
}

impl TransformRequest {
    /// Parse a raw parameter token string against a source image.
    ///
    /// The crop back-fill (a lone `w` or `h` with `c` producing a square
    /// box) is applied at the moment the `c` token is consumed, using only
    /// the values parsed up to that point. A `c` appearing before its
    /// paired dimension token therefore does not back-fill.
    pub fn parse(
        raw: &str,
        source: &Path,
        src_width: u32,
        src_height: u32,
        options: &Options,
    ) -> Result<Self, ImageflyError> {
        let mut request = TransformRequest {
            source: source.to_path_buf(),
            width: None,
            height: None,
            crop: false,
            no_crop: false,
            quality: None,
            extras: Vec::new(),
        };

        for token in raw.split('-') {
            if token.is_empty() {
                continue;
            }
            match token {
                "c" => {
                    request.crop = true;
                    if request.width.is_none() {
                        request.width = request.height;
                    }
                    if request.height.is_none() {
                        request.height = request.width;
                    }
                }
                "nc" => request.no_crop = true,
                _ => {
                    if let Some(w) = numeric_value(token, 'w') {
                        request.width = parse_dimension("w", w)?;
                    } else if let Some(h) = numeric_value(token, 'h') {
                        request.height = parse_dimension("h", h)?;
                    } else if let Some(q) = numeric_value(token, 'q') {
                        request.quality = Some(parse_quality(q)?);
                    } else if !request.extras.iter().any(|e| e == token) {
                        request.extras.push(token.to_string());
                    }
                }
            }
        }

        // Do not scale up beyond the natural dimensions
        if !options.scale_up {
            if let Some(w) = request.width {
                if w > src_width {
                    request.width = Some(src_width);
                }
            }
            if let Some(h) = request.height {
                if h > src_height {
                    request.height = Some(src_height);
                }
            }
        }

        if request.width.is_none() && request.height.is_none() {
            return Err(ImageflyError::InvalidRequest(
                "at least one of width or height is required".to_string(),
            ));
        }

        Ok(request)
    }

    /// Stable query-style encoding of the parameter set.
    ///
    /// Recognized parameters come first in a fixed order, then extra tokens
    /// sorted lexically, so that two visually equivalent requests encode
    /// identically regardless of extra-token order in the URL.
    pub fn canonical_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("w={}", w));
        }
        if let Some(h) = self.height {
            parts.push(format!("h={}", h));
        }
        if self.crop {
            parts.push("c=1".to_string());
        }
        if self.no_crop {
            parts.push("nc=1".to_string());
        }
        if let Some(q) = self.quality {
            parts.push(format!("q={}", q));
        }
        let mut extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
        extras.sort_unstable();
        for extra in extras {
            parts.push(format!("x={}", extra));
        }
        parts.join("&")
    }
}

/// Value of a `<prefix><digits>` token, or None if the token is anything else
fn numeric_value(token: &str, prefix: char) -> Option<&str> {
    token
        .strip_prefix(prefix)
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_dimension(param: &str, value: &str) -> Result<Option<u32>, ImageflyError> {
    let parsed: u32 = value.parse().map_err(|_| {
        ImageflyError::InvalidRequest(format!("parameter '{}' out of range: {}", param, value))
    })?;
    // Zero is the same as absent
    Ok((parsed > 0).then_some(parsed))
}

fn parse_quality(value: &str) -> Result<u8, ImageflyError> {
    let quality: u8 = value.parse().map_err(|_| {
        ImageflyError::InvalidRequest(format!("quality out of range: {}", value))
    })?;
    if !(1..=100).contains(&quality) {
        return Err(ImageflyError::InvalidRequest(format!(
            "quality must be 1-100, got {}",
            quality
        )));
    }
    Ok(quality)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<TransformRequest, ImageflyError> {
        parse_with(raw, &Options::default())
    }

    fn parse_with(raw: &str, options: &Options) -> Result<TransformRequest, ImageflyError> {
        TransformRequest::parse(raw, Path::new("/img/photo.jpg"), 800, 600, options)
    }

    #[test]
    fn test_parse_width_only() {
        let request = parse("w400").unwrap();
        assert_eq!(request.width, Some(400));
        assert_eq!(request.height, None);
        assert!(!request.crop);
        assert!(!request.no_crop);
        assert_eq!(request.quality, None);
    }

    #[test]
    fn test_parse_all_recognized() {
        let request = parse("w400-h300-q75-nc").unwrap();
        assert_eq!(request.width, Some(400));
        assert_eq!(request.height, Some(300));
        assert_eq!(request.quality, Some(75));
        assert!(request.no_crop);
    }

    #[test]
    fn test_crop_backfills_height_from_width() {
        let request = parse("w300-c").unwrap();
        assert!(request.crop);
        assert_eq!(request.width, Some(300));
        assert_eq!(request.height, Some(300));
    }

    #[test]
    fn test_crop_backfills_width_from_height() {
        let request = parse("h250-c").unwrap();
        assert_eq!(request.width, Some(250));
        assert_eq!(request.height, Some(250));
    }

    #[test]
    fn test_crop_before_dimension_does_not_backfill() {
        // The back-fill only sees values parsed before the `c` token
        let request = parse("c-w300").unwrap();
        assert!(request.crop);
        assert_eq!(request.width, Some(300));
        assert_eq!(request.height, None);
    }

    #[test]
    fn test_crop_with_both_dimensions() {
        let request = parse("c-w300-h300").unwrap();
        assert!(request.crop);
        assert_eq!(request.width, Some(300));
        assert_eq!(request.height, Some(300));
    }

    #[test]
    fn test_extras_preserved_in_order_without_duplicates() {
        let request = parse("wm1-w400-logo-wm1").unwrap();
        assert_eq!(request.extras, vec!["wm1", "logo"]);
    }

    #[test]
    fn test_prefix_token_with_non_numeric_value_is_extra() {
        let request = parse("w400-wmlogo").unwrap();
        assert_eq!(request.width, Some(400));
        assert_eq!(request.extras, vec!["wmlogo"]);
    }

    #[test]
    fn test_zero_dimension_is_absent() {
        let request = parse("w0-h300").unwrap();
        assert_eq!(request.width, None);
        assert_eq!(request.height, Some(300));
    }

    #[test]
    fn test_no_dimensions_rejected() {
        let err = parse("q80-logo").unwrap_err();
        assert!(matches!(err, ImageflyError::InvalidRequest(_)));
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        assert!(parse("w400-q0").is_err());
        assert!(parse("w400-q101").is_err());
        assert!(parse("w400-q100").is_ok());
        assert!(parse("w400-q1").is_ok());
    }

    #[test]
    fn test_no_scale_up_clamps_to_natural_dimensions() {
        let request = parse("w1600-h1200").unwrap();
        assert_eq!(request.width, Some(800));
        assert_eq!(request.height, Some(600));
    }

    #[test]
    fn test_scale_up_allowed_when_configured() {
        let options = Options {
            scale_up: true,
            ..Options::default()
        };
        let request = parse_with("w1600", &options).unwrap();
        assert_eq!(request.width, Some(1600));
    }

    #[test]
    fn test_canonical_query_stable_under_extra_reordering() {
        let a = parse("w400-h300-wm1-logo").unwrap();
        let b = parse("logo-w400-wm1-h300").unwrap();
        assert_eq!(a.canonical_query(), b.canonical_query());
    }

    #[test]
    fn test_canonical_query_contents() {
        let request = parse("c-w300-h300-q75").unwrap();
        assert_eq!(request.canonical_query(), "w=300&h=300&c=1&q=75");
    }

    #[test]
    fn test_canonical_query_differs_per_parameter() {
        let a = parse("w400").unwrap();
        let b = parse("w400-nc").unwrap();
        let c = parse("w400-q90").unwrap();
        assert_ne!(a.canonical_query(), b.canonical_query());
        assert_ne!(a.canonical_query(), c.canonical_query());
        assert_ne!(b.canonical_query(), c.canonical_query());
    }
}
