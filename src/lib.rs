//! imagefly — on-demand image transformation cache
//!
//! Given a source image and a hyphen-delimited parameter string from the
//! URL (e.g. `w400`, `c-w300-h300`, `nc-w300-h600-q75`), renders the
//! requested variant once, stores it under a content-addressed key and
//! serves it from the cache thereafter, honoring `If-Modified-Since`
//! conditional requests.
//!
//! The hosting web framework owns routing and the socket; it resolves the
//! source path, extracts the parameter string and calls
//! [`Imagefly::handle`], translating the returned [`ImageResponse`] onto
//! the wire:
//!
//! ```no_run
//! use imagefly::{Imagefly, Options};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), imagefly::ImageflyError> {
//! let fly = Imagefly::new(Options::default());
//! let response = fly
//!     .handle("c-w300-h300", Path::new("/img/photo.jpg"), None)
//!     .await?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod params;
pub mod primitives;
pub mod resize;
pub mod serve;

pub use cache::{CacheKey, CacheStore};
pub use config::Options;
pub use engine::TransformEngine;
pub use error::ImageflyError;
pub use params::TransformRequest;
pub use primitives::{ImageCodec, ImagePrimitives};
pub use resize::{resolve, Master, ResolvedDimensions};
pub use serve::{ImageResponse, Imagefly};
