//! Master-dimension resolution
//!
//! Given the source dimensions, the requested box and a master hint,
//! computes the final target dimensions. The master dimension is the axis
//! whose requested value is authoritative; the other axis is derived
//! proportionally (or intentionally not, for `Precise`).

/// Resizing constraint: which axis drives the final dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Master {
    /// Use current dimensions for any missing value, no derivation
    None,
    /// Height derives from width
    Width,
    /// Width derives from height
    Height,
    /// Pick the axis with the greatest reduction (fits within the box)
    Auto,
    /// Pick the axis with the least reduction (fills the box, overflow on
    /// one axis, expected to be cropped afterwards)
    Inverse,
    /// Pick the axis whose resulting aspect ratio is closer to the box
    Precise,
}

/// Final target dimensions, derived once and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDimensions {
    pub width: u32,
    pub height: u32,
    /// The axis that ended up authoritative
    pub master: Master,
}

/// Resolve the target dimensions for a resize.
///
/// Zero values are treated the same as missing ones. `Width`/`Height`
/// hints with the corresponding value present are legacy aliases for
/// `Auto` with the other axis cleared.
pub fn resolve(
    src_width: u32,
    src_height: u32,
    width: Option<u32>,
    height: Option<u32>,
    master: Master,
) -> ResolvedDimensions {
    let mut master = master;
    let mut width = width.filter(|&w| w > 0);
    let mut height = height.filter(|&h| h > 0);

    if master == Master::Width && width.is_some() {
        master = Master::Auto;
        height = None;
    } else if master == Master::Height && height.is_some() {
        master = Master::Auto;
        width = None;
    }

    let sw = src_width as f64;
    let sh = src_height as f64;
    let mut w = width.map(|v| v as f64).unwrap_or(0.0);
    let mut h = height.map(|v| v as f64).unwrap_or(0.0);

    if width.is_none() {
        if master == Master::None {
            w = sw;
        } else {
            // Width not given, so height must drive
            master = Master::Height;
        }
    }
    if height.is_none() {
        if master == Master::None {
            h = sh;
        } else {
            master = Master::Width;
        }
    }

    master = match master {
        // Axis needing the most shrinkage wins
        Master::Auto => {
            if sw / w > sh / h {
                Master::Width
            } else {
                Master::Height
            }
        }
        // Same comparison, opposite pick
        Master::Inverse => {
            if sw / w > sh / h {
                Master::Height
            } else {
                Master::Width
            }
        }
        other => other,
    };

    match master {
        Master::Width => h = sh * w / sw,
        Master::Height => w = sw * h / sh,
        Master::Precise => {
            let ratio = sw / sh;
            if w / h > ratio {
                h = sh * w / sw;
            } else {
                w = sw * h / sh;
            }
        }
        _ => {}
    }

    ResolvedDimensions {
        width: w.round().max(1.0) as u32,
        height: h.round().max(1.0) as u32,
        master,
    }
}
