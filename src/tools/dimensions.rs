/// Target-dimension arithmetic for the image resizer.
///
/// Pure math, no I/O. Fractional pixel dimensions are allowed here;
/// the resize pipeline rounds before rasterizing.
use crate::error::{ToolboxError, ToolboxResult};

/// Compute the output dimensions for a resize.
///
/// With the aspect lock on:
/// - one target dimension given: the other follows the original ratio;
/// - both given: fit within the requested bounding box, never crop.
///
/// With the lock off, both dimensions are required and pass through
/// untouched. Giving no target at all is always an error.
pub fn resolve_dimensions(
    original_width: f64,
    original_height: f64,
    target_width: Option<f64>,
    target_height: Option<f64>,
    lock_aspect_ratio: bool,
) -> ToolboxResult<(f64, f64)> {
    if lock_aspect_ratio {
        let original_aspect = original_width / original_height;
        match (target_width, target_height) {
            (Some(w), None) => Ok((w, w * (original_height / original_width))),
            (None, Some(h)) => Ok((h * original_aspect, h)),
            (Some(w), Some(h)) => {
                let requested_aspect = w / h;
                if requested_aspect > original_aspect {
                    // Requested box is wider than the image: height wins.
                    Ok((h * original_aspect, h))
                } else {
                    Ok((w, w / original_aspect))
                }
            }
            (None, None) => Err(ToolboxError::invalid(
                "enter at least one dimension (width or height) to resize",
            )),
        }
    } else {
        match (target_width, target_height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(ToolboxError::invalid(
                "enter both width and height to resize without keeping the aspect ratio",
            )),
        }
    }
}
