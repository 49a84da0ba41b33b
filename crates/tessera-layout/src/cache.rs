// crates/tessera-layout/src/cache.rs

use crate::results::CachedMeasurement;
use crate::rounding::round_value_to_pixel_grid;
use tessera_core::{inexact_equals, is_defined, SizingMode};

/// One axis of a measurement request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisRequest {
    pub mode: SizingMode,
    pub available: f32,
    pub margin: f32,
}

fn size_is_exact_and_matches_old_measured_size(mode: SizingMode, size: f32, last_computed_size: f32) -> bool {
    mode == SizingMode::StretchFit && inexact_equals(size, last_computed_size)
}

fn old_size_is_max_content_and_still_fits(
    mode: SizingMode,
    size: f32,
    last_mode: SizingMode,
    last_computed_size: f32,
) -> bool {
    mode == SizingMode::FitContent
        && last_mode == SizingMode::MaxContent
        && (size >= last_computed_size || inexact_equals(size, last_computed_size))
}

fn new_size_is_stricter_and_still_valid(
    mode: SizingMode,
    size: f32,
    last_mode: SizingMode,
    last_size: f32,
    last_computed_size: f32,
) -> bool {
    last_mode == SizingMode::FitContent
        && mode == SizingMode::FitContent
        && is_defined(last_size)
        && is_defined(size)
        && is_defined(last_computed_size)
        && last_size > size
        && (last_computed_size <= size || inexact_equals(size, last_computed_size))
}

fn axis_is_compatible(
    request: AxisRequest,
    last_mode: SizingMode,
    last_available: f32,
    last_computed: f32,
    point_scale_factor: f32,
) -> bool {
    let (effective, effective_last) = if point_scale_factor != 0.0 {
        (
            round_value_to_pixel_grid(request.available as f64, point_scale_factor as f64, false, false),
            round_value_to_pixel_grid(last_available as f64, point_scale_factor as f64, false, false),
        )
    } else {
        (request.available, last_available)
    };

    let same_constraint = last_mode == request.mode && inexact_equals(effective_last, effective);
    let inner = request.available - request.margin;

    same_constraint
        || size_is_exact_and_matches_old_measured_size(request.mode, inner, last_computed)
        || old_size_is_max_content_and_still_fits(request.mode, inner, last_mode, last_computed)
        || new_size_is_stricter_and_still_valid(request.mode, inner, last_mode, last_available, last_computed)
}

/// Whether a previous measurement necessarily produces the same size as
/// the requested one, either because the request is identical or because
/// the earlier result already satisfies the new constraint.
pub(crate) fn can_use_cached_measurement(
    width: AxisRequest,
    height: AxisRequest,
    cached: &CachedMeasurement,
    point_scale_factor: f32,
) -> bool {
    if (is_defined(cached.computed_height) && cached.computed_height < 0.0)
        || (is_defined(cached.computed_width) && cached.computed_width < 0.0)
    {
        return false;
    }

    axis_is_compatible(
        width,
        cached.width_sizing_mode,
        cached.available_width,
        cached.computed_width,
        point_scale_factor,
    ) && axis_is_compatible(
        height,
        cached.height_sizing_mode,
        cached.available_height,
        cached.computed_height,
        point_scale_factor,
    )
}

/// Exact match on the request, used for nodes without a measure callback.
pub(crate) fn matches_request(width: AxisRequest, height: AxisRequest, cached: &CachedMeasurement) -> bool {
    inexact_equals(cached.available_width, width.available)
        && inexact_equals(cached.available_height, height.available)
        && cached.width_sizing_mode == width.mode
        && cached.height_sizing_mode == height.mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::UNDEFINED;

    fn request(mode: SizingMode, available: f32) -> AxisRequest {
        AxisRequest { mode, available, margin: 0.0 }
    }

    fn cached(mode: SizingMode, available: f32, computed: f32) -> CachedMeasurement {
        CachedMeasurement {
            available_width: available,
            available_height: available,
            width_sizing_mode: mode,
            height_sizing_mode: mode,
            computed_width: computed,
            computed_height: computed,
        }
    }

    #[test]
    fn test_identical_request_hits() {
        let entry = cached(SizingMode::StretchFit, 100.0, 100.0);
        let r = request(SizingMode::StretchFit, 100.0);
        assert!(can_use_cached_measurement(r, r, &entry, 1.0));
        assert!(matches_request(r, r, &entry));
    }

    #[test]
    fn test_max_content_result_fits_looser_fit_content() {
        let entry = cached(SizingMode::MaxContent, UNDEFINED, 40.0);
        let r = request(SizingMode::FitContent, 60.0);
        assert!(can_use_cached_measurement(r, r, &entry, 0.0));

        let too_small = request(SizingMode::FitContent, 30.0);
        assert!(!can_use_cached_measurement(too_small, too_small, &entry, 0.0));
    }

    #[test]
    fn test_stretch_matching_previous_size_hits() {
        let entry = cached(SizingMode::MaxContent, UNDEFINED, 40.0);
        let r = request(SizingMode::StretchFit, 40.0);
        assert!(can_use_cached_measurement(r, r, &entry, 0.0));
        assert!(!matches_request(r, r, &entry));
    }

    #[test]
    fn test_stricter_fit_content_still_valid() {
        let entry = cached(SizingMode::FitContent, 100.0, 50.0);
        let r = request(SizingMode::FitContent, 80.0);
        assert!(can_use_cached_measurement(r, r, &entry, 0.0));
    }

    #[test]
    fn test_default_entry_never_hits() {
        let entry = CachedMeasurement::default();
        let r = request(SizingMode::MaxContent, UNDEFINED);
        assert!(!can_use_cached_measurement(r, r, &entry, 1.0));
    }
}
