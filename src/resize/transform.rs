//! Geometric transforms: Fit and Fill.
//!
//! Dimension math is kept in pure functions so it can be tested without
//! touching pixels. Rounding is half-up and no side is ever scaled below
//! one pixel.

use image::DynamicImage;

use super::options::{ResampleFilter, ResizeMode};

/// Scale `value * num / den`, rounding half up, clamped to at least 1.
fn scale(value: u32, num: u32, den: u32) -> u32 {
    let (value, num, den) = (u64::from(value), u64::from(num), u64::from(den.max(1)));
    let scaled = (2 * value * num + den) / (2 * den);
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// Size of a `src` image scaled to fit inside `max`, preserving aspect ratio.
///
/// An image that already fits is left at its own size; Fit never enlarges.
pub fn fit_dimensions(src: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = src;
    let (max_w, max_h) = max;

    if src_w <= max_w && src_h <= max_h {
        return src;
    }

    // Compare aspect ratios src_w/src_h > max_w/max_h without floats
    if u64::from(src_w) * u64::from(max_h) > u64::from(max_w) * u64::from(src_h) {
        (max_w, scale(max_w, src_h, src_w))
    } else {
        (scale(max_h, src_w, src_h), max_h)
    }
}

/// Size a `src` image is scaled to before center-cropping to `target`.
///
/// The result covers `target` on both axes and matches it on at least one.
pub fn fill_dimensions(src: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = src;
    let (dst_w, dst_h) = target;

    if u64::from(src_w) * u64::from(dst_h) < u64::from(dst_w) * u64::from(src_h) {
        // Source is relatively taller: match width, crop height
        (dst_w, scale(dst_w, src_h, src_w).max(dst_h))
    } else {
        (scale(dst_h, src_w, src_h).max(dst_w), dst_h)
    }
}

/// Resample `img` to exactly `width` x `height`.
pub fn resample(img: &DynamicImage, width: u32, height: u32, filter: ResampleFilter) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    match filter.convolution() {
        Some(filter_type) => img.resize_exact(width, height, filter_type),
        None => img.thumbnail_exact(width, height),
    }
}

/// Scale `img` to fit within `width` x `height` without cropping.
pub fn fit(img: &DynamicImage, width: u32, height: u32, filter: ResampleFilter) -> DynamicImage {
    let (w, h) = fit_dimensions((img.width(), img.height()), (width, height));
    resample(img, w, h, filter)
}

/// Scale `img` to cover `width` x `height`, then crop the center to exactly that size.
pub fn fill(img: &DynamicImage, width: u32, height: u32, filter: ResampleFilter) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }

    let (scaled_w, scaled_h) = fill_dimensions((img.width(), img.height()), (width, height));
    let scaled = resample(img, scaled_w, scaled_h, filter);

    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    scaled.crop_imm(x, y, width, height)
}

/// Apply `mode` to `img`.
pub fn apply(
    img: &DynamicImage,
    width: u32,
    height: u32,
    mode: ResizeMode,
    filter: ResampleFilter,
) -> DynamicImage {
    match mode {
        ResizeMode::Fit => fit(img, width, height, filter),
        ResizeMode::Fill => fill(img, width, height, filter),
    }
}
