//! Normalized cross-correlation template matching over grayscale pixel grids.

use super::{MatchConfig, Template};
use crate::bbox::BBox;
use image::GrayImage;

/// Best-scoring placement of a template over a source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    pub x: u32,
    pub y: u32,
    pub score: f64,
}

/// Flat windows and flat templates have no correlation; anything below this
/// variance product is scored 0 instead of dividing by it.
const MIN_DENOM: f64 = 1e-12;

/// Slide `template` over `source` and return the best-scoring offset.
///
/// The score at each offset is the normalized correlation coefficient: both
/// the template and the source window have their local mean subtracted, so a
/// perfect match scores 1.0 regardless of uniform brightness or contrast
/// shifts. Scanning is row-major and only strictly greater scores replace the
/// running best, so ties resolve to the lowest (y, x).
///
/// Returns `None` when the template is empty or larger than the source in
/// either dimension; that is a valid "no match possible" case, not an error.
pub fn best_match(source: &GrayImage, template: &GrayImage) -> Option<TemplateMatch> {
    let (sw, sh) = source.dimensions();
    let (tw, th) = template.dimensions();
    if tw == 0 || th == 0 || tw > sw || th > sh {
        return None;
    }

    let src = source.as_raw();
    let tpl = template.as_raw();
    let n = (tw * th) as f64;

    let mut sum_t = 0.0;
    let mut sum_t2 = 0.0;
    for &p in tpl {
        let v = p as f64;
        sum_t += v;
        sum_t2 += v * v;
    }
    let var_t = (sum_t2 - sum_t * sum_t / n).max(0.0);

    let mut best: Option<TemplateMatch> = None;
    for oy in 0..=(sh - th) {
        for ox in 0..=(sw - tw) {
            let mut sum_s = 0.0;
            let mut sum_s2 = 0.0;
            let mut sum_st = 0.0;
            for ty in 0..th {
                let s_row = ((oy + ty) * sw + ox) as usize;
                let t_row = (ty * tw) as usize;
                for tx in 0..tw as usize {
                    let s = src[s_row + tx] as f64;
                    let t = tpl[t_row + tx] as f64;
                    sum_s += s;
                    sum_s2 += s * s;
                    sum_st += s * t;
                }
            }

            let var_s = (sum_s2 - sum_s * sum_s / n).max(0.0);
            let denom = (var_s * var_t).sqrt();
            let score = if denom > MIN_DENOM {
                (sum_st - sum_s * sum_t / n) / denom
            } else {
                0.0
            };

            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(TemplateMatch {
                    x: ox,
                    y: oy,
                    score,
                });
            }
        }
    }

    best
}

/// Applies the score threshold and turns passing matches into labeled boxes
pub struct TemplateMatcher {
    config: MatchConfig,
}

impl TemplateMatcher {
    /// Create new template matcher
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    /// Match one template against a grayscale frame.
    ///
    /// `None` when no placement is possible or the best score falls below the
    /// configured threshold.
    pub fn match_single(&self, image: &GrayImage, template: &Template) -> Option<BBox> {
        let (tw, th) = template.image.dimensions();
        let found = best_match(image, &template.image)?;
        if found.score < self.config.score_threshold {
            return None;
        }

        Some(
            BBox::new(
                found.x as i32,
                found.y as i32,
                tw as i32,
                th as i32,
                found.score,
            )
            .with_label(template.label.clone(), (255, 255, 255)),
        )
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    // The x*y cross term keeps every window distinct under translation; a
    // purely linear pattern repeats and would make best-offset asserts flaky.
    fn textured(width: u32, height: u32, seed: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x * 31 + y * 17 + x * y * 7 + seed * 97) % 251) as u8])
        })
    }

    fn paste(dst: &mut GrayImage, src: &GrayImage, ox: u32, oy: u32) {
        for (x, y, p) in src.enumerate_pixels() {
            dst.put_pixel(ox + x, oy + y, *p);
        }
    }

    #[test]
    fn test_self_match_scores_one_at_origin() {
        let img = textured(20, 20, 1);
        let found = best_match(&img, &img).unwrap();
        assert_eq!((found.x, found.y), (0, 0));
        assert!((found.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_finds_patch_at_known_offset() {
        let source = textured(40, 30, 1);
        let template = crate::utils::ImageOps::crop(
            &source,
            &lookout_core::geometry::Rect::new(12, 7, 9, 9),
        );

        let found = best_match(&source, &template).unwrap();
        assert_eq!((found.x, found.y), (12, 7));
        assert!(found.score > 0.99);
    }

    #[test]
    fn test_brightness_shift_still_matches() {
        // Values stay in 60..180 so a uniform -40 shift never saturates.
        let source =
            GrayImage::from_fn(30, 30, |x, y| Luma([(60 + (x * 13 + y * 29 + x * y) % 120) as u8]));
        let rect = lookout_core::geometry::Rect::new(10, 10, 8, 8);
        let patch = crate::utils::ImageOps::crop(&source, &rect);

        // Uniformly darken the template; the correlation coefficient is
        // invariant to the shift.
        let shifted = GrayImage::from_fn(8, 8, |x, y| Luma([patch.get_pixel(x, y)[0] - 40]));

        let found = best_match(&source, &shifted).unwrap();
        assert_eq!((found.x, found.y), (10, 10));
        assert!(found.score > 0.999);
    }

    #[test]
    fn test_tie_breaks_to_lowest_raster_order() {
        let template = textured(6, 6, 3);
        let mut source = GrayImage::new(12, 6);
        paste(&mut source, &template, 0, 0);
        paste(&mut source, &template, 6, 0);

        // Both placements score identically; the first in raster order wins.
        let found = best_match(&source, &template).unwrap();
        assert_eq!((found.x, found.y), (0, 0));
    }

    #[test]
    fn test_oversized_template_is_none() {
        let source = textured(10, 10, 1);
        let template = textured(11, 5, 1);
        assert!(best_match(&source, &template).is_none());
    }

    #[test]
    fn test_flat_source_scores_zero() {
        let source = GrayImage::from_pixel(20, 20, Luma([128]));
        let template = textured(5, 5, 1);

        let found = best_match(&source, &template).unwrap();
        assert_eq!(found.score, 0.0);
    }

    #[test]
    fn test_matcher_applies_threshold() {
        let source = textured(30, 30, 4);
        let rect = lookout_core::geometry::Rect::new(5, 5, 10, 10);
        let template = Template::new(
            "thing".to_string(),
            crate::utils::ImageOps::crop(&source, &rect),
        );

        let matcher = TemplateMatcher::default();
        let bbox = matcher.match_single(&source, &template).unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (5, 5, 10, 10));
        assert_eq!(bbox.label, "thing");

        // A featureless frame scores 0 everywhere and stays below threshold.
        let featureless = GrayImage::from_pixel(30, 30, Luma([90]));
        assert!(matcher.match_single(&featureless, &template).is_none());
    }
}
