//! Viewport transform
//!
//! The viewport owns one affine transform (uniform scale plus translation)
//! applied to the whole scene: `screen = world * k + (x, y)`. Layout
//! coordinates are world coordinates; the identity transform maps them 1:1
//! onto the drawing surface.
//!
//! This module contains pure calculation logic with no drawing dependency.

use serde::{Deserialize, Serialize};

use crate::layout::ViewportSize;

/// Viewport size and zoom limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Surface width in pixels
    pub width: f32,
    /// Surface height in pixels
    pub height: f32,
    /// Factor applied by one zoom in/out step
    pub zoom_step: f32,
    /// Smallest allowed scale
    pub min_scale: f32,
    /// Largest allowed scale
    pub max_scale: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            zoom_step: 1.2,
            min_scale: 0.1,
            max_scale: 5.0,
        }
    }
}

/// Translate + uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.k + self.x, y * self.k + self.y)
    }

    pub fn invert(&self, sx: f32, sy: f32) -> (f32, f32) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pan/zoom state of one view
#[derive(Debug, Clone)]
pub struct ViewportController {
    width: f32,
    height: f32,
    transform: Transform,
    /// Target transform for smooth animation
    target: Transform,
    /// Whether we're currently animating
    is_animating: bool,
    zoom_step: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

impl ViewportController {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            transform: Transform::IDENTITY,
            target: Transform::IDENTITY,
            is_animating: false,
            zoom_step: config.zoom_step,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        }
    }

    pub fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height)
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.k
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    /// Convert world coordinates to screen coordinates
    pub fn world_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        self.transform.apply(x, y)
    }

    /// Convert screen coordinates to world coordinates
    pub fn screen_to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        self.transform.invert(sx, sy)
    }

    /// Zoom in one step around the viewport center
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.zoom_step, self.width / 2.0, self.height / 2.0);
    }

    /// Zoom out one step around the viewport center
    pub fn zoom_out(&mut self) {
        self.zoom_at(1.0 / self.zoom_step, self.width / 2.0, self.height / 2.0);
    }

    /// Zoom by `factor`, keeping the screen point `(sx, sy)` fixed
    pub fn zoom_at(&mut self, factor: f32, sx: f32, sy: f32) {
        let (wx, wy) = self.screen_to_world(sx, sy);
        let k = (self.transform.k * factor).clamp(self.min_scale, self.max_scale);
        self.transform = Transform {
            x: sx - wx * k,
            y: sy - wy * k,
            k,
        };
        // Also update target to prevent animation fighting
        self.target = self.transform;
        self.is_animating = false;
    }

    /// Pan the view by delta pixels
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.transform.x += dx;
        self.transform.y += dy;
        self.target = self.transform;
        self.is_animating = false;
    }

    /// Restore the identity transform
    pub fn reset(&mut self) {
        self.transform = Transform::IDENTITY;
        self.target = Transform::IDENTITY;
        self.is_animating = false;
    }

    /// Update animation state (call each frame)
    /// Returns true if still animating
    pub fn update_animation(&mut self) -> bool {
        if !self.is_animating {
            return false;
        }

        // Smooth interpolation factor (higher = faster)
        let lerp_factor = 0.12;

        self.transform.k += (self.target.k - self.transform.k) * lerp_factor;
        self.transform.x += (self.target.x - self.transform.x) * lerp_factor;
        self.transform.y += (self.target.y - self.transform.y) * lerp_factor;

        let k_diff = (self.target.k - self.transform.k).abs();
        let x_diff = (self.target.x - self.transform.x).abs();
        let y_diff = (self.target.y - self.transform.y).abs();

        if k_diff < 0.001 && x_diff < 0.1 && y_diff < 0.1 {
            // Snap to final values
            self.transform = self.target;
            self.is_animating = false;
        }

        self.is_animating
    }

    /// Start an animation that frames `bounds` with `padding` pixels spare
    pub fn fit_to_bounds(&mut self, bounds: &BoundingBox, padding: f32) {
        if bounds.is_empty() {
            return;
        }

        let available_width = (self.width - 2.0 * padding).max(1.0);
        let available_height = (self.height - 2.0 * padding).max(1.0);

        let scale_x = available_width / bounds.width();
        let scale_y = available_height / bounds.height();
        let k = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);

        // Center of the bounds lands on the center of the surface
        self.target = Transform {
            x: self.width / 2.0 - bounds.center_x() * k,
            y: self.height / 2.0 - bounds.center_y() * k,
            k,
        };
        self.is_animating = true;
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Expand the bounding box to include a circle
    pub fn include_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.min_x = self.min_x.min(x - radius);
        self.max_x = self.max_x.max(x + radius);
        self.min_y = self.min_y.min(y - radius);
        self.max_y = self.max_y.max(y + radius);
    }

    /// Width, at least 1.0 to avoid division by zero
    pub fn width(&self) -> f32 {
        (self.max_x - self.min_x).max(1.0)
    }

    /// Height, at least 1.0 to avoid division by zero
    pub fn height(&self) -> f32 {
        (self.max_y - self.min_y).max(1.0)
    }

    pub fn center_x(&self) -> f32 {
        (self.min_x + self.max_x) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.min_y + self.max_y) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportController {
        ViewportController::new(&ViewportConfig::default())
    }

    #[test]
    fn starts_at_identity() {
        let vp = viewport();
        assert_eq!(vp.transform(), Transform::IDENTITY);
        assert_eq!(vp.world_to_screen(12.0, 34.0), (12.0, 34.0));
    }

    #[test]
    fn zoom_in_multiplies_scale() {
        let mut vp = viewport();
        vp.zoom_in();
        assert!((vp.scale() - 1.2).abs() < 1e-6);
        vp.zoom_out();
        assert!((vp.scale() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn repeated_zoom_is_clamped() {
        let mut vp = viewport();
        for _ in 0..50 {
            vp.zoom_in();
            assert!(vp.scale() <= 5.0);
        }
        assert_eq!(vp.scale(), 5.0);

        for _ in 0..100 {
            vp.zoom_out();
            assert!(vp.scale() >= 0.1);
        }
        assert_eq!(vp.scale(), 0.1);
    }

    #[test]
    fn zoom_keeps_center_fixed() {
        let mut vp = viewport();
        vp.zoom_in();
        let (x, y) = vp.world_to_screen(400.0, 300.0);
        assert!((x - 400.0).abs() < 1e-3);
        assert!((y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_at_keeps_pointer_fixed() {
        let mut vp = viewport();
        vp.pan(30.0, -20.0);
        let world = vp.screen_to_world(100.0, 50.0);

        vp.zoom_at(2.0, 100.0, 50.0);

        let (x, y) = vp.world_to_screen(world.0, world.1);
        assert!((x - 100.0).abs() < 1e-3);
        assert!((y - 50.0).abs() < 1e-3);
        assert_eq!(vp.scale(), 2.0);
    }

    #[test]
    fn pan_translates_in_screen_pixels() {
        let mut vp = viewport();
        vp.zoom_at(2.0, 0.0, 0.0);
        vp.pan(100.0, 50.0);
        assert_eq!(vp.world_to_screen(0.0, 0.0), (100.0, 50.0));
        assert_eq!(vp.world_to_screen(10.0, 10.0), (120.0, 70.0));
    }

    #[test]
    fn screen_world_roundtrip() {
        let mut vp = viewport();
        vp.zoom_at(1.5, 200.0, 100.0);
        vp.pan(25.0, -15.0);

        let (sx, sy) = vp.world_to_screen(100.0, -50.0);
        let (x, y) = vp.screen_to_world(sx, sy);

        assert!((x - 100.0).abs() < 1e-3);
        assert!((y + 50.0).abs() < 1e-3);
    }

    #[test]
    fn reset_restores_identity() {
        let mut vp = viewport();
        vp.zoom_in();
        vp.pan(10.0, 10.0);

        vp.reset();

        assert_eq!(vp.transform(), Transform::IDENTITY);
        assert!(!vp.is_animating());
    }

    #[test]
    fn fit_to_bounds_animates_to_frame() {
        let mut vp = viewport();
        let bounds = BoundingBox {
            min_x: -100.0,
            max_x: 100.0,
            min_y: -50.0,
            max_y: 50.0,
        };

        vp.fit_to_bounds(&bounds, 0.0);
        assert!(vp.is_animating());

        for _ in 0..500 {
            if !vp.update_animation() {
                break;
            }
        }

        // 200x100 into 800x600 -> min(4, 6) = 4, clamped to 5 max
        assert_eq!(vp.scale(), 4.0);
        assert_eq!(vp.world_to_screen(0.0, 0.0), (400.0, 300.0));
        assert!(!vp.is_animating());
    }

    #[test]
    fn fit_to_bounds_respects_zoom_limits() {
        let mut vp = viewport();
        let tiny = BoundingBox {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        };
        vp.fit_to_bounds(&tiny, 0.0);
        while vp.update_animation() {}
        assert_eq!(vp.scale(), 5.0);
    }

    #[test]
    fn fit_to_empty_bounds_does_nothing() {
        let mut vp = viewport();
        vp.fit_to_bounds(&BoundingBox::empty(), 10.0);
        assert!(!vp.is_animating());
        assert_eq!(vp.transform(), Transform::IDENTITY);
    }

    #[test]
    fn interaction_cancels_animation() {
        let mut vp = viewport();
        let mut bounds = BoundingBox::empty();
        bounds.include_circle(0.0, 0.0, 50.0);
        vp.fit_to_bounds(&bounds, 0.0);

        vp.pan(5.0, 5.0);

        assert!(!vp.is_animating());
        assert!(!vp.update_animation());
    }

    #[test]
    fn bounding_box_include_circle() {
        let mut bb = BoundingBox::empty();
        assert!(bb.is_empty());
        bb.include_circle(0.0, 0.0, 10.0);
        bb.include_circle(30.0, 5.0, 10.0);

        assert_eq!((bb.min_x, bb.max_x), (-10.0, 40.0));
        assert_eq!((bb.min_y, bb.max_y), (-10.0, 15.0));
        assert_eq!(bb.center_x(), 15.0);
    }

    #[test]
    fn bounding_box_width_minimum() {
        let mut bb = BoundingBox::empty();
        bb.include_circle(3.0, 3.0, 0.0);
        assert_eq!(bb.width(), 1.0);
        assert_eq!(bb.height(), 1.0);
    }
}
