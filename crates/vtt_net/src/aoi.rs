//! Area-of-interest filtering.
//!
//! Each client declares a viewport (centre plus half-extent spans); the
//! server only synchronizes entities inside a rectangle derived from it. The
//! visible rectangle is deliberately smaller than the requested span
//! (`view_scale`, default 0.6) and the number of entities per view is capped
//! (`max_visible`, default 2500). Both values are tunables, not contract —
//! only their qualitative effect (margin inside the requested viewport, a
//! hard bound on payload size) is load-bearing.

use glam::Vec2;

/// Tunables for per-client visibility.
#[derive(Debug, Clone, Copy)]
pub struct AoiConfig {
    /// Fraction of the requested span that is actually visible.
    pub view_scale: f32,
    /// Hard cap on entities synchronized to one view per tick. Entities
    /// beyond the cap are silently dropped for that tick.
    pub max_visible: usize,
}

impl Default for AoiConfig {
    fn default() -> Self {
        Self {
            view_scale: 0.6,
            max_visible: 2500,
        }
    }
}

/// A client's camera viewport: centre point and half-extent spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Viewport centre.
    pub cx: f32,
    /// Viewport centre.
    pub cy: f32,
    /// Requested half-width basis.
    pub span_x: f32,
    /// Requested half-height basis.
    pub span_y: f32,
}

impl Default for Viewport {
    /// Wide open — sees the entire table until the client narrows it.
    fn default() -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            span_x: f32::INFINITY,
            span_y: f32::INFINITY,
        }
    }
}

impl Viewport {
    /// Apply a partial camera update; `None` fields retain prior values.
    pub fn merge(
        &mut self,
        cx: Option<f32>,
        cy: Option<f32>,
        span_x: Option<f32>,
        span_y: Option<f32>,
    ) {
        if let Some(cx) = cx {
            self.cx = cx;
        }
        if let Some(cy) = cy {
            self.cy = cy;
        }
        if let Some(span_x) = span_x {
            self.span_x = span_x;
        }
        if let Some(span_y) = span_y {
            self.span_y = span_y;
        }
    }

    /// The axis-aligned rectangle actually visible at the given scale.
    #[must_use]
    pub fn view_rect(&self, scale: f32) -> Rect {
        let centre = Vec2::new(self.cx, self.cy);
        let half = Vec2::new(self.span_x, self.span_y) * scale;
        Rect {
            min: centre - half,
            max: centre + half,
        }
    }
}

/// An axis-aligned rectangle with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Rect {
    /// `true` if the point lies inside the rectangle (bounds inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
