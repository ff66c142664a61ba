use serde::Serialize;

/// Drawable-area dimensions in logical pixels.
///
/// Zero dimensions are legal: hosts report them briefly during layout or
/// while minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `None` when the height is zero.
    pub fn aspect(&self) -> Option<f32> {
        (self.height > 0).then(|| self.width as f32 / self.height as f32)
    }

    /// Size of the output buffer in physical pixels, rounded down and never
    /// below 1x1.
    pub fn physical(&self, density: f64) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * density).floor() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Physical-to-logical pixel ratio used to size the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct PixelDensity(f64);

impl PixelDensity {
    /// Default cap on the device pixel density.
    pub const DEFAULT_MAX: f64 = 2.0;

    /// `min(host, max)`. Non-finite or non-positive host values count as 1.0.
    pub fn clamped(host: f64, max: f64) -> Self {
        let host = if host.is_finite() && host > 0.0 {
            host
        } else {
            tracing::warn!("host reported pixel density {host}, using 1.0");
            1.0
        };
        Self(host.min(max))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for PixelDensity {
    fn default() -> Self {
        Self(1.0)
    }
}
