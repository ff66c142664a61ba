use viewloop_viewport::ViewportSize;

/// Size of the buffer the scene is drawn into.
///
/// The surface always matches the window in physical pixels. The scene buffer
/// is `floor(logical * density)`, clamped to the surface. When it comes out
/// within a pixel of the surface in both directions, the difference is the
/// host rounding the logical size and the surface size is used as-is.
pub(crate) fn scene_target_size(surface: (u32, u32), logical: ViewportSize, density: f64) -> (u32, u32) {
    let (sw, sh) = (surface.0.max(1), surface.1.max(1));
    let (w, h) = logical.physical(density);
    if w + 1 >= sw && h + 1 >= sh {
        (sw, sh)
    } else {
        (w.min(sw), h.min(sh))
    }
}
