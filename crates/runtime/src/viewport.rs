use lightbox_render::PerspectiveCamera;

/// Upper bound on the render pixel ratio.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Size and density of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
    pixel_ratio: f32,
}

impl ViewportState {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            device_pixel_ratio,
            pixel_ratio: clamp_ratio(device_pixel_ratio),
        }
    }

    /// Logical width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Logical height.
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Ratio actually used for the surface, `min(device ratio, 2)`.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Apply a new logical size and device ratio, then bring the camera's
    /// aspect and projection in line. A zero-sized viewport (a minimized
    /// window) is ignored. Returns whether anything was applied.
    pub fn resize(
        &mut self,
        width: f32,
        height: f32,
        device_pixel_ratio: f32,
        camera: &mut PerspectiveCamera,
    ) -> bool {
        if width <= 0.0 || height <= 0.0 {
            tracing::debug!("ignoring resize to {width}x{height}");
            return false;
        }
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;
        self.pixel_ratio = clamp_ratio(device_pixel_ratio);

        camera.aspect = self.aspect();
        camera.update_projection_matrix();
        tracing::debug!(
            "viewport {width}x{height} @{} -> surface {:?}",
            self.pixel_ratio,
            self.surface_size()
        );
        true
    }

    /// Physical surface size in pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_camera() {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        let mut viewport = ViewportState::new(800.0, 600.0, 1.0);
        assert!(viewport.resize(1920.0, 1080.0, 1.0, &mut camera));
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
        assert_eq!(viewport.surface_size(), (1920, 1080));
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let mut camera = PerspectiveCamera::default();
        let mut viewport = ViewportState::new(800.0, 600.0, 1.0);
        viewport.resize(800.0, 600.0, 3.0, &mut camera);
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.device_pixel_ratio(), 3.0);
        assert_eq!(viewport.surface_size(), (1600, 1200));

        viewport.resize(800.0, 600.0, 1.5, &mut camera);
        assert_eq!(viewport.pixel_ratio(), 1.5);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut camera = PerspectiveCamera::default();
        let mut viewport = ViewportState::new(800.0, 600.0, 1.0);
        viewport.resize(1024.0, 768.0, 2.5, &mut camera);
        let (first, projection) = (viewport, camera.projection_matrix());
        viewport.resize(1024.0, 768.0, 2.5, &mut camera);
        assert_eq!(viewport, first);
        assert_eq!(camera.projection_matrix(), projection);
    }

    #[test]
    fn minimized_window_keeps_last_size() {
        let mut camera = PerspectiveCamera::default();
        let mut viewport = ViewportState::new(800.0, 600.0, 1.0);
        viewport.resize(800.0, 600.0, 1.0, &mut camera);
        assert!(!viewport.resize(0.0, 0.0, 1.0, &mut camera));
        assert_eq!(viewport.width(), 800.0);
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }
}
