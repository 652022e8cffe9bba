/// Runtime configuration for the interactive scene
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub fps: u32,
    pub seed: Option<u64>,
    pub audio: bool,
    pub music: bool,
    pub gestures: GestureConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            seed: None,
            audio: true,
            music: true,
            gestures: GestureConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Target duration of one frame in seconds
    pub fn frame_time(&self) -> f32 {
        1.0 / self.fps.clamp(1, 240) as f32
    }
}

/// Thresholds for turning pointer traffic into gestures, in canvas pixels
/// and milliseconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureConfig {
    pub swipe_distance: f32,
    pub swipe_max_ms: u64,
    pub tap_tolerance: f32,
    pub tap_window_ms: u64,
    pub drag_throttle_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_distance: 10.0,
            swipe_max_ms: 600,
            tap_tolerance: 2.5,
            tap_window_ms: 500,
            drag_throttle_ms: 80,
        }
    }
}

/// Canopy box as fractions of the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanopyFractions {
    pub width: f32,
    pub height: f32,
    pub top: f32,
}

impl CanopyFractions {
    /// Tall screens get a wider, shorter-topped crown
    pub const PORTRAIT: CanopyFractions = CanopyFractions {
        width: 0.9,
        height: 0.45,
        top: 0.12,
    };
    pub const LANDSCAPE: CanopyFractions = CanopyFractions {
        width: 0.75,
        height: 0.5,
        top: 0.1,
    };
}

/// Canvas size in pixels plus the fixed landmarks derived from it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Height of the grass band below the ground line
    pub fn grass_depth(&self) -> f32 {
        (self.height * 0.11).max(4.0).round()
    }

    /// Y of the grass line; bursts bounce here and creatures stand on it
    pub fn ground_y(&self) -> f32 {
        self.height - self.grass_depth()
    }

    pub fn canopy_fractions(&self) -> CanopyFractions {
        if self.is_portrait() {
            CanopyFractions::PORTRAIT
        } else {
            CanopyFractions::LANDSCAPE
        }
    }

    /// (width, height, top) of the canopy box in pixels
    pub fn canopy(&self) -> (f32, f32, f32) {
        let f = self.canopy_fractions();
        (self.width * f.width, self.height * f.height, self.height * f.top)
    }

    pub fn trunk_x(&self) -> f32 {
        self.width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::{CanopyFractions, SceneConfig, Viewport};

    #[test]
    fn orientation_picks_canopy_constants() {
        assert_eq!(Viewport::new(60, 120).canopy_fractions(), CanopyFractions::PORTRAIT);
        assert_eq!(Viewport::new(120, 60).canopy_fractions(), CanopyFractions::LANDSCAPE);
        // Square counts as landscape
        assert_eq!(Viewport::new(80, 80).canopy_fractions(), CanopyFractions::LANDSCAPE);
    }

    #[test]
    fn ground_line_leaves_grass_band() {
        let vp = Viewport::new(200, 100);
        assert_eq!(vp.ground_y(), 89.0);
        let tiny = Viewport::new(10, 10);
        assert_eq!(tiny.ground_y(), 6.0);
    }

    #[test]
    fn frame_time_clamps_fps() {
        let mut cfg = SceneConfig::default();
        assert!((cfg.frame_time() - 1.0 / 60.0).abs() < 1e-6);
        cfg.fps = 0;
        assert_eq!(cfg.frame_time(), 1.0);
    }
}
