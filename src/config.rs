use std::time::Duration;

use crate::animation::TimingFunction;
use crate::overlay::Color;

/// How a property animates when its target changes.
#[derive(Clone, Debug)]
pub struct TransitionConfig {
    pub duration: Duration,
    pub timing: TimingFunction,
}

impl TransitionConfig {
    pub fn new(duration: Duration, timing: TimingFunction) -> Self {
        Self { duration, timing }
    }

    /// An ease-out-quart transition lasting `ms` milliseconds.
    pub fn ease_out_quart(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms), TimingFunction::EaseOutQuart)
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }
}

/// Look and motion of the lyrics box.
#[derive(Clone, Debug)]
pub struct OverlayConfig {
    /// Frame width/height changes
    pub frame_size: TransitionConfig,
    /// Frame fade in/out
    pub frame_opacity: TransitionConfig,
    /// Line fade in/out
    pub line_opacity: TransitionConfig,
    /// Line slide in/out
    pub line_translate: TransitionConfig,
    /// Lines kept alive at once, including ones still fading out
    pub max_active_lines: usize,
    /// Space between the text and the frame edge
    pub frame_horizontal_padding: f64,
    pub corner_radius: f64,
    pub background: Color,
    pub text_color: Color,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            frame_size: TransitionConfig::ease_out_quart(200),
            frame_opacity: TransitionConfig::ease_out_quart(500),
            line_opacity: TransitionConfig::ease_out_quart(500),
            line_translate: TransitionConfig::ease_out_quart(500),
            max_active_lines: 3,
            frame_horizontal_padding: 10.0,
            corner_radius: 4.0,
            background: Color::rgba(0.0, 0.0, 0.0, 0.5),
            text_color: Color::rgb(1.0, 1.0, 1.0),
        }
    }
}

/// Settings for the playback driver.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Frames per second while something animates
    pub fps: u32,
    /// How often playback position is checked for a new line
    pub poll_interval: Duration,
    /// Lines are shown this much early so the fade lands on the beat
    pub lookahead: Duration,
    /// Keep running this long after the last line before exiting
    pub tail: Duration,
    /// Overlay window size in logical pixels
    pub width: f64,
    pub height: f64,
    pub overlay: OverlayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            poll_interval: Duration::from_millis(100),
            lookahead: Duration::from_millis(350),
            tail: Duration::from_secs(2),
            width: 800.0,
            height: 100.0,
            overlay: OverlayConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}
