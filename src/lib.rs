pub mod animation;
pub mod config;
pub mod lrc;
pub mod overlay;

mod app;

pub use app::{App, AppError, LogPresenter, LyricsFeed, Presenter, UpdateCallback};
pub use config::{AppConfig, OverlayConfig, TransitionConfig};

pub mod prelude {
    pub use crate::animation::{
        ease_out_quart, linear, Animator, Clock, Completion, FrameQueue, FrameScheduler,
        ManualClock, MonotonicClock, RepaintSink, TimingFunction, Transition, Variable,
    };
    pub use crate::lrc::{LrcError, Lyrics, LyricsLine};
    pub use crate::overlay::{
        ChangeFlags, Color, DrawCommand, Invalidation, LyricsOverlay, MonospaceMeasurer, Scene,
        Size, TextMeasurer,
    };
    pub use crate::{App, AppConfig, LogPresenter, OverlayConfig, Presenter, TransitionConfig};
}
