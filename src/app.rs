//! Playback driver.
//!
//! [`App::run`] plays a set of timed lyrics through a [`LyricsOverlay`] on a
//! calloop event loop. A timer polls the playback position for line changes;
//! frames are run while anything animates, and the loop sleeps otherwise. A
//! ping source wakes it as soon as an idle overlay starts moving again.

use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::ping::make_ping;
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use log::{debug, info};
use thiserror::Error;

use crate::animation::{Animator, Clock, FrameQueue, MonotonicClock};
use crate::config::{AppConfig, OverlayConfig};
use crate::lrc::{Lyrics, LyricsLine};
use crate::overlay::{
    ChangeFlags, Invalidation, LyricsOverlay, MonospaceMeasurer, Scene, Size, TextMeasurer,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
    #[error("failed to create wakeup source: {0}")]
    Wakeup(#[from] std::io::Error),
}

/// Receives every painted frame.
pub trait Presenter {
    fn present(&mut self, scene: &Scene, flags: ChangeFlags);
}

/// Presenter that only logs what would be drawn.
#[derive(Debug, Default)]
pub struct LogPresenter {
    frames: u64,
}

impl LogPresenter {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn present(&mut self, scene: &Scene, flags: ChangeFlags) {
        self.frames += 1;
        debug!(
            "frame {}: {} commands, {:?}, lines {:?}",
            self.frames,
            scene.commands().len(),
            flags,
            scene.texts()
        );
    }
}

/// Turns a playback position into line changes.
pub struct LyricsFeed {
    lyrics: Lyrics,
    lookahead: Duration,
    current: Option<LyricsLine>,
}

impl LyricsFeed {
    pub fn new(lyrics: Lyrics, lookahead: Duration) -> Self {
        Self {
            lyrics,
            lookahead,
            current: None,
        }
    }

    /// The text to show if the line at `position` differs from the last one.
    ///
    /// Returns an empty string when playback moves before the first line.
    pub fn update(&mut self, position: Duration) -> Option<String> {
        let line = self.lyrics.line_at(position.saturating_add(self.lookahead)).cloned();
        if line == self.current {
            return None;
        }
        let text = line.as_ref().map(|l| l.text.clone()).unwrap_or_default();
        self.current = line;
        Some(text)
    }

    /// Time tag of the final line.
    pub fn end(&self) -> Duration {
        self.lyrics.last_time_tag()
    }
}

/// Called every frame before painting, e.g. to drain external events.
pub type UpdateCallback = Box<dyn FnMut(&mut LyricsOverlay)>;

struct LoopData<P: Presenter> {
    feed: LyricsFeed,
    overlay: LyricsOverlay,
    queue: Rc<FrameQueue>,
    invalidation: Rc<Invalidation>,
    presenter: P,
    viewport: Size,
    started_at: Instant,
    clock: Rc<dyn Clock>,
    tail: Duration,
    on_frame: Option<UpdateCallback>,
    finished: bool,
}

impl<P: Presenter> LoopData<P> {
    fn position(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started_at)
    }

    fn poll_lyrics(&mut self) {
        let position = self.position();
        if let Some(text) = self.feed.update(position) {
            info!("[{:>7.2}s] {}", position.as_secs_f64(), text);
            self.overlay.set_lyrics_line(&text);
        }
        if position > self.feed.end().saturating_add(self.tail) && self.overlay.is_idle() {
            self.finished = true;
        }
    }

    fn run_frame(&mut self) {
        self.queue.run_frame();
        if let Some(on_frame) = &mut self.on_frame {
            on_frame(&mut self.overlay);
        }
        let flags = self.invalidation.take();
        if flags.contains(ChangeFlags::NEEDS_PAINT) {
            let scene = self.overlay.paint(self.viewport);
            self.presenter.present(&scene, flags);
        }
    }
}

pub struct App {
    config: AppConfig,
    clock: Rc<dyn Clock>,
    measurer: Box<dyn TextMeasurer>,
    on_frame: Option<UpdateCallback>,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            clock: Rc::new(MonotonicClock),
            measurer: Box::new(MonospaceMeasurer::default()),
            on_frame: None,
        }
    }

    pub fn fps(mut self, fps: u32) -> Self {
        self.config.fps = fps;
        self
    }

    pub fn viewport(mut self, width: f64, height: f64) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn lookahead(mut self, lookahead: Duration) -> Self {
        self.config.lookahead = lookahead;
        self
    }

    pub fn overlay(mut self, overlay: OverlayConfig) -> Self {
        self.config.overlay = overlay;
        self
    }

    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn measurer<M: TextMeasurer + 'static>(mut self, measurer: M) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    pub fn on_frame<F: FnMut(&mut LyricsOverlay) + 'static>(mut self, callback: F) -> Self {
        self.on_frame = Some(Box::new(callback));
        self
    }

    /// Play `lyrics` from the start until the last line has faded out.
    pub fn run<P: Presenter + 'static>(self, lyrics: Lyrics, presenter: P) -> Result<P, AppError> {
        // Several apps may run in one process, e.g. in tests.
        let _ = env_logger::try_init();

        let App {
            config,
            clock,
            measurer,
            on_frame,
        } = self;

        let mut event_loop: EventLoop<'static, LoopData<P>> = EventLoop::try_new()?;
        let handle = event_loop.handle();

        let queue = Rc::new(FrameQueue::new());
        let invalidation = Rc::new(Invalidation::new());
        let (ping, ping_source) = make_ping()?;
        {
            let ping = ping.clone();
            queue.set_waker(move || ping.ping());
        }
        invalidation.set_wake(move || ping.ping());

        handle
            .insert_source(ping_source, |_, _, _| {})
            .map_err(|e| e.error)?;

        let poll_interval = config.poll_interval;
        handle
            .insert_source(Timer::immediate(), move |_, _, data: &mut LoopData<P>| {
                data.poll_lyrics();
                if data.finished {
                    TimeoutAction::Drop
                } else {
                    TimeoutAction::ToDuration(poll_interval)
                }
            })
            .map_err(|e| e.error)?;

        let animator = Animator::new(queue.clone(), clock.clone());
        let overlay = LyricsOverlay::new(
            animator,
            invalidation.clone(),
            measurer,
            config.overlay.clone(),
        );

        info!(
            "playing {} lines at {} fps, viewport {}x{}",
            lyrics.len(),
            config.fps,
            config.width,
            config.height
        );

        let mut data = LoopData {
            feed: LyricsFeed::new(lyrics, config.lookahead),
            overlay,
            queue,
            invalidation,
            presenter,
            viewport: Size::new(config.width, config.height),
            started_at: clock.now(),
            clock,
            tail: config.tail,
            on_frame,
            finished: false,
        };

        let frame_interval = config.frame_interval();
        while !data.finished {
            // Sleep until the timer or a ping unless frames are waiting.
            let timeout = if data.queue.is_idle() && !data.invalidation.needs_paint() {
                None
            } else {
                Some(frame_interval)
            };
            event_loop.dispatch(timeout, &mut data)?;
            data.run_frame();
        }

        data.overlay.dispose();
        info!("playback finished after {:.2}s", data.position().as_secs_f64());
        Ok(data.presenter)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
