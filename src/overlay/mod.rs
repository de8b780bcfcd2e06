//! The floating lyrics box.
//!
//! [`LyricsOverlay`] owns a [`Frame`] and the lines currently on screen. Every
//! animated property is a [`Variable`](crate::animation::Variable) reporting to
//! one shared [`Invalidation`], so the host only repaints while something moves.

mod frame;
mod invalidation;
mod line;
mod scene;
mod text;

use std::rc::Rc;

use log::debug;

use crate::animation::{Animator, Completion};
use crate::config::OverlayConfig;

pub use frame::Frame;
pub use invalidation::{ChangeFlags, Invalidation};
pub use line::Line;
pub use scene::{Color, DrawCommand, Rect, Scene, Size};
pub use text::{MonospaceMeasurer, TextMeasurer};

struct ActiveLine {
    line: Line,
    /// Set once the line has started leaving
    leaving: Option<Completion>,
}

impl ActiveLine {
    fn has_left(&self) -> bool {
        self.leaving.as_ref().is_some_and(Completion::is_settled)
    }
}

pub struct LyricsOverlay {
    animator: Animator,
    invalidation: Rc<Invalidation>,
    measurer: Box<dyn TextMeasurer>,
    config: OverlayConfig,
    frame: Frame,
    lines: Vec<ActiveLine>,
}

impl LyricsOverlay {
    pub fn new(
        animator: Animator,
        invalidation: Rc<Invalidation>,
        measurer: Box<dyn TextMeasurer>,
        config: OverlayConfig,
    ) -> Self {
        let frame = Frame::new(&animator, &invalidation, config.clone());
        Self {
            animator,
            invalidation,
            measurer,
            config,
            frame,
            lines: Vec::new(),
        }
    }

    /// Replace the line on screen with `text`.
    ///
    /// Lines already shown slide out and are dropped once gone. An empty
    /// string fades the frame away instead of showing a new line. When the
    /// overlay is full the oldest lines are dropped at once.
    pub fn set_lyrics_line(&mut self, text: &str) {
        self.prune();

        let max = self.config.max_active_lines.max(1);
        if self.lines.len() >= max {
            let excess = self.lines.len() - max + 1;
            for active in self.lines.drain(..excess) {
                debug!("dropping line {:?} early", active.line.text());
                active.line.dispose();
            }
        }

        for active in &mut self.lines {
            if active.leaving.is_none() {
                active.leaving = Some(active.line.hide());
            }
        }

        if text.is_empty() {
            debug!("no lyrics, fading out");
            self.frame.set_opacity(0.0);
            return;
        }

        let size = self.measurer.measure(text);
        let mut line = Line::new(
            &self.animator,
            &self.invalidation,
            text,
            size,
            self.config.clone(),
        );
        debug!("showing line {text:?} ({}x{})", size.width, size.height);
        self.frame.set_size(
            size.width + self.config.frame_horizontal_padding * 2.0,
            size.height,
        );
        self.frame.set_opacity(1.0);
        line.show();
        self.lines.push(ActiveLine {
            line,
            leaving: None,
        });
    }

    /// Drop lines that finished sliding out.
    pub fn prune(&mut self) {
        let before = self.lines.len();
        self.lines.retain(|active| !active.has_left());
        if self.lines.len() != before {
            self.invalidation.request_paint();
        }
    }

    /// Paint the current state into a fresh scene.
    pub fn paint(&mut self, viewport: Size) -> Scene {
        self.prune();
        let mut scene = Scene::new();
        let lines = &self.lines;
        self.frame.draw(viewport, &mut scene, |scene| {
            for active in lines {
                active.line.draw(viewport, scene);
            }
        });
        scene
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Lines on screen, oldest first, including ones sliding out.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().map(|active| &active.line)
    }

    pub fn invalidation(&self) -> &Rc<Invalidation> {
        &self.invalidation
    }

    /// True when nothing is moving.
    pub fn is_idle(&self) -> bool {
        !self.frame.is_animating() && self.lines.iter().all(|active| !active.line.is_animating())
    }

    pub fn dispose(&mut self) {
        self.frame.dispose();
        for active in self.lines.drain(..) {
            active.line.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{FrameQueue, ManualClock};
    use std::time::Duration;

    struct Setup {
        queue: Rc<FrameQueue>,
        clock: Rc<ManualClock>,
        overlay: LyricsOverlay,
    }

    fn setup() -> Setup {
        let queue = Rc::new(FrameQueue::new());
        let clock = Rc::new(ManualClock::new());
        let animator = Animator::new(queue.clone(), clock.clone());
        let overlay = LyricsOverlay::new(
            animator,
            Rc::new(Invalidation::new()),
            Box::new(MonospaceMeasurer::default()),
            OverlayConfig::default(),
        );
        Setup {
            queue,
            clock,
            overlay,
        }
    }

    fn run_for(s: &Setup, ms: u64) {
        // A few frames per step so every variable ticks.
        for _ in 0..4 {
            s.clock.advance(Duration::from_millis(ms / 4));
            s.queue.run_frame();
        }
    }

    fn texts(s: &Setup) -> Vec<String> {
        s.overlay.lines().map(|l| l.text().to_string()).collect()
    }

    #[test]
    fn test_first_line_grows_frame_and_fades_in() {
        let mut s = setup();
        s.overlay.set_lyrics_line("hello");
        run_for(&s, 600);

        // 5 chars * 10px + 2 * 10px padding
        assert_eq!(s.overlay.frame().size(), Size::new(70.0, 24.0));
        assert_eq!(s.overlay.frame().opacity(), 1.0);
        assert_eq!(texts(&s), vec!["hello"]);
        assert!(s.overlay.is_idle());
        assert!(s.queue.is_idle());
    }

    #[test]
    fn test_previous_line_leaves_then_is_pruned() {
        let mut s = setup();
        s.overlay.set_lyrics_line("one");
        run_for(&s, 600);
        s.overlay.set_lyrics_line("two");
        assert_eq!(texts(&s), vec!["one", "two"]);

        run_for(&s, 600);
        let scene = s.overlay.paint(Size::new(800.0, 100.0));
        assert_eq!(texts(&s), vec!["two"]);
        assert_eq!(scene.texts(), vec!["two"]);
    }

    #[test]
    fn test_overlay_caps_active_lines() {
        let mut s = setup();
        for text in ["a", "b", "c", "d", "e"] {
            s.overlay.set_lyrics_line(text);
            assert!(s.overlay.lines().count() <= 3);
        }
        assert_eq!(texts(&s), vec!["c", "d", "e"]);
    }

    #[test]
    fn test_empty_line_fades_frame_out() {
        let mut s = setup();
        s.overlay.set_lyrics_line("hello");
        run_for(&s, 600);
        s.overlay.set_lyrics_line("");
        run_for(&s, 600);

        assert_eq!(s.overlay.frame().opacity(), 0.0);
        s.overlay.prune();
        assert_eq!(s.overlay.lines().count(), 0);
    }

    #[test]
    fn test_leaving_line_keeps_its_exit() {
        let mut s = setup();
        s.overlay.set_lyrics_line("one");
        run_for(&s, 600);
        s.overlay.set_lyrics_line("two");
        run_for(&s, 200);
        s.overlay.set_lyrics_line("three");

        // "one" is still sliding out rather than being cut off.
        assert_eq!(texts(&s), vec!["one", "two", "three"]);
        let one = s.overlay.lines().next().unwrap();
        assert!(one.opacity() > 0.0);
    }

    #[test]
    fn test_paint_marks_clean_until_next_move() {
        let mut s = setup();
        let invalidation = s.overlay.invalidation().clone();
        invalidation.take();

        s.overlay.set_lyrics_line("hello");
        run_for(&s, 600);
        assert!(invalidation.take().contains(ChangeFlags::NEEDS_PAINT));

        s.queue.run_frame();
        assert_eq!(invalidation.take(), ChangeFlags::empty());
    }

    #[test]
    fn test_dispose_stops_everything() {
        let mut s = setup();
        s.overlay.set_lyrics_line("hello");
        s.overlay.dispose();
        assert!(s.queue.is_idle());
        assert_eq!(s.overlay.lines().count(), 0);
    }
}
