use std::rc::Rc;

use crate::animation::{Animator, Completion, Variable};
use crate::config::OverlayConfig;

use super::invalidation::Invalidation;
use super::scene::{Color, DrawCommand, Scene, Size};

/// One lyrics line sliding and fading through the frame.
///
/// A new line waits half its height below centre, slides up to rest while
/// fading in, then leaves by sliding up another half height while fading out.
pub struct Line {
    text: String,
    size: Size,
    opacity: Variable,
    translate_y: Variable,
    visible: bool,
    color: Color,
    config: OverlayConfig,
}

impl Line {
    pub fn new(
        animator: &Animator,
        invalidation: &Rc<Invalidation>,
        text: impl Into<String>,
        size: Size,
        config: OverlayConfig,
    ) -> Self {
        Self {
            text: text.into(),
            size,
            opacity: animator.variable(0.0).with_sink(invalidation),
            translate_y: animator.variable(0.5 * size.height).with_sink(invalidation),
            visible: false,
            color: config.text_color,
            config,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.value()
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y.value()
    }

    pub fn is_animating(&self) -> bool {
        self.opacity.is_animating() || self.translate_y.is_animating()
    }

    /// Slide in. Settled right away if the line is already shown.
    pub fn show(&mut self) -> Completion {
        if self.visible {
            return Completion::settled();
        }
        self.visible = true;
        self.move_to(1.0, 0.0)
    }

    /// Slide out. Settled right away if the line is already hidden.
    pub fn hide(&mut self) -> Completion {
        if !self.visible {
            return Completion::settled();
        }
        self.visible = false;
        self.move_to(0.0, -0.5 * self.size.height)
    }

    fn move_to(&self, opacity: f64, translate_y: f64) -> Completion {
        let fade = &self.config.line_opacity;
        let slide = &self.config.line_translate;
        Completion::all([
            self.opacity
                .schedule_transition(opacity, fade.duration, fade.timing.clone()),
            self.translate_y
                .schedule_transition(translate_y, slide.duration, slide.timing.clone()),
        ])
    }

    /// Paint the text centred in the viewport, offset by the slide.
    pub fn draw(&self, viewport: Size, scene: &mut Scene) {
        let text = self.text.clone();
        let (x, y) = (
            viewport.width / 2.0,
            viewport.height / 2.0 + self.translate_y(),
        );
        let color = self.color;
        scene.layer(self.opacity(), None, |scene| {
            scene.push(DrawCommand::Text { text, x, y, color });
        });
    }

    pub fn dispose(&self) {
        self.opacity.dispose();
        self.translate_y.dispose();
    }
}

impl std::fmt::Debug for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Line")
            .field("text", &self.text)
            .field("visible", &self.visible)
            .field("opacity", &self.opacity())
            .field("translate_y", &self.translate_y())
            .finish()
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
        line: Line,
    }

    fn setup() -> Setup {
        let queue = Rc::new(FrameQueue::new());
        let clock = Rc::new(ManualClock::new());
        let animator = Animator::new(queue.clone(), clock.clone());
        let invalidation = Rc::new(Invalidation::new());
        let line = Line::new(
            &animator,
            &invalidation,
            "hello",
            Size::new(50.0, 20.0),
            OverlayConfig::default(),
        );
        Setup { queue, clock, line }
    }

    fn run_for(setup: &Setup, ms: u64) {
        setup.clock.advance(Duration::from_millis(ms));
        setup.queue.run_frame();
    }

    #[test]
    fn test_new_line_waits_below_centre() {
        let s = setup();
        assert_eq!(s.line.opacity(), 0.0);
        assert_eq!(s.line.translate_y(), 10.0);
        assert!(!s.line.is_visible());
    }

    #[test]
    fn test_show_slides_to_rest() {
        let mut s = setup();
        let shown = s.line.show();
        run_for(&s, 250);
        assert!(s.line.translate_y() < 10.0);
        run_for(&s, 250);
        assert!(shown.is_settled());
        assert_eq!(s.line.opacity(), 1.0);
        assert_eq!(s.line.translate_y(), 0.0);
    }

    #[test]
    fn test_show_and_hide_are_idempotent() {
        let mut s = setup();
        assert!(s.line.hide().is_settled());
        let first = s.line.show();
        assert!(!first.is_settled());
        assert!(s.line.show().is_settled());
        assert_eq!(s.queue.pending(), 2);
    }

    #[test]
    fn test_hide_slides_up_and_out() {
        let mut s = setup();
        s.line.show();
        run_for(&s, 500);

        let hidden = s.line.hide();
        run_for(&s, 500);
        assert!(hidden.is_settled());
        assert_eq!(s.line.opacity(), 0.0);
        assert_eq!(s.line.translate_y(), -10.0);
    }

    #[test]
    fn test_hide_mid_show_settles_the_show() {
        let mut s = setup();
        let shown = s.line.show();
        run_for(&s, 100);
        let _hidden = s.line.hide();
        assert!(shown.is_settled());
    }

    #[test]
    fn test_draw_offsets_text() {
        let s = setup();
        let mut scene = Scene::new();
        s.line.draw(Size::new(200.0, 100.0), &mut scene);
        assert!(matches!(
            &scene.commands()[1],
            DrawCommand::Text { x, y, .. } if *x == 100.0 && *y == 60.0
        ));
    }
}
