use std::rc::Rc;

use crate::animation::{Animator, Completion, Variable};
use crate::config::OverlayConfig;

use super::invalidation::Invalidation;
use super::scene::{DrawCommand, Rect, Scene, Size};

/// The translucent rounded box behind the lyrics.
///
/// Width and height chase the current line's size; opacity fades the whole
/// overlay in and out.
pub struct Frame {
    width: Variable,
    height: Variable,
    opacity: Variable,
    invalidation: Rc<Invalidation>,
    config: OverlayConfig,
}

impl Frame {
    pub fn new(animator: &Animator, invalidation: &Rc<Invalidation>, config: OverlayConfig) -> Self {
        Self {
            width: animator.variable(0.0).with_sink(invalidation),
            height: animator.variable(0.0).with_sink(invalidation),
            opacity: animator.variable(0.0).with_sink(invalidation),
            invalidation: invalidation.clone(),
            config,
        }
    }

    pub fn set_size(&self, width: f64, height: f64) -> Completion {
        let transition = &self.config.frame_size;
        if width != self.width.target() || height != self.height.target() {
            self.invalidation.request_layout();
        }
        Completion::all([
            self.width
                .schedule_transition(width, transition.duration, transition.timing.clone()),
            self.height
                .schedule_transition(height, transition.duration, transition.timing.clone()),
        ])
    }

    pub fn set_opacity(&self, opacity: f64) -> Completion {
        let transition = &self.config.frame_opacity;
        self.opacity
            .schedule_transition(opacity, transition.duration, transition.timing.clone())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width.value(), self.height.value())
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.value()
    }

    /// Current box, centred in the viewport.
    pub fn bounds(&self, viewport: Size) -> Rect {
        Rect::centered(viewport, self.size())
    }

    pub fn is_animating(&self) -> bool {
        self.width.is_animating() || self.height.is_animating() || self.opacity.is_animating()
    }

    /// Paint the box, then `content` clipped to it.
    pub fn draw(&self, viewport: Size, scene: &mut Scene, content: impl FnOnce(&mut Scene)) {
        let bounds = self.bounds(viewport);
        let radius = self.config.corner_radius;
        let background = self.config.background;
        scene.layer(self.opacity(), None, |scene| {
            scene.layer(1.0, Some((bounds, radius)), |scene| {
                scene.push(DrawCommand::FillRoundedRect {
                    rect: bounds,
                    radius,
                    color: background,
                });
                content(scene);
            });
        });
    }

    pub fn dispose(&self) {
        self.width.dispose();
        self.height.dispose();
        self.opacity.dispose();
    }
}
