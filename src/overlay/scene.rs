//! Display list produced by painting the overlay.
//!
//! The host turns these commands into real drawing calls. Layers nest: each
//! `PushLayer` is closed by a matching `PopLayer`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `size` rect centred inside `container`.
    pub fn centered(container: Size, size: Size) -> Self {
        Self::new(
            container.width / 2.0 - size.width / 2.0,
            container.height / 2.0 - size.height / 2.0,
            size.width,
            size.height,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Start a compositing layer.
    PushLayer {
        /// Layer opacity, `1.0` is fully opaque
        opacity: f64,
        /// Rounded clip (rect, corner radius)
        clip: Option<(Rect, f64)>,
    },
    FillRoundedRect {
        rect: Rect,
        radius: f64,
        color: Color,
    },
    /// Text anchored at its centre.
    Text {
        text: String,
        x: f64,
        y: f64,
        color: Color,
    },
    PopLayer,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Wrap whatever `content` draws in a layer.
    pub fn layer(
        &mut self,
        opacity: f64,
        clip: Option<(Rect, f64)>,
        content: impl FnOnce(&mut Scene),
    ) {
        self.push(DrawCommand::PushLayer { opacity, clip });
        content(self);
        self.push(DrawCommand::PopLayer);
    }

    /// Text of every `Text` command, in paint order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let rect = Rect::centered(Size::new(200.0, 100.0), Size::new(50.0, 20.0));
        assert_eq!(rect, Rect::new(75.0, 40.0, 50.0, 20.0));
    }

    #[test]
    fn test_layer_is_balanced() {
        let mut scene = Scene::new();
        scene.layer(0.5, None, |scene| {
            scene.push(DrawCommand::Text {
                text: "hi".into(),
                x: 0.0,
                y: 0.0,
                color: Color::rgb(1.0, 1.0, 1.0),
            });
        });
        assert_eq!(scene.commands().len(), 3);
        assert_eq!(scene.commands().last(), Some(&DrawCommand::PopLayer));
        assert_eq!(scene.texts(), vec!["hi"]);
    }
}
