use super::scene::Size;

/// Measures a single line of text as the host will draw it.
pub trait TextMeasurer {
    fn measure(&self, text: &str) -> Size;
}

/// Every character has the same advance.
///
/// Good enough for headless runs and tests; real hosts measure with their
/// own text engine.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub advance: f64,
    pub line_height: f64,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance: 10.0,
            line_height: 24.0,
        }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&self, text: &str) -> Size {
        Size::new(text.chars().count() as f64 * self.advance, self.line_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_chars_not_bytes() {
        let measurer = MonospaceMeasurer::default();
        assert_eq!(measurer.measure("歌词"), Size::new(20.0, 24.0));
        assert_eq!(measurer.measure(""), Size::new(0.0, 24.0));
    }
}
