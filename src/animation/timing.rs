//! Easing curves for value transitions.
//!
//! A timing function maps linear progress (`0.0..=1.0`) onto eased progress.
//! The output is not clamped, so curves are free to overshoot.
//!
//! ## Built-in curves
//!
//! - [`TimingFunction::Linear`] - constant speed, the default
//! - [`TimingFunction::EaseOutQuart`] - fast start, long soft landing
//! - [`TimingFunction::EaseIn`], [`TimingFunction::EaseOut`],
//!   [`TimingFunction::EaseInOut`] - quadratic variants
//! - [`TimingFunction::CubicBezier`] - CSS-style `cubic-bezier(x1, y1, x2, y2)`
//! - [`TimingFunction::Custom`] - any `Fn(f64) -> f64`
//!
//! ## Example
//!
//! ```
//! use ilyrics::animation::TimingFunction;
//!
//! let curve = TimingFunction::EaseOutQuart;
//! assert_eq!(curve.evaluate(0.0), 0.0);
//! assert_eq!(curve.evaluate(1.0), 1.0);
//! assert!(curve.evaluate(0.5) > 0.5);
//! ```

use std::sync::Arc;

/// `linear(x) = x`
pub fn linear(x: f64) -> f64 {
    x
}

/// `ease_out_quart(x) = 1 - (1 - x)^4`
pub fn ease_out_quart(x: f64) -> f64 {
    1.0 - (1.0 - x).powi(4)
}

/// Curve applied to the normalized progress of a transition.
#[derive(Clone, Default)]
pub enum TimingFunction {
    /// Constant speed
    #[default]
    Linear,
    /// Decelerates sharply towards the end
    EaseOutQuart,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Slow at both ends
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f64, f64, f64, f64),
    /// User supplied curve
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl TimingFunction {
    /// Map progress `x` (normally `0.0..=1.0`) to eased progress.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            TimingFunction::Linear => linear(x),
            TimingFunction::EaseOutQuart => ease_out_quart(x),
            TimingFunction::EaseIn => x * x,
            TimingFunction::EaseOut => x * (2.0 - x),
            TimingFunction::EaseInOut => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    -1.0 + (4.0 - 2.0 * x) * x
                }
            }
            TimingFunction::CubicBezier(x1, y1, x2, y2) => bezier_at(x, *x1, *y1, *x2, *y2),
            TimingFunction::Custom(f) => f(x),
        }
    }

    /// Wrap a closure as a timing function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::EaseOutQuart => write!(f, "EaseOutQuart"),
            TimingFunction::EaseIn => write!(f, "EaseIn"),
            TimingFunction::EaseOut => write!(f, "EaseOut"),
            TimingFunction::EaseInOut => write!(f, "EaseInOut"),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({x1}, {y1}, {x2}, {y2})")
            }
            TimingFunction::Custom(_) => write!(f, "Custom"),
        }
    }
}

// One axis of a bezier with endpoints pinned at 0 and 1.
fn bezier_axis(t: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

fn bezier_axis_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Solve the curve parameter for `x` with Newton-Raphson, then read `y`.
fn bezier_at(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let mut t = x;
    for _ in 0..8 {
        let slope = bezier_axis_slope(t, x1, x2);
        if slope.abs() < 1e-9 {
            break;
        }
        t -= (bezier_axis(t, x1, x2) - x) / slope;
    }
    bezier_axis(t, y1, y2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curves() -> Vec<TimingFunction> {
        vec![
            TimingFunction::Linear,
            TimingFunction::EaseOutQuart,
            TimingFunction::EaseIn,
            TimingFunction::EaseOut,
            TimingFunction::EaseInOut,
            TimingFunction::CubicBezier(0.25, 0.1, 0.25, 1.0),
        ]
    }

    #[test]
    fn test_linear() {
        assert_eq!(TimingFunction::Linear.evaluate(0.0), 0.0);
        assert_eq!(TimingFunction::Linear.evaluate(0.25), 0.25);
        assert_eq!(TimingFunction::Linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_ease_out_quart() {
        assert_eq!(ease_out_quart(0.0), 0.0);
        assert_eq!(ease_out_quart(1.0), 1.0);
        // 1 - 0.5^4
        assert!((ease_out_quart(0.5) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn test_boundaries_hold_for_builtins() {
        for curve in curves() {
            assert!(curve.evaluate(0.0).abs() < 1e-6, "{curve:?} at 0");
            assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-6, "{curve:?} at 1");
        }
    }

    #[test]
    fn test_ease_in_and_out_shapes() {
        assert!(TimingFunction::EaseIn.evaluate(0.5) < 0.5);
        assert!(TimingFunction::EaseOut.evaluate(0.5) > 0.5);
        assert!((TimingFunction::EaseInOut.evaluate(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_custom_curve_may_overshoot() {
        let back = TimingFunction::custom(|x| x * 1.5);
        assert_eq!(back.evaluate(1.0), 1.5);
        assert_eq!(format!("{back:?}"), "Custom");
    }

    #[test]
    fn test_default_is_linear() {
        assert!(matches!(TimingFunction::default(), TimingFunction::Linear));
    }
}
