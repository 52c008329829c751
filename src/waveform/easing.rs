//! Easing curves for bar growth.

use serde::{Deserialize, Serialize};

/// Maps linear progress in `[0, 1]` onto eased progress in `[0, 1]`.
///
/// Every curve is monotonic and pinned at both ends, so a bar reaches its
/// target height exactly when its expand duration is over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// Smooth cubic in/out
    #[default]
    EaseInOutCubic,
    Smoothstep,
    /// Fast start, gentle landing
    EaseOutQuad,
}

impl Easing {
    pub fn apply(self, progress: f64) -> f64 {
        let t = progress.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::EaseInOutCubic => write!(f, "ease-in-out-cubic"),
            Self::Smoothstep => write!(f, "smoothstep"),
            Self::EaseOutQuad => write!(f, "ease-out-quad"),
        }
    }
}
