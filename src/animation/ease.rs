/// Named easing curves.
///
/// `power1..power4` follow the usual tweening vocabulary: power1 is quadratic,
/// power2 cubic, power3 quartic and power4 quintic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// `none` / `linear`.
    Linear,
    /// `power1.in`.
    InQuad,
    /// `power1.out`.
    OutQuad,
    /// `power1.inOut`.
    InOutQuad,
    /// `power2.in`.
    InCubic,
    /// `power2.out`.
    OutCubic,
    /// `power2.inOut`.
    InOutCubic,
    /// `power3.in`.
    InQuart,
    /// `power3.out`, the default.
    OutQuart,
    /// `power3.inOut`.
    InOutQuart,
    /// `power4.in`.
    InQuint,
    /// `power4.out`.
    OutQuint,
    /// `power4.inOut`.
    InOutQuint,
    /// `back.in`, overshoots below 0 at the start.
    InBack,
    /// `back.out`, overshoots past 1 before settling.
    OutBack,
    /// `expo.out`.
    OutExpo,
    /// `sine.inOut`.
    InOutSine,
}

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;

impl Default for Ease {
    /// `power3.out`.
    fn default() -> Self {
        Self::OutQuart
    }
}

impl Ease {
    /// Map linear progress to eased progress; `t` is clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(5) / 2.0)
                }
            }
            Self::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::OutBack => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
            Self::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }

    /// Look up a curve by its markup name, e.g. `power3.out` or `back.out(1.7)`.
    ///
    /// A trailing parenthesised parameter is accepted and ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = match name.find('(') {
            Some(i) => &name[..i],
            None => name,
        };
        let name = name.trim().to_ascii_lowercase();
        let (family, variant) = match name.split_once('.') {
            Some((f, v)) => (f, v),
            None => (name.as_str(), "out"),
        };

        let ease = match (family, variant) {
            ("linear" | "none", _) => Self::Linear,
            ("power1" | "quad", "in") => Self::InQuad,
            ("power1" | "quad", "out") => Self::OutQuad,
            ("power1" | "quad", "inout") => Self::InOutQuad,
            ("power2" | "cubic", "in") => Self::InCubic,
            ("power2" | "cubic", "out") => Self::OutCubic,
            ("power2" | "cubic", "inout") => Self::InOutCubic,
            ("power3" | "quart", "in") => Self::InQuart,
            ("power3" | "quart", "out") => Self::OutQuart,
            ("power3" | "quart", "inout") => Self::InOutQuart,
            ("power4" | "quint" | "strong", "in") => Self::InQuint,
            ("power4" | "quint" | "strong", "out") => Self::OutQuint,
            ("power4" | "quint" | "strong", "inout") => Self::InOutQuint,
            ("back", "in") => Self::InBack,
            ("back", "out") => Self::OutBack,
            ("expo", "out") => Self::OutExpo,
            ("sine", "inout") => Self::InOutSine,
            _ => return None,
        };
        Some(ease)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
