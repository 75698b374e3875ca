//! Core types for animation construction.

use core::str::FromStr;

/// Number of animatable face and light properties.
pub const PROPERTY_COUNT: usize = 15;

/// One independently animatable field of the face [`Status`](crate::Status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// Horizontal face position on the display.
    X,
    /// Vertical face position on the display.
    Y,
    /// Eye openness, 0.0 (closed) to 1.0 (open).
    EyeOpen,
    /// Eyebrow angle, -1.0 (sad) to 1.0 (angry).
    EyebrowAngle,
    /// Height of the lower eye lid, 0.0 to 1.0.
    UnderEyeLid,
    /// Wink direction, -1.0 (left) to 1.0 (right).
    LeftRight,
    MouthWidth,
    MouthY,
    /// Mouth curvature, -1.0 (frown) to 1.0 (smile).
    Smile,
    Smirk,
    Cheeks,
    /// Yawn amount, 0.0 to 1.0.
    Yawn,
    /// Light hue in degrees.
    Hue,
    /// Light saturation, 0.0 to 1.0.
    Saturation,
    /// Light brightness, 0.0 to 1.0.
    Value,
}

impl Property {
    /// Every property, in index order.
    pub const ALL: [Property; PROPERTY_COUNT] = [
        Property::X,
        Property::Y,
        Property::EyeOpen,
        Property::EyebrowAngle,
        Property::UnderEyeLid,
        Property::LeftRight,
        Property::MouthWidth,
        Property::MouthY,
        Property::Smile,
        Property::Smirk,
        Property::Cheeks,
        Property::Yawn,
        Property::Hue,
        Property::Saturation,
        Property::Value,
    ];

    /// Properties driven by the light ring rather than the display.
    pub const LIGHT: [Property; 3] = [Property::Hue, Property::Saturation, Property::Value];

    /// Position of this property in [`Property::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key used for this property in persisted records and on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::EyeOpen => "eye_open",
            Property::EyebrowAngle => "eyebrow_angle",
            Property::UnderEyeLid => "under_eye_lid",
            Property::LeftRight => "left_right",
            Property::MouthWidth => "mouth_width",
            Property::MouthY => "mouth_y",
            Property::Smile => "smile",
            Property::Smirk => "smirk",
            Property::Cheeks => "cheeks",
            Property::Yawn => "yawn",
            Property::Hue => "hue",
            Property::Saturation => "saturation",
            Property::Value => "value",
        }
    }
}

impl core::fmt::Display for Property {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProperty(pub String);

impl core::fmt::Display for UnknownProperty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown property '{}'", self.0)
    }
}

impl std::error::Error for UnknownProperty {}

impl FromStr for Property {
    type Err = UnknownProperty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownProperty(s.to_string()))
    }
}

/// Fixed-size sparse map keyed by [`Property`].
///
/// Used for animation deltas (target values per property) and for the sparse
/// set of properties touched by an animator tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyMap<V> {
    slots: [Option<V>; PROPERTY_COUNT],
}

/// Target values for a subset of properties.
pub type StatusDelta = PropertyMap<f32>;

impl<V: Copy> PropertyMap<V> {
    /// Creates an empty map.
    pub const fn new() -> Self {
        Self {
            slots: [None; PROPERTY_COUNT],
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, property: Property, value: V) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: Property, value: V) -> Option<V> {
        self.slots[property.index()].replace(value)
    }

    pub fn get(&self, property: Property) -> Option<V> {
        self.slots[property.index()]
    }

    pub fn remove(&mut self, property: Property) -> Option<V> {
        self.slots[property.index()].take()
    }

    pub fn contains(&self, property: Property) -> bool {
        self.slots[property.index()].is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterates over present entries in property order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, V)> + '_ {
        Property::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(p, slot)| slot.map(|v| (p, v)))
    }

    /// True if any of hue, saturation or value is present.
    pub fn touches_light(&self) -> bool {
        Property::LIGHT.iter().any(|p| self.contains(*p))
    }
}

impl<V: Copy> Default for PropertyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy, const N: usize> From<[(Property, V); N]> for PropertyMap<V> {
    fn from(entries: [(Property, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<V: Copy> FromIterator<(Property, V)> for PropertyMap<V> {
    fn from_iter<T: IntoIterator<Item = (Property, V)>>(iter: T) -> Self {
        let mut map = PropertyMap::new();
        for (p, v) in iter {
            map.insert(p, v);
        }
        map
    }
}

/// How a property moves from its start value to its end value.
///
/// All curves satisfy `interpolate(s, e, 0, d) == s` and
/// `interpolate(s, e, d, d) == e`. The eased curves are quadratic and never
/// overshoot:
///
/// - `EaseIn`: `p = t²`
/// - `EaseOut`: `p = 1 - (1 - t)²`
/// - `EaseInOut`: `p = 2t²` for `t < 0.5`, else `1 - 2(1 - t)²`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingProfile {
    /// Linear interpolation over duration.
    #[default]
    Linear,

    /// Quadratic ease-in: slow start, accelerating toward end.
    EaseIn,

    /// Quadratic ease-out: fast start, decelerating toward end.
    EaseOut,

    /// Quadratic ease-in-out: slow start and end, fast middle.
    EaseInOut,
}

impl TimingProfile {
    /// Maps linear progress `t` in [0, 1] onto this curve.
    #[inline]
    pub fn ease(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingProfile::Linear => t,
            TimingProfile::EaseIn => t * t,
            TimingProfile::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            TimingProfile::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let inv = 1.0 - t;
                    1.0 - 2.0 * inv * inv
                }
            }
        }
    }

    /// Value between `start` and `end` after `elapsed_ms` of `duration_ms`.
    ///
    /// A zero duration is treated as one millisecond, so the result jumps to
    /// `end` as soon as any time has passed.
    pub fn interpolate(self, start: f32, end: f32, elapsed_ms: u64, duration_ms: u64) -> f32 {
        let duration = duration_ms.max(1);
        if elapsed_ms >= duration {
            return end;
        }
        if elapsed_ms == 0 {
            return start;
        }
        let progress = self.ease(elapsed_ms as f32 / duration as f32);
        start + (end - start) * progress
    }
}
