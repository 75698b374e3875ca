//! The live face and light configuration.

use crate::types::{Property, StatusDelta};
use palette::Hsv;
use serde::{Deserialize, Serialize};

/// Full set of face and light property values.
///
/// Serialized as a flat record keyed by property name, which is also the
/// persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub x: f32,
    pub y: f32,
    pub eye_open: f32,
    pub eyebrow_angle: f32,
    pub under_eye_lid: f32,
    pub left_right: f32,
    pub mouth_width: f32,
    pub mouth_y: f32,
    pub smile: f32,
    pub smirk: f32,
    pub cheeks: f32,
    pub yawn: f32,
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Default for Status {
    /// Power-on configuration: face centred on a 240x240 display, eyes nearly
    /// shut, light off.
    fn default() -> Self {
        Self {
            x: 120.0,
            y: 120.0,
            eye_open: 0.1,
            eyebrow_angle: 0.0,
            under_eye_lid: 0.4,
            left_right: 0.0,
            mouth_width: 40.0,
            mouth_y: 0.0,
            smile: 0.0,
            smirk: 0.0,
            cheeks: 0.0,
            yawn: 0.0,
            hue: 0.0,
            saturation: 1.0,
            value: 0.0,
        }
    }
}

impl Status {
    fn slot(&self, property: Property) -> &f32 {
        match property {
            Property::X => &self.x,
            Property::Y => &self.y,
            Property::EyeOpen => &self.eye_open,
            Property::EyebrowAngle => &self.eyebrow_angle,
            Property::UnderEyeLid => &self.under_eye_lid,
            Property::LeftRight => &self.left_right,
            Property::MouthWidth => &self.mouth_width,
            Property::MouthY => &self.mouth_y,
            Property::Smile => &self.smile,
            Property::Smirk => &self.smirk,
            Property::Cheeks => &self.cheeks,
            Property::Yawn => &self.yawn,
            Property::Hue => &self.hue,
            Property::Saturation => &self.saturation,
            Property::Value => &self.value,
        }
    }

    fn slot_mut(&mut self, property: Property) -> &mut f32 {
        match property {
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::EyeOpen => &mut self.eye_open,
            Property::EyebrowAngle => &mut self.eyebrow_angle,
            Property::UnderEyeLid => &mut self.under_eye_lid,
            Property::LeftRight => &mut self.left_right,
            Property::MouthWidth => &mut self.mouth_width,
            Property::MouthY => &mut self.mouth_y,
            Property::Smile => &mut self.smile,
            Property::Smirk => &mut self.smirk,
            Property::Cheeks => &mut self.cheeks,
            Property::Yawn => &mut self.yawn,
            Property::Hue => &mut self.hue,
            Property::Saturation => &mut self.saturation,
            Property::Value => &mut self.value,
        }
    }

    #[inline]
    pub fn get(&self, property: Property) -> f32 {
        *self.slot(property)
    }

    #[inline]
    pub fn set(&mut self, property: Property, value: f32) {
        *self.slot_mut(property) = value;
    }

    /// Overwrites every property present in `delta`.
    pub fn apply(&mut self, delta: &StatusDelta) {
        for (p, v) in delta.iter() {
            self.set(p, v);
        }
    }

    /// Writes `updates` into `self` and reports whether any value differed.
    pub fn merge_changed(&mut self, updates: &StatusDelta) -> bool {
        let mut changed = false;
        for (p, v) in updates.iter() {
            if self.get(p) != v {
                changed = true;
                self.set(p, v);
            }
        }
        changed
    }

    /// Properties whose value differs from `other`, with `other`'s value.
    pub fn diff(&self, other: &Status) -> StatusDelta {
        Property::ALL
            .into_iter()
            .filter(|p| self.get(*p) != other.get(*p))
            .map(|p| (p, other.get(p)))
            .collect()
    }

    /// Every property as a delta, used to replay a whole record.
    pub fn to_delta(&self) -> StatusDelta {
        Property::ALL.into_iter().map(|p| (p, self.get(p))).collect()
    }

    /// Light colour as HSV (hue in degrees, saturation/value in 0.0-1.0).
    pub fn hsv(&self) -> Hsv {
        Hsv::new(self.hue, self.saturation, self.value)
    }

    /// Overwrites hue, saturation and value from the light ring.
    pub fn set_hsv(&mut self, hsv: Hsv) {
        self.hue = hsv.hue.into_positive_degrees();
        self.saturation = hsv.saturation;
        self.value = hsv.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_cover_every_property() {
        let mut status = Status::default();
        for (i, p) in Property::ALL.iter().enumerate() {
            status.set(*p, i as f32 * 3.0);
        }
        for (i, p) in Property::ALL.iter().enumerate() {
            assert_eq!(status.get(*p), i as f32 * 3.0);
        }
    }

    #[test]
    fn merge_changed_reports_only_real_changes() {
        let mut status = Status::default();
        let same = StatusDelta::from([(Property::X, status.x)]);
        assert!(!status.merge_changed(&same));

        let moved = StatusDelta::from([(Property::X, 130.0)]);
        assert!(status.merge_changed(&moved));
        assert_eq!(status.x, 130.0);
    }

    #[test]
    fn diff_lists_differing_properties() {
        let a = Status::default();
        let mut b = a;
        b.hue = 240.0;
        b.smile = -1.0;
        let diff = a.diff(&b);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.get(Property::Hue), Some(240.0));
        assert_eq!(diff.get(Property::Smile), Some(-1.0));
    }

    #[test]
    fn serializes_as_flat_record() {
        let status = Status::default();
        let json = serde_json::to_value(status).unwrap();
        for p in Property::ALL {
            assert!(json.get(p.name()).is_some(), "missing key {}", p);
        }
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let status: Status = serde_json::from_str(r#"{"hue": 240.0, "x": 100}"#).unwrap();
        assert_eq!(status.hue, 240.0);
        assert_eq!(status.x, 100.0);
        assert_eq!(status.under_eye_lid, Status::default().under_eye_lid);
    }

    #[test]
    fn hsv_bridge_keeps_degrees() {
        let mut status = Status::default();
        status.set_hsv(Hsv::new(300.0, 0.5, 0.25));
        assert!((status.hue - 300.0).abs() < 1e-3);
        assert_eq!(status.saturation, 0.5);
        assert_eq!(status.value, 0.25);
        assert!((status.hsv().hue.into_positive_degrees() - 300.0).abs() < 1e-3);
    }
}
