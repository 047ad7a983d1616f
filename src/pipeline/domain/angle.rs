use crate::common::Landmark;
use std::f64::consts::PI;

/// Interior angle at `b` between the rays `b -> a` and `b -> c`, in radians within [0, pi].
///
/// The signed difference of the two ray headings is folded so the winding
/// direction does not matter. Coincident points fall back to `atan2(0, 0) = 0`.
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let raw = ((c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x)).abs();
    if raw > PI {
        2.0 * PI - raw
    } else {
        raw
    }
}

pub fn to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}
