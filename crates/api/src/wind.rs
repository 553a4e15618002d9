//! Wind vector decomposition.
//!
//! Reference: http://colaweb.gmu.edu/dev/clim301/lectures/wind/wind-uv

/// Eastward (`u`) and northward (`v`) wind components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindComponents {
    pub u: f64,
    pub v: f64,
}

/// Convert a compass bearing (degrees clockwise from north) into a
/// mathematical angle in [0, 360).
pub fn math_angle(compass_direction: f64) -> f64 {
    let angle = 270.0 - compass_direction;
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Split wind speed and compass direction into (u, v).
///
/// Returns `None` when either input is missing, zero is a real reading.
pub fn decompose(speed: Option<f64>, direction: Option<f64>) -> Option<WindComponents> {
    let (speed, direction) = (speed?, direction?);
    let radians = math_angle(direction).to_radians();
    Some(WindComponents {
        u: speed * radians.cos(),
        v: speed * radians.sin(),
    })
}
