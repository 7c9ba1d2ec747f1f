//! Value formatting for panel fields.
//!
//! Pure functions from raw tracker readings to display strings. Sentinel
//! values (`0` battery level/voltage, `-1` signal, `0.0` temperature) are
//! ordinary inputs that select a fallback branch.

use crate::math::{Quat, RAD_TO_DEG, to_angles};
use crate::tracker::TrackerStatus;

/// Signal strength reported when the device has no reading.
pub const SIGNAL_UNAVAILABLE: i32 = -1;

/// dBm value mapped to 0%.
pub const SIGNAL_FLOOR_DBM: i32 = -95;

/// dBm value mapped to 100%.
pub const SIGNAL_CEILING_DBM: i32 = -40;

/// Minimum width of the status column.
const STATUS_WIDTH: usize = 5;

/// Width of each position component.
const POSITION_WIDTH: usize = 6;

/// Render `value` rounded (half away from zero) to `digits` decimals.
///
/// With `digits > 0`, trailing zeros and a dangling decimal point are
/// dropped, so `3.70` renders as `3.7` and `0.00` as `0`. Negative zero
/// renders as `0`.
pub fn pretty_number(value: f32, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    // Adding +0.0 turns -0.0 into +0.0.
    let rounded = (value as f64 * scale).round() / scale + 0.0;
    let mut s = format!("{rounded:.digits$}");
    if digits > 0 {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}

/// Layout of an angle triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleStyle {
    /// Decimal places per component.
    pub digits: usize,
    /// Minimum (right-aligned) width per component; `0` disables padding.
    pub width: usize,
    /// Append a single space after the third component.
    pub trailing_space: bool,
}

impl AngleStyle {
    /// Column-aligned style used by the rotation and raw fields.
    pub const STANDARD: Self = Self {
        digits: 0,
        width: 4,
        trailing_space: true,
    };

    /// Unpadded style used by the debug fields.
    pub const COMPACT: Self = Self {
        digits: 0,
        width: 0,
        trailing_space: false,
    };
}

/// Format the Euler decomposition of `q` in degrees using `style`.
pub fn format_angles_with(q: Quat, style: AngleStyle) -> String {
    let parts: Vec<String> = to_angles(q)
        .iter()
        .map(|a| {
            let n = pretty_number(a * RAD_TO_DEG, style.digits);
            format!("{n:>width$}", width = style.width)
        })
        .collect();
    let mut s = parts.join(" ");
    if style.trailing_space {
        s.push(' ');
    }
    s
}

/// Rotation as `"%4s %4s %4s "` degrees.
pub fn format_angles(q: Quat) -> String {
    format_angles_with(q, AngleStyle::STANDARD)
}

/// Rotation as three unpadded degree values.
pub fn format_angles_compact(q: Quat) -> String {
    format_angles_with(q, AngleStyle::COMPACT)
}

/// Position as three one-decimal coordinates, each right-aligned to 6.
pub fn format_position(x: f32, y: f32, z: f32) -> String {
    [x, y, z]
        .iter()
        .map(|c| format!("{:>width$}", pretty_number(*c, 1), width = POSITION_WIDTH))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Battery with a three-way fallback.
///
/// - level `0` → voltage only (`"3.7V"`), even when voltage is also `0`
/// - voltage `0` → level only (`"80%"`)
/// - otherwise both (`"80% (3.7V)"`)
pub fn format_battery(level: f32, voltage: f32) -> String {
    if level == 0.0 {
        format!("{}V", pretty_number(voltage, 2))
    } else if voltage == 0.0 {
        format!("{}%", level.round() as i64)
    } else {
        format!("{}% ({}V)", level.round() as i64, pretty_number(voltage, 2))
    }
}

/// Map dBm onto 0–100% over [`SIGNAL_FLOOR_DBM`, `SIGNAL_CEILING_DBM`].
///
/// Integer arithmetic, truncating, clamped to the range.
pub fn signal_percentage(dbm: i32) -> i32 {
    let span = i64::from(SIGNAL_CEILING_DBM - SIGNAL_FLOOR_DBM);
    let pct = (i64::from(dbm) - i64::from(SIGNAL_FLOOR_DBM)) * 100 / span;
    pct.clamp(0, 100) as i32
}

/// Signal as `"{pct}% ({dbm} dBm)"`, or `"N/A"` for [`SIGNAL_UNAVAILABLE`].
pub fn format_signal(dbm: i32) -> String {
    if dbm == SIGNAL_UNAVAILABLE {
        return "N/A".to_string();
    }
    format!("{}% ({dbm} dBm)", signal_percentage(dbm))
}

/// Temperature in °C; exactly `0.0` means no reading and renders `"?"`.
pub fn format_temperature(celsius: f32) -> String {
    if celsius == 0.0 {
        "?".to_string()
    } else {
        format!("{}∘C", pretty_number(celsius, 1))
    }
}

/// Lower-cased status, left-justified to 5 columns, plus a trailing space.
pub fn format_status(status: TrackerStatus) -> String {
    format!("{:<width$} ", status.as_str().to_lowercase(), width = STATUS_WIDTH)
}

/// `"{calibration} / {magnetometer calibration}"`.
pub fn format_calibration(calibration: i32, mag_calibration: i32) -> String {
    format!("{calibration} / {mag_calibration}")
}

/// Ticks per second, one decimal.
pub fn format_tps(tps: f32) -> String {
    pretty_number(tps, 1)
}

/// Ping in milliseconds.
pub fn format_ping(ping: i32) -> String {
    ping.to_string()
}

/// Magnetometer accuracy: radians in, one-decimal degrees out.
pub fn format_mag_accuracy(radians: f32) -> String {
    format!("{}°", pretty_number(radians * RAD_TO_DEG, 1))
}
