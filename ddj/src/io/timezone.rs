//! Host timezone forwarded to unit containers as `TZ`.

use chrono::{Local, Offset};

/// Timezone string for the container, or `None` when the host runs on UTC.
///
/// An explicit, non-empty host `TZ` is forwarded verbatim; otherwise the
/// current local offset is rendered as a POSIX TZ string.
pub fn host_timezone() -> Option<String> {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim();
        if !tz.is_empty() {
            return Some(tz.to_string());
        }
    }
    let offset = Local::now().offset().fix().local_minus_utc();
    posix_tz(offset)
}

/// Render a UTC offset (seconds east of UTC) as `<+HHMM>-H:MM:SS`.
///
/// POSIX counts offsets west of UTC as positive, so the sign is inverted
/// relative to the quoted zone name.
pub fn posix_tz(offset_east_secs: i32) -> Option<String> {
    if offset_east_secs == 0 {
        return None;
    }
    let (name_sign, posix_sign) = if offset_east_secs > 0 {
        ('+', '-')
    } else {
        ('-', '+')
    };
    let secs = offset_east_secs.unsigned_abs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    Some(format!(
        "<{name_sign}{hours:02}{minutes:02}>{posix_sign}{hours}:{minutes:02}:{seconds:02}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_has_no_timezone() {
        assert_eq!(posix_tz(0), None);
    }

    #[test]
    fn east_of_utc_uses_negative_posix_offset() {
        assert_eq!(posix_tz(9 * 3600).as_deref(), Some("<+0900>-9:00:00"));
        assert_eq!(posix_tz(5 * 3600 + 1800).as_deref(), Some("<+0530>-5:30:00"));
    }

    #[test]
    fn west_of_utc_uses_positive_posix_offset() {
        assert_eq!(posix_tz(-5 * 3600).as_deref(), Some("<-0500>+5:00:00"));
    }
}
