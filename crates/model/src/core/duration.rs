use chrono::TimeDelta;
use std::fmt::Write;

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a duration literal.
///
/// Accepted forms:
/// - time-span: `[-][d.]hh:mm[:ss[.fffffff]]` or a bare day count `[-]d`
/// - ISO-8601: `[-]P[nD][T[nH][nM][n[.f]S]]`
pub fn parse_duration(input: &str) -> Option<TimeDelta> {
    let s = input.trim();
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if body.is_empty() {
        return None;
    }

    let magnitude = match body.strip_prefix(['P', 'p']) {
        Some(iso) => parse_iso(iso)?,
        None => parse_time_span(body)?,
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// Format a duration in time-span syntax, e.g. `1.02:03:04.5000000`.
pub fn format_duration(duration: &TimeDelta) -> String {
    let negative = *duration < TimeDelta::zero();
    let abs = duration.abs();
    let total = abs.num_seconds();
    let nanos = abs.subsec_nanos();

    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        let _ = write!(out, "{days}.");
    }
    let _ = write!(out, "{hours:02}:{minutes:02}:{seconds:02}");
    if nanos > 0 {
        if nanos % 100 == 0 {
            let _ = write!(out, ".{:07}", nanos / 100);
        } else {
            let _ = write!(out, ".{nanos:09}");
        }
    }
    out
}

/// Format a duration in ISO-8601 syntax, e.g. `P1DT2H3M4.5S`.
///
/// Unlike time-span syntax this cannot be mistaken for a time of day.
pub fn format_iso_duration(duration: &TimeDelta) -> String {
    let abs = duration.abs();
    let total = abs.num_seconds();
    let nanos = abs.subsec_nanos();

    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if *duration < TimeDelta::zero() {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        let _ = write!(out, "{days}D");
    }
    if hours == 0 && minutes == 0 && seconds == 0 && nanos == 0 {
        if days == 0 {
            out.push_str("T0S");
        }
        return out;
    }
    out.push('T');
    if hours > 0 {
        let _ = write!(out, "{hours}H");
    }
    if minutes > 0 {
        let _ = write!(out, "{minutes}M");
    }
    if seconds > 0 || nanos > 0 {
        let _ = write!(out, "{seconds}");
        if nanos > 0 {
            let fraction = format!("{nanos:09}");
            let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
        }
        out.push('S');
    }
    out
}

fn parse_time_span(s: &str) -> Option<TimeDelta> {
    if !s.contains(':') {
        let days = parse_digits(s)?;
        return from_parts(days, 0, 0, 0, 0);
    }

    let (days, clock) = match s.split_once('.') {
        Some((d, rest)) if !d.contains(':') => (parse_digits(d)?, rest),
        _ => (0, s),
    };

    let mut parts = clock.split(':');
    let hours = parse_digits(parts.next()?)?;
    let minutes = parse_digits(parts.next()?)?;
    let (seconds, nanos) = match parts.next() {
        Some(sec) => parse_seconds(sec)?,
        None => (0, 0),
    };

    if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    from_parts(days, hours, minutes, seconds, nanos)
}

fn parse_iso(s: &str) -> Option<TimeDelta> {
    let (date_part, time_part) = match s.split_once(['T', 't']) {
        Some((d, t)) => (d, Some(t)),
        None => (s, None),
    };

    let days = if date_part.is_empty() {
        0
    } else {
        parse_digits(date_part.strip_suffix(['D', 'd'])?)?
    };

    let (mut hours, mut minutes, mut seconds, mut nanos) = (0, 0, 0, 0);
    if let Some(time) = time_part {
        if time.is_empty() {
            return None;
        }
        let mut rest = time;
        while !rest.is_empty() {
            let unit_at = rest.find(|c: char| !c.is_ascii_digit() && c != '.')?;
            let (number, tail) = rest.split_at(unit_at);
            let mut chars = tail.chars();
            match chars.next()?.to_ascii_uppercase() {
                'H' => hours = parse_digits(number)?,
                'M' => minutes = parse_digits(number)?,
                'S' => (seconds, nanos) = parse_seconds(number)?,
                _ => return None,
            }
            rest = chars.as_str();
        }
    } else if date_part.is_empty() {
        return None;
    }

    from_parts(days, hours, minutes, seconds, nanos)
}

fn parse_seconds(s: &str) -> Option<(i64, u32)> {
    match s.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty() || fraction.len() > 9 {
                return None;
            }
            let digits = parse_digits(fraction)?;
            let scale = 10_i64.pow(9 - fraction.len() as u32);
            Some((parse_digits(whole)?, (digits * scale) as u32))
        }
        None => Some((parse_digits(s)?, 0)),
    }
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok()
}

fn from_parts(days: i64, hours: i64, minutes: i64, seconds: i64, nanos: u32) -> Option<TimeDelta> {
    let total = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours.checked_mul(3600)?)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    TimeDelta::new(total, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_span_forms() {
        assert_eq!(parse_duration("02:30"), TimeDelta::new(9000, 0));
        assert_eq!(parse_duration("1.00:00:00"), TimeDelta::new(86_400, 0));
        assert_eq!(
            parse_duration("1.02:03:04.5"),
            TimeDelta::new(86_400 + 7384, 500_000_000)
        );
        assert_eq!(parse_duration("3"), TimeDelta::new(3 * 86_400, 0));
        assert_eq!(parse_duration("-00:00:10"), TimeDelta::new(-10, 0));
    }

    #[test]
    fn test_parse_iso_forms() {
        assert_eq!(parse_duration("P1D"), TimeDelta::new(86_400, 0));
        assert_eq!(parse_duration("PT1H30M"), TimeDelta::new(5400, 0));
        assert_eq!(parse_duration("P2DT0.25S"), TimeDelta::new(172_800, 250_000_000));
        assert_eq!(parse_duration("P"), None);
        assert_eq!(parse_duration("PT"), None);
    }

    #[test]
    fn test_rejects_non_durations() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("24:00"), None);
        assert_eq!(parse_duration("10:61"), None);
        assert_eq!(parse_duration("2024-01-01"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
    }

    #[test]
    fn test_format_round_trips() {
        for literal in ["00:00:00", "02:03:04", "1.00:00:00", "-3.04:05:06.5000000"] {
            let parsed = parse_duration(literal).unwrap();
            assert_eq!(format_duration(&parsed), literal);
        }
    }

    #[test]
    fn test_iso_format_round_trips() {
        for literal in ["PT0S", "PT2H", "P1D", "P1DT1H", "PT1M30.25S", "-P3DT4H5M6.5S"] {
            let parsed = parse_duration(literal).unwrap();
            assert_eq!(format_iso_duration(&parsed), literal);
        }
    }
}
