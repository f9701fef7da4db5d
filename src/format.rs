//! String renderings shared with the Go side of the schema: durations and ratios.

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Renders a duration in nanoseconds the way Go's `time.Duration` prints itself.
///
/// Sub-second durations use the largest fitting unit among `ns`, `µs` and `ms` with a
/// fractional part; longer durations are written as `[h]h[m]m[s.frac]s`. Zero is `0s`.
///
/// ## Examples
///
/// ```rust
/// use bollard_flatten::format::go_duration;
///
/// assert_eq!(go_duration(90_000_000_000), "1m30s");
/// assert_eq!(go_duration(1_500), "1.5µs");
/// assert_eq!(go_duration(3_600_000_000_000), "1h0m0s");
/// ```
pub fn go_duration(nanos: i64) -> String {
    if nanos == 0 {
        return String::from("0s");
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let u = nanos.unsigned_abs();

    if u < NANOS_PER_SECOND {
        let (prec, unit) = if u < 1_000 {
            (0, "ns")
        } else if u < 1_000_000 {
            (3, "µs")
        } else {
            (6, "ms")
        };
        let (frac, whole) = fraction(u, prec);
        return format!("{}{}{}{}", sign, whole, frac, unit);
    }

    let (frac, secs) = fraction(u, 9);
    let mins = secs / 60;
    let hours = mins / 60;
    if hours > 0 {
        format!("{}{}h{}m{}{}s", sign, hours, mins % 60, secs % 60, frac)
    } else if mins > 0 {
        format!("{}{}m{}{}s", sign, mins, secs % 60, frac)
    } else {
        format!("{}{}{}s", sign, secs, frac)
    }
}

// Splits `v` into `v / 10^prec` and its decimal fraction, trailing zeros dropped. The
// fraction is empty, without a point, when it is zero.
fn fraction(v: u64, prec: u32) -> (String, u64) {
    let pow = 10u64.pow(prec);
    let whole = v / pow;
    let rest = v % pow;
    if rest == 0 {
        return (String::new(), whole);
    }
    let digits = format!("{:0width$}", rest, width = prec as usize);
    (format!(".{}", digits.trim_end_matches('0')), whole)
}

/// [`go_duration`] with the zero trailing components dropped: `1m0s` becomes `1m` and
/// `1h0m0s` becomes `1h`.
///
/// ## Examples
///
/// ```rust
/// use bollard_flatten::format::short_duration;
///
/// assert_eq!(short_duration(60_000_000_000), "1m");
/// assert_eq!(short_duration(3_600_000_000_000), "1h");
/// assert_eq!(short_duration(10_000_000_000), "10s");
/// ```
pub fn short_duration(nanos: i64) -> String {
    let mut s = go_duration(nanos);
    if s.ends_with("m0s") {
        s.truncate(s.len() - 2);
    }
    if s.ends_with("h0m") {
        s.truncate(s.len() - 2);
    }
    s
}

/// Fixed notation with a single decimal, e.g. `0.5`. Non-finite values render as `NaN`,
/// `+Inf` and `-Inf`.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::from("NaN")
    } else if v.is_infinite() {
        String::from(if v > 0.0 { "+Inf" } else { "-Inf" })
    } else {
        format!("{:.1}", v)
    }
}
