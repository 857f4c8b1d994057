//! printf-style formatting of a single value.
//!
//! Supports `%[flags][width][.precision]conv` with the flags `- + space 0 #`
//! and the conversions `d i o x X` (integers), `e E f F g G` (doubles) and
//! `s S` (strings). Length modifiers (`h`, `l`, `L`, `q`) are accepted and
//! ignored. Text after the conversion is copied literally.

use crate::core::{ScriptError, ScriptResult};

/// Value class a format expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    Int,
    Double,
    String,
}

/// Which kind of value `spec` formats, chosen by the conversion characters
/// it contains.
pub fn format_kind(spec: &str) -> ScriptResult<FormatKind> {
    if spec.contains(|c| "DdIiOoXx".contains(c)) {
        Ok(FormatKind::Int)
    } else if spec.contains(|c| "EeFfGg".contains(c)) {
        Ok(FormatKind::Double)
    } else if spec.contains(|c| "Ss".contains(c)) {
        Ok(FormatKind::String)
    } else {
        Err(ScriptError::Format(spec.to_string()))
    }
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
    conv: char,
    suffix: String,
}

fn parse_spec(format: &str) -> ScriptResult<Spec> {
    let bad = || ScriptError::Format(format.to_string());
    // a leading '%' is optional, any others are dropped
    let cleaned: String = format.chars().filter(|&c| c != '%').collect();
    let mut chars = cleaned.chars().peekable();
    let mut spec = Spec::default();
    while let Some(&c) = chars.peek() {
        match c {
            '-' => spec.left = true,
            '+' => spec.plus = true,
            ' ' => spec.space = true,
            '0' => spec.zero = true,
            '#' => spec.alt = true,
            _ => break,
        }
        chars.next();
    }
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        spec.width = push_digit(spec.width, d).ok_or_else(bad)?;
        chars.next();
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        let mut p = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            p = push_digit(p, d).ok_or_else(bad)?;
            chars.next();
        }
        spec.precision = Some(p);
    }
    while matches!(chars.peek(), Some('h' | 'l' | 'L' | 'q')) {
        chars.next();
    }
    spec.conv = chars.next().ok_or_else(bad)?;
    if !"diouxXeEfFgGsS".contains(spec.conv) {
        return Err(bad());
    }
    spec.suffix = chars.collect();
    Ok(spec)
}

/// Widths and precisions past this are rejected rather than padded.
const MAX_WIDTH: usize = 1 << 16;

fn push_digit(n: usize, d: u32) -> Option<usize> {
    n.checked_mul(10)?
        .checked_add(d as usize)
        .filter(|&n| n <= MAX_WIDTH)
}

fn pad(spec: &Spec, sign: &str, body: &str, numeric: bool) -> String {
    let len = sign.chars().count() + body.chars().count();
    let fill = spec.width.saturating_sub(len);
    let mut out = String::with_capacity(len + fill + spec.suffix.len());
    if spec.left {
        out.push_str(sign);
        out.push_str(body);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero && numeric {
        out.push_str(sign);
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(body);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(sign);
        out.push_str(body);
    }
    out.push_str(&spec.suffix);
    out
}

fn sign_of(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

/// Format an integer.
pub fn format_int(format: &str, value: i64) -> ScriptResult<String> {
    let mut spec = parse_spec(format)?;
    let magnitude = value.unsigned_abs();
    let (prefix, mut digits) = match spec.conv {
        'd' | 'i' | 'u' => ("", magnitude.to_string()),
        'o' => (if spec.alt { "0" } else { "" }, format!("{magnitude:o}")),
        'x' => (if spec.alt { "0x" } else { "" }, format!("{magnitude:x}")),
        'X' => (if spec.alt { "0X" } else { "" }, format!("{magnitude:X}")),
        _ => return Err(ScriptError::Format(format.to_string())),
    };
    if let Some(p) = spec.precision {
        spec.zero = false;
        if digits.len() < p {
            digits = format!("{}{digits}", "0".repeat(p - digits.len()));
        }
    }
    let sign = format!("{}{prefix}", sign_of(&spec, value < 0));
    Ok(pad(&spec, &sign, &digits, true))
}

/// `1.5e3` style exponent rewritten the C way: `1.5e+03`.
fn c_exponent(rust: &str, upper: bool) -> String {
    let (mantissa, exp) = rust.split_once('e').unwrap_or((rust, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{:02}", exp.unsigned_abs())
}

fn strip_trailing_zeros(s: &str) -> String {
    let (number, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    };
    if !number.contains('.') {
        return s.to_string();
    }
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{number}{exponent}")
}

/// Format a double.
pub fn format_double(format: &str, value: f64) -> ScriptResult<String> {
    let spec = parse_spec(format)?;
    let upper = spec.conv.is_ascii_uppercase();
    let magnitude = value.abs();
    let body = if !magnitude.is_finite() {
        let s = if magnitude.is_nan() { "nan" } else { "inf" };
        if upper {
            s.to_uppercase()
        } else {
            s.to_string()
        }
    } else {
        let precision = spec.precision.unwrap_or(6);
        match spec.conv {
            'f' | 'F' => format!("{magnitude:.precision$}"),
            'e' | 'E' => c_exponent(&format!("{magnitude:.precision$e}"), upper),
            'g' | 'G' => {
                let p = precision.max(1);
                let probe = format!("{magnitude:.prec$e}", prec = p - 1);
                let exp: i64 = probe
                    .split_once('e')
                    .and_then(|(_, e)| e.parse().ok())
                    .unwrap_or(0);
                let s = if exp < -4 || exp >= p as i64 {
                    c_exponent(&probe, upper)
                } else {
                    let decimals = (p as i64 - 1 - exp).max(0) as usize;
                    format!("{magnitude:.decimals$}")
                };
                if spec.alt {
                    s
                } else {
                    strip_trailing_zeros(&s)
                }
            }
            _ => return Err(ScriptError::Format(format.to_string())),
        }
    };
    let sign = sign_of(&spec, value.is_sign_negative() && !value.is_nan() && value != 0.0);
    Ok(pad(&spec, sign, &body, magnitude.is_finite()))
}

/// Format a string.
pub fn format_str(format: &str, value: &str) -> ScriptResult<String> {
    let spec = parse_spec(format)?;
    if !matches!(spec.conv, 's' | 'S') {
        return Err(ScriptError::Format(format.to_string()));
    }
    let body: String = match spec.precision {
        Some(p) => value.chars().take(p).collect(),
        None => value.to_string(),
    };
    Ok(pad(&spec, "", &body, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_selection() {
        assert_eq!(format_kind("%03d"), Ok(FormatKind::Int));
        assert_eq!(format_kind(".2f"), Ok(FormatKind::Double));
        assert_eq!(format_kind("%-5s"), Ok(FormatKind::String));
        assert_eq!(format_kind("%q"), Err(ScriptError::Format("%q".into())));
    }

    #[test]
    fn test_integers() {
        assert_eq!(format_int("%03d", 7).unwrap(), "007");
        assert_eq!(format_int("%+d", 5).unwrap(), "+5");
        assert_eq!(format_int("%5d", -42).unwrap(), "  -42");
        assert_eq!(format_int("%-4d|", 3).unwrap(), "3   |");
        assert_eq!(format_int("%x", 255).unwrap(), "ff");
        assert_eq!(format_int("%#X", 255).unwrap(), "0XFF");
        assert_eq!(format_int("%o", 8).unwrap(), "10");
        assert_eq!(format_int("%.3d", 5).unwrap(), "005");
    }

    #[test]
    fn test_oversized_width_is_format_error() {
        let huge = "%99999999999999999999999d";
        assert_eq!(format_int(huge, 1), Err(ScriptError::Format(huge.into())));
        assert!(format_double("%.99999999999999999999999f", 1.0).is_err());
        assert!(format_str("%1000000s", "x").is_err());
        assert_eq!(format_int("%65536d", 1).unwrap().len(), 65536);
    }

    #[test]
    fn test_doubles() {
        assert_eq!(format_double("%.2f", 3.14159).unwrap(), "3.14");
        assert_eq!(format_double("%f", 1.5).unwrap(), "1.500000");
        assert_eq!(format_double("%e", 1500.0).unwrap(), "1.500000e+03");
        assert_eq!(format_double("%.1E", 0.00012).unwrap(), "1.2E-04");
        assert_eq!(format_double("%g", 0.0001).unwrap(), "0.0001");
        assert_eq!(format_double("%g", 1234567.0).unwrap(), "1.23457e+06");
        assert_eq!(format_double("%g", 100.0).unwrap(), "100");
        assert_eq!(format_double("%08.3f", -1.5).unwrap(), "-001.500");
    }

    #[test]
    fn test_strings() {
        assert_eq!(format_str("%5s", "ab").unwrap(), "   ab");
        assert_eq!(format_str("%-5s|", "ab").unwrap(), "ab   |");
        assert_eq!(format_str("%.2s", "abc").unwrap(), "ab");
    }
}
