//! Number formatting: display units, decimals, separators, sign style.
//!
//! `format_number` is total: it never fails, and the default spec returns the
//! bare numeric string. Pipeline order is unit division -> decimals ->
//! grouping -> negative style -> prefix/suffix + unit label.

use num_format::{Locale, ToFormattedString};

use crate::config::{DisplayUnit, NegativeStyle, NumberFormat};

pub fn format_number(value: f64, spec: &NumberFormat) -> String {
    let scaled = value / spec.display_unit.divisor();
    let magnitude = scaled.abs();

    let body = match effective_decimals(scaled, spec) {
        Some(d) => fixed_point(magnitude, d, spec.use_grouping),
        None => free_form(magnitude, spec.use_grouping),
    };

    let negative = scaled < 0.0 && !is_zero_body(&body);
    let signed = match spec.negative_numbers {
        NegativeStyle::Minus => {
            if negative {
                format!("-{}", body)
            } else {
                body
            }
        }
        NegativeStyle::Parentheses => {
            if negative {
                format!("({})", body)
            } else {
                body
            }
        }
        // Sign stripped only; the caller applies the color.
        NegativeStyle::Red => body,
    };

    let mut out = String::new();
    out.push_str(&spec.prefix);
    out.push_str(&signed);
    out.push_str(&spec.suffix);
    if spec.display_unit_label {
        let label = spec.display_unit.label();
        if !label.is_empty() {
            out.push(' ');
            out.push_str(label);
        }
    }
    out
}

/// Explicit decimals win. When unit division leaves a meaningful fractional
/// remainder and decimals was left unset, auto-widen to 2. `None` means
/// free-form (bare numeric string).
fn effective_decimals(scaled: f64, spec: &NumberFormat) -> Option<usize> {
    if let Some(d) = spec.decimals {
        return Some(d as usize);
    }
    if spec.display_unit != DisplayUnit::None && (scaled - scaled.trunc()).abs() > 1e-9 {
        return Some(2);
    }
    None
}

fn fixed_point(magnitude: f64, decimals: usize, grouping: bool) -> String {
    let s = format!("{:.*}", decimals, magnitude);
    if grouping {
        group_integer_part(&s)
    } else {
        s
    }
}

fn free_form(magnitude: f64, grouping: bool) -> String {
    let s = format!("{}", magnitude);
    if grouping {
        group_integer_part(&s)
    } else {
        s
    }
}

/// Apply locale thousands grouping to the integer part of a formatted number.
fn group_integer_part(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let grouped = match int_part.parse::<u128>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

/// True when a formatted body rounds to exactly zero (avoids "-0.00").
fn is_zero_body(body: &str) -> bool {
    body.chars().all(|c| matches!(c, '0' | '.' | ','))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> NumberFormat {
        NumberFormat::default()
    }

    #[test]
    fn test_bare_default() {
        assert_eq!(format_number(1234.0, &spec()), "1234");
        assert_eq!(format_number(12.5, &spec()), "12.5");
        assert_eq!(format_number(-7.0, &spec()), "-7");
    }

    #[test]
    fn test_millions_with_label_auto_widens() {
        let f = NumberFormat {
            display_unit: DisplayUnit::Millions,
            display_unit_label: true,
            ..spec()
        };
        assert_eq!(format_number(1_234_000.0, &f), "1.23 M");
    }

    #[test]
    fn test_integral_unit_division_stays_whole() {
        let f = NumberFormat {
            display_unit: DisplayUnit::Thousands,
            display_unit_label: true,
            ..spec()
        };
        assert_eq!(format_number(5000.0, &f), "5 K");
    }

    #[test]
    fn test_hundreds_has_no_label() {
        let f = NumberFormat {
            display_unit: DisplayUnit::Hundreds,
            display_unit_label: true,
            ..spec()
        };
        assert_eq!(format_number(500.0, &f), "5");
    }

    #[test]
    fn test_explicit_decimals() {
        let f = NumberFormat {
            decimals: Some(2),
            ..spec()
        };
        assert_eq!(format_number(3.14159, &f), "3.14");
        assert_eq!(format_number(3.0, &f), "3.00");
    }

    #[test]
    fn test_grouping() {
        let f = NumberFormat {
            use_grouping: true,
            ..spec()
        };
        assert_eq!(format_number(1_234_567.0, &f), "1,234,567");
    }

    #[test]
    fn test_parentheses_strip_sign() {
        let f = NumberFormat {
            negative_numbers: NegativeStyle::Parentheses,
            ..spec()
        };
        assert_eq!(format_number(-1234.0, &f), "(1234)");
        assert_eq!(format_number(1234.0, &f), "1234");
    }

    #[test]
    fn test_red_strips_sign_only() {
        let f = NumberFormat {
            negative_numbers: NegativeStyle::Red,
            ..spec()
        };
        assert_eq!(format_number(-42.0, &f), "42");
    }

    #[test]
    fn test_prefix_suffix_order() {
        let f = NumberFormat {
            prefix: "$".into(),
            suffix: " USD".into(),
            use_grouping: true,
            negative_numbers: NegativeStyle::Parentheses,
            ..spec()
        };
        assert_eq!(format_number(-1500.0, &f), "$(1,500) USD");
    }

    #[test]
    fn test_no_negative_zero() {
        let f = NumberFormat {
            decimals: Some(1),
            ..spec()
        };
        assert_eq!(format_number(-0.01, &f), "0.0");
    }
}
