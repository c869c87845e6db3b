//! Lenient readers for TOML config tables.
//!
//! Each helper returns `default` when the key is absent and logs a warning
//! when it is present but unusable, so a bad value never fails a config load.

use tracing::warn;

/// Finite number; TOML integers are accepted as well as floats.
pub fn param_f64(table: Option<&toml::Value>, key: &str, default: f64) -> f64 {
    let Some(raw) = table.and_then(|t| t.get(key)) else {
        return default;
    };
    let parsed = raw.as_float().or_else(|| raw.as_integer().map(|v| v as f64));
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => {
            warn!(key, value = %raw, default, "Malformed number in config, using default");
            default
        }
    }
}

/// Strictly positive integer.
pub fn param_usize(table: Option<&toml::Value>, key: &str, default: usize) -> usize {
    let Some(raw) = table.and_then(|t| t.get(key)) else {
        return default;
    };
    match raw.as_integer() {
        Some(v) if v > 0 => v as usize,
        _ => {
            warn!(key, value = %raw, default, "Malformed period in config, using default");
            default
        }
    }
}

pub fn param_bool(table: Option<&toml::Value>, key: &str, default: bool) -> bool {
    let Some(raw) = table.and_then(|t| t.get(key)) else {
        return default;
    };
    raw.as_bool().unwrap_or_else(|| {
        warn!(key, value = %raw, default, "Malformed flag in config, using default");
        default
    })
}

pub fn positive_f64(table: Option<&toml::Value>, key: &str, default: f64) -> f64 {
    let v = param_f64(table, key, default);
    if v > 0.0 {
        v
    } else {
        warn!(key, value = v, default, "Value must be positive, using default");
        default
    }
}

pub fn non_negative_f64(table: Option<&toml::Value>, key: &str, default: f64) -> f64 {
    let v = param_f64(table, key, default);
    if v >= 0.0 {
        v
    } else {
        warn!(key, value = v, default, "Value must not be negative, using default");
        default
    }
}

/// Non-negative integer (zero allowed).
pub fn param_count(table: Option<&toml::Value>, key: &str, default: u64) -> u64 {
    let Some(raw) = table.and_then(|t| t.get(key)) else {
        return default;
    };
    match raw.as_integer() {
        Some(v) if v >= 0 => v as u64,
        _ => {
            warn!(key, value = %raw, default, "Malformed count in config, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(src: &str) -> toml::Value {
        toml::Value::Table(toml::from_str::<toml::Table>(src).unwrap())
    }

    #[test]
    fn missing_section_uses_defaults() {
        assert_eq!(param_f64(None, "x", 1.5), 1.5);
        assert_eq!(param_usize(None, "x", 3), 3);
        assert!(param_bool(None, "x", true));
        assert_eq!(param_count(None, "x", 4), 4);
    }

    #[test]
    fn numbers_accept_integers() {
        let t = table("a = 2\nb = 2.5");
        assert_eq!(param_f64(Some(&t), "a", 0.0), 2.0);
        assert_eq!(param_f64(Some(&t), "b", 0.0), 2.5);
    }

    #[test]
    fn wrong_types_fall_back() {
        let t = table("a = \"x\"\nb = 1.5\nc = 1");
        assert_eq!(param_f64(Some(&t), "a", 9.0), 9.0);
        assert_eq!(param_usize(Some(&t), "b", 7), 7);
        assert!(!param_bool(Some(&t), "c", false));
    }

    #[test]
    fn range_checks() {
        let t = table("zero = 0\nneg = -2.0");
        assert_eq!(param_usize(Some(&t), "zero", 5), 5);
        assert_eq!(param_count(Some(&t), "zero", 5), 0);
        assert_eq!(positive_f64(Some(&t), "neg", 1.0), 1.0);
        assert_eq!(non_negative_f64(Some(&t), "neg", 0.5), 0.5);
    }
}
