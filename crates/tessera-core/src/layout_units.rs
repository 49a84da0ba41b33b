// crates/tessera-core/src/layout_units.rs
use std::fmt;

/// Marker for a length the algorithm could not determine.
pub const UNDEFINED: f32 = f32::NAN;

const EPSILON: f32 = 0.0001;

#[inline]
pub fn is_undefined(value: f32) -> bool {
    value.is_nan()
}

#[inline]
pub fn is_defined(value: f32) -> bool {
    !value.is_nan()
}

/// Larger of the two, or whichever one is defined.
#[inline]
pub fn max_or_defined(a: f32, b: f32) -> f32 {
    if is_defined(a) && is_defined(b) {
        a.max(b)
    } else if is_undefined(a) {
        b
    } else {
        a
    }
}

/// Smaller of the two, or whichever one is defined.
#[inline]
pub fn min_or_defined(a: f32, b: f32) -> f32 {
    if is_defined(a) && is_defined(b) {
        a.min(b)
    } else if is_undefined(a) {
        b
    } else {
        a
    }
}

/// Approximate equality where two undefined values compare equal.
#[inline]
pub fn inexact_equals(a: f32, b: f32) -> bool {
    if is_defined(a) && is_defined(b) {
        return (a - b).abs() < EPSILON;
    }
    is_undefined(a) && is_undefined(b)
}

#[inline]
pub fn inexact_equals_f64(a: f64, b: f64) -> bool {
    if !a.is_nan() && !b.is_nan() {
        return (a - b).abs() < EPSILON as f64;
    }
    a.is_nan() && b.is_nan()
}

/// A style length: absolute points, a percentage of a reference length,
/// `auto`, or unset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Auto,
    /// Fixed length in points
    Point(f32),
    /// Percentage of the reference length (0.0 to 100.0)
    Percent(f32),
}

impl Value {
    /// Points value; NaN or infinite input collapses to `Undefined`.
    pub fn points(value: f32) -> Self {
        if value.is_finite() {
            Value::Point(value)
        } else {
            Value::Undefined
        }
    }

    /// Percent value; NaN or infinite input collapses to `Undefined`.
    pub fn percent(value: f32) -> Self {
        if value.is_finite() {
            Value::Percent(value)
        } else {
            Value::Undefined
        }
    }

    /// Same value, with a non-finite point or percent length collapsed to
    /// `Undefined`.
    pub fn normalized(self) -> Self {
        match self {
            Value::Point(value) => Value::points(value),
            Value::Percent(value) => Value::percent(value),
            other => other,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Anything other than `Undefined`, including `Auto`.
    pub fn is_defined(&self) -> bool {
        !self.is_undefined()
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Value::Auto)
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, Value::Percent(_))
    }

    /// Resolve against a reference length. `None` unless the value is a
    /// point or percent length that yields a number.
    pub fn resolve(&self, reference: f32) -> Option<f32> {
        let resolved = match *self {
            Value::Point(value) => value,
            Value::Percent(value) => value * reference * 0.01,
            Value::Auto | Value::Undefined => return None,
        };
        if resolved.is_nan() {
            None
        } else {
            Some(resolved)
        }
    }

    /// Resolve, or `UNDEFINED` when resolution fails.
    pub fn resolve_or_undefined(&self, reference: f32) -> f32 {
        self.resolve(reference).unwrap_or(UNDEFINED)
    }

    /// Resolve, substituting `default` when resolution fails.
    pub fn resolve_or(&self, reference: f32, default: f32) -> f32 {
        self.resolve(reference).unwrap_or(default)
    }

    /// Resolve and clamp to at least `floor`. Falls back to `floor` when
    /// resolution fails.
    pub fn resolve_or_max(&self, reference: f32, floor: f32) -> f32 {
        max_or_defined(self.resolve_or_undefined(reference), floor)
    }

    /// Same unit and approximately the same magnitude.
    pub fn inexact_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Auto, Value::Auto) => true,
            (Value::Point(a), Value::Point(b)) | (Value::Percent(a), Value::Percent(b)) => {
                inexact_equals(*a, *b)
            }
            _ => false,
        }
    }

    /// Create from a string value (like "50%", "100px", "auto")
    pub fn from_string(value: &str) -> Option<Self> {
        let value = value.trim();

        match value {
            "auto" => return Some(Value::Auto),
            "undefined" => return Some(Value::Undefined),
            _ => {}
        }

        if let Some(pct) = value.strip_suffix('%') {
            return pct.parse::<f32>().ok().map(Value::percent);
        }

        if let Some(px) = value.strip_suffix("px") {
            return px.parse::<f32>().ok().map(Value::points);
        }

        // Plain numbers are points
        value.parse::<f32>().ok().map(Value::points)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::points(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Auto => write!(f, "auto"),
            Value::Point(value) => write!(f, "{value}"),
            Value::Percent(value) => write!(f, "{value}%"),
        }
    }
}
