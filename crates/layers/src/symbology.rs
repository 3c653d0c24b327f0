//! Data-driven styling: the irradiance color ramp and numeric coalescing.
//!
//! Every value here has two forms: a Rust-side evaluation (used for popups,
//! legends and tests) and the equivalent style expression handed to the map
//! engine. Both must agree, so they are built from the same stop list.

use foundation::Color;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One `(threshold, color)` anchor of a [`ColorRamp`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub value: f64,
    pub color: Color,
}

impl Breakpoint {
    pub const fn new(value: f64, color: Color) -> Self {
        Self { value, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RampError {
    Empty,
    NonFinite { index: usize },
    NotAscending { index: usize },
}

impl std::fmt::Display for RampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RampError::Empty => write!(f, "color ramp needs at least one breakpoint"),
            RampError::NonFinite { index } => {
                write!(f, "breakpoint {index} has a non-finite threshold")
            }
            RampError::NotAscending { index } => {
                write!(f, "breakpoint {index} is not strictly above the previous one")
            }
        }
    }
}

impl std::error::Error for RampError {}

/// Piecewise-linear color ramp over strictly ascending thresholds.
///
/// Inputs below the first threshold take the first color, inputs at or above
/// the last threshold take the last color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct ColorRamp {
    stops: Vec<Breakpoint>,
}

impl ColorRamp {
    pub fn new(stops: Vec<Breakpoint>) -> Result<Self, RampError> {
        if stops.is_empty() {
            return Err(RampError::Empty);
        }
        for (index, stop) in stops.iter().enumerate() {
            if !stop.value.is_finite() {
                return Err(RampError::NonFinite { index });
            }
            if index > 0 && stop.value <= stops[index - 1].value {
                return Err(RampError::NotAscending { index });
            }
        }
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[Breakpoint] {
        &self.stops
    }

    pub fn color_at(&self, value: f64) -> Color {
        let value = if value.is_nan() { 0.0 } else { value };
        // Non-empty by construction.
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if value <= first.value {
            return first.color;
        }
        if value >= last.value {
            return last.color;
        }
        // First stop strictly above `value`; its predecessor brackets from below.
        let upper = self.stops.partition_point(|s| s.value <= value);
        let lo = self.stops[upper - 1];
        let hi = self.stops[upper];
        let t = (value - lo.value) / (hi.value - lo.value);
        lo.color.lerp(hi.color, t)
    }

    /// Evaluates a raw feature property the way the style expression does.
    pub fn evaluate(&self, raw: Option<&Value>) -> Color {
        self.color_at(coalesce_number(raw))
    }

    /// `["interpolate", ["linear"], <coalesced property>, v0, c0, v1, c1, ...]`
    pub fn to_expression(&self, property: &str) -> Value {
        let mut expr = vec![
            json!("interpolate"),
            json!(["linear"]),
            numeric_property(property),
        ];
        for stop in &self.stops {
            expr.push(json!(stop.value));
            expr.push(json!(stop.color.to_hex()));
        }
        Value::Array(expr)
    }
}

impl TryFrom<Vec<Breakpoint>> for ColorRamp {
    type Error = RampError;

    fn try_from(stops: Vec<Breakpoint>) -> Result<Self, Self::Error> {
        ColorRamp::new(stops)
    }
}

impl From<ColorRamp> for Vec<Breakpoint> {
    fn from(ramp: ColorRamp) -> Self {
        ramp.stops
    }
}

/// `["coalesce", ["to-number", ["get", property]], 0]`
pub fn numeric_property(property: &str) -> Value {
    json!(["coalesce", ["to-number", ["get", property]], 0])
}

/// Numeric value of a raw property, with everything unusable mapped to 0.
///
/// Numbers pass through, numeric strings are parsed, booleans become 1/0.
/// Missing, null, unparseable and non-finite values all yield 0.
pub fn coalesce_number(raw: Option<&Value>) -> f64 {
    let n = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    fn ramp() -> ColorRamp {
        ColorRamp::new(vec![
            Breakpoint::new(0.0, hex("#0d0d0d")),
            Breakpoint::new(300_000.0, hex("#4b0082")),
            Breakpoint::new(800_000.0, hex("#800080")),
            Breakpoint::new(1_000_000.0, hex("#ff8c00")),
            Breakpoint::new(1_400_000.0, hex("#ffe066")),
        ])
        .unwrap()
    }

    #[test]
    fn clamps_below_first_and_above_last() {
        let r = ramp();
        assert_eq!(r.color_at(-5.0), hex("#0d0d0d"));
        assert_eq!(r.color_at(f64::NEG_INFINITY), hex("#0d0d0d"));
        assert_eq!(r.color_at(1_400_000.0), hex("#ffe066"));
        assert_eq!(r.color_at(9e12), hex("#ffe066"));
    }

    #[test]
    fn interior_breakpoints_are_exact() {
        let r = ramp();
        for stop in r.stops() {
            assert_eq!(r.color_at(stop.value), stop.color);
        }
    }

    #[test]
    fn blends_between_brackets() {
        let r = ramp();
        // Halfway between #800080 and #ff8c00.
        assert_eq!(r.color_at(900_000.0), Color::rgb(0xc0, 0x46, 0x40));
    }

    #[test]
    fn single_stop_ramp_is_constant() {
        let r = ColorRamp::new(vec![Breakpoint::new(5.0, hex("#123456"))]).unwrap();
        assert_eq!(r.color_at(-1.0), hex("#123456"));
        assert_eq!(r.color_at(5.0), hex("#123456"));
        assert_eq!(r.color_at(99.0), hex("#123456"));
    }

    #[test]
    fn rejects_bad_stop_lists() {
        assert_eq!(ColorRamp::new(vec![]), Err(RampError::Empty));
        let dup = vec![
            Breakpoint::new(1.0, hex("#000")),
            Breakpoint::new(1.0, hex("#fff")),
        ];
        assert_eq!(ColorRamp::new(dup), Err(RampError::NotAscending { index: 1 }));
        let nan = vec![Breakpoint::new(f64::NAN, hex("#000"))];
        assert_eq!(ColorRamp::new(nan), Err(RampError::NonFinite { index: 0 }));
    }

    #[test]
    fn missing_or_non_numeric_coalesces_to_zero() {
        assert_eq!(coalesce_number(None), 0.0);
        assert_eq!(coalesce_number(Some(&Value::Null)), 0.0);
        assert_eq!(coalesce_number(Some(&json!("n/a"))), 0.0);
        assert_eq!(coalesce_number(Some(&json!([1, 2]))), 0.0);
        assert_eq!(coalesce_number(Some(&json!({"v": 1}))), 0.0);
        assert_eq!(coalesce_number(Some(&json!(" 12.5 "))), 12.5);
        assert_eq!(coalesce_number(Some(&json!(true))), 1.0);
        assert_eq!(coalesce_number(Some(&json!(950000))), 950000.0);
    }

    #[test]
    fn unusable_input_renders_zero_color() {
        let r = ramp();
        assert_eq!(r.evaluate(None), r.color_at(0.0));
        assert_eq!(r.evaluate(Some(&json!("abc"))), r.color_at(0.0));
        assert_eq!(r.color_at(f64::NAN), r.color_at(0.0));
    }

    #[test]
    fn expression_matches_stop_list() {
        let expr = ColorRamp::new(vec![
            Breakpoint::new(0.0, hex("#0d0d0d")),
            Breakpoint::new(300_000.0, hex("#4b0082")),
        ])
        .unwrap()
        .to_expression("global_roof_mean");
        assert_eq!(
            expr,
            json!([
                "interpolate",
                ["linear"],
                ["coalesce", ["to-number", ["get", "global_roof_mean"]], 0],
                0.0,
                "#0d0d0d",
                300000.0,
                "#4b0082"
            ])
        );
    }

    #[test]
    fn ramp_deserializes_and_validates() {
        let ok: ColorRamp = serde_json::from_value(json!([
            {"value": 0, "color": "#000000"},
            {"value": 10, "color": "#ffffff"}
        ]))
        .unwrap();
        assert_eq!(ok.stops().len(), 2);
        let bad = serde_json::from_value::<ColorRamp>(json!([
            {"value": 10, "color": "#000000"},
            {"value": 0, "color": "#ffffff"}
        ]));
        assert!(bad.is_err());
    }
}
