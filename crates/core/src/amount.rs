//! Amount conditions -- operator + threshold comparisons over observed counts.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// The six comparison operators an amount condition may use.
///
/// Anything outside this set is a configuration error at parse time, never
/// a runtime fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
    Ne,
}

impl FromStr for CompareOp {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<CompareOp, ConfigError> {
        match s {
            "==" => Ok(CompareOp::Eq),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::Ge),
            "<=" => Ok(CompareOp::Le),
            "!=" => Ok(CompareOp::Ne),
            other => Err(ConfigError::UnknownOperator {
                op: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Ne => "!=",
        };
        write!(f, "{}", symbol)
    }
}

/// An operator plus integer threshold, evaluated against an observed
/// count or accumulated amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountCondition {
    pub op: CompareOp,
    pub threshold: i64,
}

impl Default for AmountCondition {
    /// Requirements that don't spell out an amount mean "at least one".
    fn default() -> AmountCondition {
        AmountCondition {
            op: CompareOp::Ge,
            threshold: 1,
        }
    }
}

impl AmountCondition {
    /// Parse an amount spec from a rule document.
    ///
    /// A bare integer `N` is sugar for `">= N"`. A string must be
    /// `"<op> <int>"` with any amount of surrounding or separating
    /// whitespace. Anything else fails with a `ConfigError`.
    pub fn parse(spec: &serde_json::Value) -> Result<AmountCondition, ConfigError> {
        match spec {
            serde_json::Value::Number(n) => {
                let threshold = n.as_i64().ok_or_else(|| ConfigError::InvalidAmount {
                    spec: spec.to_string(),
                })?;
                Ok(AmountCondition {
                    op: CompareOp::Ge,
                    threshold,
                })
            }
            serde_json::Value::String(s) => {
                let mut parts = s.split_whitespace();
                let (op, number) = match (parts.next(), parts.next(), parts.next()) {
                    (Some(op), Some(number), None) => (op, number),
                    _ => {
                        return Err(ConfigError::InvalidAmount { spec: s.clone() });
                    }
                };
                let op = op.parse::<CompareOp>()?;
                let threshold = number
                    .parse::<i64>()
                    .map_err(|_| ConfigError::InvalidAmount { spec: s.clone() })?;
                Ok(AmountCondition { op, threshold })
            }
            other => Err(ConfigError::InvalidAmount {
                spec: other.to_string(),
            }),
        }
    }

    /// Apply the operator to an observed amount. Pure and total.
    pub fn evaluate(&self, observed: i64) -> bool {
        match self.op {
            CompareOp::Eq => observed == self.threshold,
            CompareOp::Gt => observed > self.threshold,
            CompareOp::Lt => observed < self.threshold,
            CompareOp::Ge => observed >= self.threshold,
            CompareOp::Le => observed <= self.threshold,
            CompareOp::Ne => observed != self.threshold,
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_integer_is_at_least() {
        let sugar = AmountCondition::parse(&json!(3)).unwrap();
        let explicit = AmountCondition::parse(&json!(">= 3")).unwrap();
        assert_eq!(sugar, explicit);
        assert!(sugar.evaluate(3));
        assert!(sugar.evaluate(4));
        assert!(!sugar.evaluate(2));
    }

    #[test]
    fn whitespace_is_tolerated() {
        let cond = AmountCondition::parse(&json!("  ==   2 ")).unwrap();
        assert_eq!(cond.op, CompareOp::Eq);
        assert_eq!(cond.threshold, 2);
    }

    #[test]
    fn all_operators_evaluate() {
        let cases = [
            ("== 5", 5, true),
            ("== 5", 4, false),
            ("> 5", 6, true),
            ("> 5", 5, false),
            ("< 5", 4, true),
            ("< 5", 5, false),
            (">= 5", 5, true),
            (">= 5", 4, false),
            ("<= 5", 5, true),
            ("<= 5", 6, false),
            ("!= 5", 4, true),
            ("!= 5", 5, false),
        ];
        for (spec, observed, expected) in cases {
            let cond = AmountCondition::parse(&json!(spec)).unwrap();
            assert_eq!(cond.evaluate(observed), expected, "{} vs {}", spec, observed);
        }
    }

    #[test]
    fn unknown_operator_is_config_error() {
        let err = AmountCondition::parse(&json!("=> 5")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownOperator {
                op: "=>".to_string()
            }
        );
    }

    #[test]
    fn unparseable_threshold_is_config_error() {
        assert!(matches!(
            AmountCondition::parse(&json!(">= five")),
            Err(ConfigError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        assert!(matches!(
            AmountCondition::parse(&json!(">= 5 apples")),
            Err(ConfigError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn non_integer_shapes_are_rejected() {
        assert!(AmountCondition::parse(&json!(1.5)).is_err());
        assert!(AmountCondition::parse(&json!(["<", 5])).is_err());
        assert!(AmountCondition::parse(&json!(null)).is_err());
    }

    #[test]
    fn default_is_at_least_one() {
        let cond = AmountCondition::default();
        assert!(cond.evaluate(1));
        assert!(!cond.evaluate(0));
    }
}
