//! Score formulas.

use serde::{Deserialize, Serialize};

use super::{Category, Metric, ScoreSource};
use crate::error::{Error, Result};

fn one() -> f64 {
    1.0
}

/// An expression producing a raw dimension score.
///
/// Results are clamped into `[0, 5]` by the profile, not here, so blends
/// see the unclamped values of their terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// A fixed value.
    Constant {
        /// The value.
        value: f64,
    },

    /// `metric / divisor`; 0 when the divisor is 0.
    Scaled {
        /// Input to read.
        metric: Metric,
        /// Divisor applied to the input.
        #[serde(default = "one")]
        divisor: f64,
    },

    /// `rubric[item] / divisor`; the item must have been rated.
    RubricItem {
        /// Rubric item name.
        item: String,
        /// Divisor applied to the rating.
        #[serde(default = "one")]
        divisor: f64,
    },

    /// Sum of weighted terms.
    Blend {
        /// Terms to add up.
        terms: Vec<Term>,
    },

    /// Arithmetic mean of sub-formulas.
    Mean {
        /// Formulas to average.
        of: Vec<Formula>,
    },

    /// `then` if the categorical input equals `equals`, else `otherwise`.
    Choice {
        /// Categorical input.
        category: Category,
        /// Option key or label to compare against.
        equals: String,
        /// Value on a match.
        then: f64,
        /// Value otherwise.
        otherwise: f64,
    },
}

/// One weighted term of a [`Formula::Blend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Multiplier.
    pub weight: f64,
    /// Weighted formula.
    pub formula: Formula,
}

fn safe_div(numerator: f64, divisor: f64) -> f64 {
    if divisor == 0.0 || !divisor.is_finite() {
        return 0.0;
    }
    numerator / divisor
}

impl Formula {
    /// `metric / divisor`.
    pub fn scaled(metric: Metric, divisor: f64) -> Self {
        Formula::Scaled { metric, divisor }
    }

    /// `rubric[item] / divisor`.
    pub fn rubric_item(item: impl Into<String>, divisor: f64) -> Self {
        Formula::RubricItem {
            item: item.into(),
            divisor,
        }
    }

    /// Weighted sum of `(weight, formula)` pairs.
    pub fn blend<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = (f64, Formula)>,
    {
        Formula::Blend {
            terms: terms
                .into_iter()
                .map(|(weight, formula)| Term { weight, formula })
                .collect(),
        }
    }

    /// Mean of formulas.
    pub fn mean<I>(of: I) -> Self
    where
        I: IntoIterator<Item = Formula>,
    {
        Formula::Mean {
            of: of.into_iter().collect(),
        }
    }

    /// Threshold choice on a categorical input.
    pub fn choice(category: Category, equals: impl Into<String>, then: f64, otherwise: f64) -> Self {
        Formula::Choice {
            category,
            equals: equals.into(),
            then,
            otherwise,
        }
    }

    /// Evaluates the formula.
    ///
    /// # Errors
    ///
    /// Returns a scoring error if a referenced rubric item was not rated.
    pub fn evaluate(&self, source: &dyn ScoreSource) -> Result<f64> {
        match self {
            Formula::Constant { value } => Ok(*value),
            Formula::Scaled { metric, divisor } => Ok(safe_div(source.metric(*metric), *divisor)),
            Formula::RubricItem { item, divisor } => {
                let rating = source
                    .rubric(item)
                    .ok_or_else(|| Error::scoring(format!("rubric item '{item}' was not rated")))?;
                Ok(safe_div(rating, *divisor))
            }
            Formula::Blend { terms } => terms.iter().try_fold(0.0, |acc, term| {
                Ok::<_, Error>(acc + term.weight * term.formula.evaluate(source)?)
            }),
            Formula::Mean { of } => {
                if of.is_empty() {
                    return Ok(0.0);
                }
                let sum = of
                    .iter()
                    .try_fold(0.0, |acc, f| Ok::<_, Error>(acc + f.evaluate(source)?))?;
                Ok(sum / of.len() as f64)
            }
            Formula::Choice {
                category,
                equals,
                then,
                otherwise,
            } => {
                let matched = category.option_key(equals) == Some(source.category(*category));
                Ok(if matched { *then } else { *otherwise })
            }
        }
    }

    /// Checks numeric constants and option names; `profile` names the
    /// profile in errors.
    pub fn check(&self, profile: &str) -> Result<()> {
        let finite = |value: f64, what: &str| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(Error::profile(profile, format!("{what} must be a finite number")))
            }
        };
        match self {
            Formula::Constant { value } => finite(*value, "constant"),
            Formula::Scaled { divisor, .. } | Formula::RubricItem { divisor, .. } => {
                finite(*divisor, "divisor")?;
                if let Formula::RubricItem { item, .. } = self {
                    if item.trim().is_empty() {
                        return Err(Error::profile(profile, "rubric item name is empty"));
                    }
                }
                Ok(())
            }
            Formula::Blend { terms } => {
                if terms.is_empty() {
                    return Err(Error::profile(profile, "blend needs at least one term"));
                }
                for term in terms {
                    finite(term.weight, "weight")?;
                    term.formula.check(profile)?;
                }
                Ok(())
            }
            Formula::Mean { of } => {
                if of.is_empty() {
                    return Err(Error::profile(profile, "mean needs at least one formula"));
                }
                of.iter().try_for_each(|f| f.check(profile))
            }
            Formula::Choice {
                category,
                equals,
                then,
                otherwise,
            } => {
                finite(*then, "then")?;
                finite(*otherwise, "otherwise")?;
                if category.option_key(equals).is_none() {
                    return Err(Error::profile(
                        profile,
                        format!("'{equals}' is not an option of {category:?}"),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Rubric items the formula reads, in first-use order.
    pub fn rubric_items(&self) -> Vec<&str> {
        let mut items = Vec::new();
        self.collect_rubric_items(&mut items);
        items
    }

    fn collect_rubric_items<'a>(&'a self, items: &mut Vec<&'a str>) {
        match self {
            Formula::RubricItem { item, .. } => {
                if !items.contains(&item.as_str()) {
                    items.push(item);
                }
            }
            Formula::Blend { terms } => {
                for term in terms {
                    term.formula.collect_rubric_items(items);
                }
            }
            Formula::Mean { of } => {
                for f in of {
                    f.collect_rubric_items(items);
                }
            }
            Formula::Constant { .. } | Formula::Scaled { .. } | Formula::Choice { .. } => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Fixed;

    impl ScoreSource for Fixed {
        fn metric(&self, metric: Metric) -> f64 {
            match metric {
                Metric::ScoringEffectiveness => 60.0,
                Metric::MatchControl => 4.0,
                _ => 0.0,
            }
        }

        fn category(&self, _category: Category) -> &'static str {
            "moderate"
        }

        fn rubric(&self, item: &str) -> Option<f64> {
            (item == "kicking").then_some(5.0)
        }
    }

    #[test]
    fn test_scaled_zero_divisor_is_zero() {
        let f = Formula::scaled(Metric::ScoringEffectiveness, 0.0);
        assert_eq!(f.evaluate(&Fixed).unwrap(), 0.0);
    }

    #[test]
    fn test_blend() {
        let f = Formula::blend([
            (0.5, Formula::scaled(Metric::ScoringEffectiveness, 20.0)),
            (0.5, Formula::scaled(Metric::MatchControl, 5.0)),
        ]);
        assert!((f.evaluate(&Fixed).unwrap() - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_mean() {
        let f = Formula::mean([
            Formula::Constant { value: 1.0 },
            Formula::Constant { value: 4.0 },
        ]);
        assert_eq!(f.evaluate(&Fixed).unwrap(), 2.5);
        assert_eq!(Formula::Mean { of: vec![] }.evaluate(&Fixed).unwrap(), 0.0);
    }

    #[test]
    fn test_choice_accepts_label() {
        let f = Formula::choice(Category::Consistency, "Moderate (中等)", 4.0, 1.0);
        assert_eq!(f.evaluate(&Fixed).unwrap(), 4.0);
        let f = Formula::choice(Category::Consistency, "high", 4.0, 1.0);
        assert_eq!(f.evaluate(&Fixed).unwrap(), 1.0);
    }

    #[test]
    fn test_missing_rubric_item_errors() {
        let f = Formula::rubric_item("footwork", 1.0);
        let err = f.evaluate(&Fixed).unwrap_err();
        assert!(err.to_string().contains("footwork"));
        assert_eq!(
            Formula::rubric_item("kicking", 1.0).evaluate(&Fixed).unwrap(),
            5.0
        );
    }

    #[test]
    fn test_check_rejects_bad_option() {
        let f = Formula::choice(Category::Consistency, "superb", 4.0, 1.0);
        assert!(f.check("p").is_err());
    }

    #[test]
    fn test_check_rejects_non_finite() {
        let f = Formula::blend([(f64::NAN, Formula::Constant { value: 1.0 })]);
        assert!(f.check("p").is_err());
        assert!(Formula::Blend { terms: vec![] }.check("p").is_err());
    }

    #[test]
    fn test_rubric_items_deduplicated() {
        let f = Formula::mean([
            Formula::rubric_item("a", 1.0),
            Formula::blend([(1.0, Formula::rubric_item("b", 1.0))]),
            Formula::rubric_item("a", 1.0),
        ]);
        assert_eq!(f.rubric_items(), vec!["a", "b"]);
    }

    #[test]
    fn test_formula_from_toml() {
        let f: Formula = toml::from_str(
            r#"
            kind = "blend"
            terms = [
                { weight = 0.5, formula = { kind = "scaled", metric = "scoring_effectiveness", divisor = 20.0 } },
                { weight = 0.5, formula = { kind = "scaled", metric = "match_control", divisor = 5.0 } },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(
            f,
            Formula::blend([
                (0.5, Formula::scaled(Metric::ScoringEffectiveness, 20.0)),
                (0.5, Formula::scaled(Metric::MatchControl, 5.0)),
            ])
        );
    }
}
