//! Integer weights computed from a base value and conditional multipliers.

use database::value::{FixedPoint, parse_number};
use database::{Catalog, ConfigContext, DataError};
use markup::{Element, PropertyNode, ScopeNode};

use crate::error::ScriptError;
use crate::script::{Conditions, Context, ScopeType, View, line};

/// A multiplier applied when its conditions hold.
pub struct FactorModifier<S: ScopeType> {
    pub multiplier: FixedPoint,
    pub conditions: Conditions<S>,
}

/// `weight = { base = 10 modifier = { factor = 0.5 has_flag = at_war } }`
///
/// Qualifying modifiers compound in declaration order and the result is
/// truncated to an integer.
pub struct Factor<S: ScopeType> {
    base_value: i64,
    modifiers: Vec<FactorModifier<S>>,
}

impl<S: ScopeType> Factor<S> {
    pub fn constant(base_value: i64) -> Result<Self, DataError> {
        let factor = Self {
            base_value,
            modifiers: Vec::new(),
        };
        factor.validate()?;
        Ok(factor)
    }

    pub fn from_scope(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<Self, DataError> {
        let mut factor = Self {
            base_value: 0,
            modifiers: Vec::new(),
        };

        for element in &scope.elements {
            match element {
                Element::Property(property) if property.key == "base" => {
                    factor.base_value = parse_number(&property.key, &property.value)?;
                }
                Element::Scope(child) if child.tag == "modifier" => {
                    factor.modifiers.push(Self::modifier(child, context)?);
                }
                Element::Property(property) => {
                    return Err(DataError::UnknownProperty {
                        class: "factor",
                        key: property.key.clone(),
                    });
                }
                Element::Scope(child) => {
                    return Err(DataError::UnknownScope {
                        class: "factor",
                        tag: child.tag.clone(),
                    });
                }
            }
        }

        factor.validate()?;
        Ok(factor)
    }

    fn modifier(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<FactorModifier<S>, DataError> {
        let mut multiplier = FixedPoint::ZERO;
        let mut conditions = Conditions::new();

        for element in &scope.elements {
            match element {
                Element::Property(property) if property.key == "factor" => {
                    multiplier = FixedPoint::parse_value(&property.key, &property.value)?;
                }
                Element::Property(property) => conditions.process_property(property, context)?,
                Element::Scope(child) => conditions.process_scope(child, context)?,
            }
        }

        Ok(FactorModifier {
            multiplier,
            conditions,
        })
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.base_value == 0 {
            return Err(DataError::Invalid("factor: base value must not be zero".into()));
        }
        if FixedPoint::checked_from_int(self.base_value).is_none() {
            return Err(DataError::Invalid(format!(
                "factor: base value {} is out of range",
                self.base_value
            )));
        }
        if self.modifiers.iter().any(|modifier| modifier.multiplier.is_zero()) {
            return Err(DataError::Invalid("factor: modifier factor must not be zero".into()));
        }
        Ok(())
    }

    pub fn base_value(&self) -> i64 {
        self.base_value
    }

    pub fn modifiers(&self) -> &[FactorModifier<S>] {
        &self.modifiers
    }

    pub fn calculate(&self, target: S::Ref, context: &Context, view: View<'_>) -> Result<i64, ScriptError> {
        let mut value = FixedPoint::from_int(self.base_value);
        for modifier in &self.modifiers {
            if modifier.conditions.evaluate(target, context, view)? {
                value = value * modifier.multiplier;
            }
        }
        Ok(value.to_int())
    }

    pub fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.modifiers
            .iter()
            .try_for_each(|modifier| modifier.conditions.check(data))
    }

    pub fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let mut lines = vec![line(indent, prefix, format!("Base: {}", self.base_value))];
        for modifier in &self.modifiers {
            lines.push(modifier.conditions.headed_description(
                &format!("x{} if:", modifier.multiplier),
                data,
                indent,
                prefix,
            ));
        }
        lines.retain(|text| !text.is_empty());
        lines.join("\n")
    }
}

/// Weight of a random pick: a plain number (zero allowed) or a factor.
pub enum Weight<S: ScopeType> {
    Constant(i64),
    Factor(Factor<S>),
}

impl<S: ScopeType> Weight<S> {
    pub fn from_property(property: &PropertyNode) -> Result<Self, DataError> {
        Ok(Self::Constant(parse_number(&property.key, &property.value)?))
    }

    pub fn from_scope(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<Self, DataError> {
        Ok(Self::Factor(Factor::from_scope(scope, context)?))
    }

    pub fn value(&self, target: S::Ref, context: &Context, view: View<'_>) -> Result<i64, ScriptError> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::Factor(factor) => factor.calculate(target, context, view),
        }
    }

    pub fn check(&self, data: &Catalog) -> Result<(), DataError> {
        match self {
            Self::Constant(_) => Ok(()),
            Self::Factor(factor) => factor.check(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::FactionScope;

    #[test]
    fn base_value_must_fit_the_fixed_point_range() {
        assert!(Factor::<FactionScope>::constant(0).is_err());
        assert!(Factor::<FactionScope>::constant(1_000_000_000_000_000).is_err());
        assert_eq!(
            Factor::<FactionScope>::constant(900_000_000_000_000)
                .unwrap()
                .base_value(),
            900_000_000_000_000
        );
    }
}
