//! Conditions: boolean predicates over a scope.
//!
//! A condition list is an implicit AND. `or` and `not` nest further lists.
//! Numeric conditions take a comparison operator (`=` and `==` both mean
//! equality) which is checked when the condition is built.

mod common;
mod faction;
mod unit;

use std::collections::HashMap;

use database::value::parse_number;
use database::{Catalog, ConfigContext, DataError};
use markup::{Element, Operator, PropertyNode, ScopeNode};

pub use common::{AndCondition, NotCondition, OrCondition, ScopeCondition, TickCondition};
pub use faction::{
    CurrentFactionCondition, HasFlagCondition, ResourceCondition, ScoreCondition,
    UnitClassCountCondition, UnitsCondition,
};
pub use unit::{CharacterCondition, ExperienceCondition, HitPointsCondition, UnitClassCondition};

pub(crate) use faction::resource_shorthand;

use crate::error::ScriptError;
use crate::script::effect::{AnyUnitOfClass, CurrentFaction, Owner};
use crate::script::{Context, FactionScope, ScopeType, UnitScope, View, line};

pub trait Condition<S: ScopeType> {
    fn class(&self) -> &'static str;

    fn process_property(
        &mut self,
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        Err(DataError::UnknownProperty {
            class: self.class(),
            key: property.key.clone(),
        })
    }

    fn process_scope(&mut self, scope: &ScopeNode, _context: &ConfigContext<'_>) -> Result<(), DataError> {
        Err(DataError::UnknownScope {
            class: self.class(),
            tag: scope.tag.clone(),
        })
    }

    fn process_value(&mut self, value: &str, _context: &ConfigContext<'_>) -> Result<(), DataError> {
        Err(DataError::UnexpectedValue {
            class: self.class(),
            value: value.to_owned(),
        })
    }

    fn finish(&mut self) -> Result<(), DataError> {
        Ok(())
    }

    fn check(&self, _data: &Catalog) -> Result<(), DataError> {
        Ok(())
    }

    fn evaluate(&self, target: S::Ref, context: &Context, view: View<'_>) -> Result<bool, ScriptError>;

    fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String;
}

pub enum ConditionConstructor<S: ScopeType> {
    Value(fn(&PropertyNode, &ConfigContext<'_>) -> Result<Box<dyn Condition<S>>, DataError>),
    Scope(fn() -> Box<dyn Condition<S>>),
}

pub type ConditionTable<S> = HashMap<&'static str, ConditionConstructor<S>>;

/// A numeric test such as `>= 5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Comparison {
    pub operator: Operator,
    pub value: i64,
}

impl Comparison {
    pub fn parse(property: &PropertyNode) -> Result<Self, DataError> {
        if !property.operator.is_comparison() {
            return Err(DataError::invalid_operator(&property.key, property.operator));
        }
        Ok(Self {
            operator: property.operator,
            value: parse_number(&property.key, &property.value)?,
        })
    }

    pub fn holds(&self, actual: i64) -> bool {
        self.operator.compare(&actual, &self.value).unwrap_or(false)
    }

    pub fn describe(&self) -> String {
        let value = self.value;
        match self.operator {
            Operator::Inequality => format!("not {value}"),
            Operator::LessThan => format!("less than {value}"),
            Operator::LessThanOrEqual => format!("at most {value}"),
            Operator::GreaterThan => format!("more than {value}"),
            Operator::GreaterThanOrEqual => format!("at least {value}"),
            _ => value.to_string(),
        }
    }
}

/// Reads `=`, `==` or `!=` into whether the test should hold.
pub(crate) fn expected_equality(property: &PropertyNode) -> Result<bool, DataError> {
    match property.operator {
        Operator::Assignment | Operator::Equality => Ok(true),
        Operator::Inequality => Ok(false),
        operator => Err(DataError::invalid_operator(&property.key, operator)),
    }
}

/// Feeds every bare value and element of `scope` into `condition`.
fn configure<S: ScopeType>(
    condition: &mut dyn Condition<S>,
    scope: &ScopeNode,
    context: &ConfigContext<'_>,
) -> Result<(), DataError> {
    for value in &scope.values {
        condition.process_value(value, context)?;
    }
    for element in &scope.elements {
        match element {
            Element::Property(property) => condition.process_property(property, context)?,
            Element::Scope(child) => condition.process_scope(child, context)?,
        }
    }
    Ok(())
}

/// Conditions that must all hold. An empty list holds.
pub struct Conditions<S: ScopeType> {
    conditions: Vec<Box<dyn Condition<S>>>,
}

impl<S: ScopeType> Default for Conditions<S> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }
}

impl<S: ScopeType> Conditions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Box<dyn Condition<S>>) {
        self.conditions.push(condition);
    }

    pub fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        let condition = match S::condition_table().get(property.key.as_str()) {
            Some(ConditionConstructor::Value(build)) => build(property, context)?,
            Some(ConditionConstructor::Scope(_)) => {
                return Err(DataError::invalid_value(&property.key, &property.value, "expected a scope"));
            }
            None => match S::fallback_condition(property, context) {
                Some(condition) => condition?,
                None => {
                    return Err(DataError::UnknownProperty {
                        class: S::CONDITION_CLASS,
                        key: property.key.clone(),
                    });
                }
            },
        };
        self.conditions.push(condition);
        Ok(())
    }

    pub fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        let Some(ConditionConstructor::Scope(build)) = S::condition_table().get(scope.tag.as_str()) else {
            return Err(DataError::UnknownScope {
                class: S::CONDITION_CLASS,
                tag: scope.tag.clone(),
            });
        };
        if scope.operator != Operator::Assignment {
            return Err(DataError::invalid_operator(&scope.tag, scope.operator));
        }

        let mut condition = build();
        configure(condition.as_mut(), scope, context)?;
        condition.finish()?;
        self.conditions.push(condition);
        Ok(())
    }

    /// Builds a list from every element of `scope`.
    pub fn from_scope(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<Self, DataError> {
        let mut conditions = Self::new();
        conditions.extend_from_scope(scope, context)?;
        Ok(conditions)
    }

    pub fn extend_from_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if let Some(value) = scope.values.first() {
            return Err(DataError::UnexpectedValue {
                class: S::CONDITION_CLASS,
                value: value.clone(),
            });
        }
        for element in &scope.elements {
            match element {
                Element::Property(property) => self.process_property(property, context)?,
                Element::Scope(child) => self.process_scope(child, context)?,
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn evaluate(&self, target: S::Ref, context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        for condition in &self.conditions {
            if !condition.evaluate(target, context, view)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether at least one condition holds.
    pub fn any(&self, target: S::Ref, context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        for condition in &self.conditions {
            if condition.evaluate(target, context, view)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.conditions.iter().try_for_each(|condition| condition.check(data))
    }

    pub fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        self.conditions
            .iter()
            .map(|condition| condition.description(data, indent, prefix))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Heading line followed by the list one level deeper, or nothing if the
    /// list renders empty.
    pub(crate) fn headed_description(&self, heading: &str, data: &Catalog, indent: usize, prefix: &str) -> String {
        let body = self.description(data, indent + 1, prefix);
        if body.is_empty() {
            return String::new();
        }
        format!("{}\n{body}", line(indent, prefix, heading))
    }
}

fn scope_constructor<S: ScopeType, C: Condition<S> + Default + 'static>() -> Box<dyn Condition<S>> {
    Box::new(C::default())
}

fn common_conditions<S: ScopeType>() -> ConditionTable<S> {
    let mut table = ConditionTable::<S>::new();
    table.insert("and", ConditionConstructor::Scope(scope_constructor::<S, AndCondition<S>>));
    table.insert("or", ConditionConstructor::Scope(scope_constructor::<S, OrCondition<S>>));
    table.insert("not", ConditionConstructor::Scope(scope_constructor::<S, NotCondition<S>>));
    table.insert("tick", ConditionConstructor::Value(TickCondition::build::<S>));
    table
}

pub(crate) fn faction_conditions() -> ConditionTable<FactionScope> {
    let mut table = common_conditions::<FactionScope>();
    table.insert(
        "resource",
        ConditionConstructor::Scope(scope_constructor::<FactionScope, ResourceCondition>),
    );
    table.insert("score", ConditionConstructor::Value(ScoreCondition::build));
    table.insert("has_flag", ConditionConstructor::Value(HasFlagCondition::build));
    table.insert("units", ConditionConstructor::Value(UnitsCondition::build));
    table.insert(
        "unit_class_count",
        ConditionConstructor::Scope(scope_constructor::<FactionScope, UnitClassCountCondition>),
    );
    table.insert(
        "current_faction",
        ConditionConstructor::Value(CurrentFactionCondition::build),
    );
    table.insert(
        "any_unit_of_class",
        ConditionConstructor::Scope(
            scope_constructor::<FactionScope, ScopeCondition<FactionScope, UnitScope, AnyUnitOfClass>>,
        ),
    );
    table
}

pub(crate) fn unit_conditions() -> ConditionTable<UnitScope> {
    let mut table = common_conditions::<UnitScope>();
    table.insert("unit_class", ConditionConstructor::Value(UnitClassCondition::build));
    table.insert("hit_points", ConditionConstructor::Value(HitPointsCondition::build));
    table.insert("experience", ConditionConstructor::Value(ExperienceCondition::build));
    table.insert("character", ConditionConstructor::Value(CharacterCondition::build));
    table.insert(
        "owner",
        ConditionConstructor::Scope(scope_constructor::<UnitScope, ScopeCondition<UnitScope, FactionScope, Owner>>),
    );
    table.insert(
        "current_faction",
        ConditionConstructor::Scope(
            scope_constructor::<UnitScope, ScopeCondition<UnitScope, FactionScope, CurrentFaction>>,
        ),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_rejects_effect_operators() {
        let error = Comparison::parse(&PropertyNode::new("score", Operator::Addition, "5")).unwrap_err();
        assert_eq!(error.error_code(), "DATA_INVALID_OPERATOR");

        let at_least = Comparison::parse(&PropertyNode::new("score", Operator::GreaterThanOrEqual, "5")).unwrap();
        assert!(at_least.holds(5));
        assert!(!at_least.holds(4));
        assert_eq!(at_least.describe(), "at least 5");
    }

    #[test]
    fn assignment_compares_for_equality() {
        let equal = Comparison::parse(&PropertyNode::new("score", Operator::Assignment, "3")).unwrap();
        assert!(equal.holds(3));
        assert!(!equal.holds(4));
    }
}
