use database::{Catalog, ConfigContext, DataError, Handle};
use markup::PropertyNode;

use crate::data::{Character, UnitClass};
use crate::error::ScriptError;
use crate::script::condition::{Comparison, Condition, expected_equality};
use crate::script::{Context, UnitScope, View, line, name_of, name_or_unset};
use crate::state::UnitHandle;

/// `unit_class = archer` (or `!=`).
#[derive(Debug)]
pub struct UnitClassCondition {
    class: Handle<UnitClass>,
    expected: bool,
}

impl UnitClassCondition {
    pub fn build(property: &PropertyNode, context: &ConfigContext<'_>) -> Result<Box<dyn Condition<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            class: context.require(&property.value)?,
            expected: expected_equality(property)?,
        }))
    }
}

impl Condition<UnitScope> for UnitClassCondition {
    fn class(&self) -> &'static str {
        "unit_class"
    }

    fn evaluate(&self, target: UnitHandle, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let matches = view.state.units.get(target).is_some_and(|unit| unit.class == self.class);
        Ok(matches == self.expected)
    }

    fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let verb = if self.expected { "Is" } else { "Is not" };
        line(indent, prefix, format!("{verb} a {}", name_of(data, self.class)))
    }
}

#[derive(Debug)]
pub struct HitPointsCondition {
    comparison: Comparison,
}

impl HitPointsCondition {
    pub fn build(property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<Box<dyn Condition<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            comparison: Comparison::parse(property)?,
        }))
    }
}

impl Condition<UnitScope> for HitPointsCondition {
    fn class(&self) -> &'static str {
        "hit_points"
    }

    fn evaluate(&self, target: UnitHandle, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        Ok(view
            .state
            .units
            .get(target)
            .is_some_and(|unit| self.comparison.holds(unit.hit_points)))
    }

    fn description(&self, _data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Hit points are {}", self.comparison.describe()))
    }
}

#[derive(Debug)]
pub struct ExperienceCondition {
    comparison: Comparison,
}

impl ExperienceCondition {
    pub fn build(property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<Box<dyn Condition<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            comparison: Comparison::parse(property)?,
        }))
    }
}

impl Condition<UnitScope> for ExperienceCondition {
    fn class(&self) -> &'static str {
        "experience"
    }

    fn evaluate(&self, target: UnitHandle, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        Ok(view
            .state
            .units
            .get(target)
            .is_some_and(|unit| self.comparison.holds(unit.experience)))
    }

    fn description(&self, _data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Experience is {}", self.comparison.describe()))
    }
}

/// `character = x`; `character = none` holds for units without a character.
#[derive(Debug)]
pub struct CharacterCondition {
    character: Option<Handle<Character>>,
    expected: bool,
}

impl CharacterCondition {
    pub fn build(property: &PropertyNode, context: &ConfigContext<'_>) -> Result<Box<dyn Condition<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            character: context.resolve(&property.value)?,
            expected: expected_equality(property)?,
        }))
    }
}

impl Condition<UnitScope> for CharacterCondition {
    fn class(&self) -> &'static str {
        "character"
    }

    fn evaluate(&self, target: UnitHandle, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let matches = view
            .state
            .units
            .get(target)
            .is_some_and(|unit| unit.character == self.character);
        Ok(matches == self.expected)
    }

    fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let verb = if self.expected { "Is led by" } else { "Is not led by" };
        let name = match self.character {
            Some(_) => name_or_unset(data, self.character),
            None => "no character".to_owned(),
        };
        line(indent, prefix, format!("{verb} {name}"))
    }
}
