use database::value::{parse_bool, parse_number};
use database::{Catalog, ConfigContext, DataError, Handle};
use markup::{Operator, PropertyNode};
use tracing::debug;

use crate::data::UnitClass;
use crate::error::{ReferenceExt, ScriptError};
use crate::script::effect::Effect;
use crate::script::{Context, Env, Operators, UnitScope, line, name_of};
use crate::state::UnitHandle;

/// Hit points never exceed the class maximum. A unit brought down to zero
/// is removed.
#[derive(Debug)]
pub struct HitPointsEffect {
    value: i64,
}

impl HitPointsEffect {
    pub fn build(property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<Box<dyn Effect<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            value: parse_number(&property.key, &property.value)?,
        }))
    }

    fn update(&self, target: UnitHandle, env: &mut Env<'_>, change: impl Fn(i64) -> i64) -> Result<(), ScriptError> {
        let Some(unit) = env.state.units.get_mut(target) else {
            return Ok(());
        };
        let maximum = env.data.entry(unit.class).within("hit_points")?.hit_points;
        unit.hit_points = change(unit.hit_points).clamp(0, maximum);

        if unit.hit_points == 0 {
            env.state.units.remove(target);
            debug!(?target, "unit destroyed");
        }
        Ok(())
    }
}

impl Effect<UnitScope> for HitPointsEffect {
    fn class(&self) -> &'static str {
        "hit_points"
    }

    fn supported_operators(&self) -> Operators {
        Operators::ALL
    }

    fn apply_assign(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        self.update(target, env, |_| self.value)
    }

    fn apply_add(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        self.update(target, env, |current| current.saturating_add(self.value))
    }

    fn apply_subtract(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        self.update(target, env, |current| current.saturating_sub(self.value))
    }

    fn description(&self, operator: Operator, _data: &Catalog, indent: usize, prefix: &str) -> String {
        let text = match operator {
            Operator::Addition => format!("Heal {} hit points", self.value),
            Operator::Subtraction => format!("Lose {} hit points", self.value),
            _ => format!("Hit points: {}", self.value),
        };
        line(indent, prefix, text)
    }
}

#[derive(Debug)]
pub struct ExperienceEffect {
    value: i64,
}

impl ExperienceEffect {
    pub fn build(property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<Box<dyn Effect<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            value: parse_number(&property.key, &property.value)?,
        }))
    }

    fn update(target: UnitHandle, env: &mut Env<'_>, change: impl Fn(i64) -> i64) {
        if let Some(unit) = env.state.units.get_mut(target) {
            unit.experience = change(unit.experience).max(0);
        }
    }
}

impl Effect<UnitScope> for ExperienceEffect {
    fn class(&self) -> &'static str {
        "experience"
    }

    fn supported_operators(&self) -> Operators {
        Operators::ALL
    }

    fn apply_assign(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        Self::update(target, env, |_| self.value);
        Ok(())
    }

    fn apply_add(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        Self::update(target, env, |current| current.saturating_add(self.value));
        Ok(())
    }

    fn apply_subtract(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        Self::update(target, env, |current| current.saturating_sub(self.value));
        Ok(())
    }

    fn description(&self, operator: Operator, _data: &Catalog, indent: usize, prefix: &str) -> String {
        let text = match operator {
            Operator::Addition => format!("Gain {} experience", self.value),
            Operator::Subtraction => format!("Lose {} experience", self.value),
            _ => format!("Experience: {}", self.value),
        };
        line(indent, prefix, text)
    }
}

/// `transform = <unit class>`: changes the unit's class, keeping its hit
/// points within the new maximum.
#[derive(Debug)]
pub struct TransformEffect {
    class: Handle<UnitClass>,
}

impl TransformEffect {
    pub fn build(property: &PropertyNode, context: &ConfigContext<'_>) -> Result<Box<dyn Effect<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            class: context.require(&property.value)?,
        }))
    }
}

impl Effect<UnitScope> for TransformEffect {
    fn class(&self) -> &'static str {
        "transform"
    }

    fn apply_assign(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let maximum = env.data.entry(self.class).within("transform")?.hit_points;
        if let Some(unit) = env.state.units.get_mut(target) {
            unit.class = self.class;
            unit.hit_points = unit.hit_points.min(maximum);
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Become a {}", name_of(data, self.class)))
    }
}

/// `remove = yes`
#[derive(Debug)]
pub struct RemoveEffect {
    remove: bool,
}

impl RemoveEffect {
    pub fn build(property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<Box<dyn Effect<UnitScope>>, DataError> {
        Ok(Box::new(Self {
            remove: parse_bool(&property.key, &property.value)?,
        }))
    }
}

impl Effect<UnitScope> for RemoveEffect {
    fn class(&self) -> &'static str {
        "remove"
    }

    fn apply_assign(&self, target: UnitHandle, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if self.remove && env.state.units.remove(target).is_some() {
            debug!(?target, "unit removed");
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, _data: &Catalog, indent: usize, prefix: &str) -> String {
        if self.remove {
            line(indent, prefix, "Remove the unit")
        } else {
            String::new()
        }
    }
}
