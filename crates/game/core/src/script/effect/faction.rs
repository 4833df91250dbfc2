use database::value::{parse_bool, parse_number};
use database::{Catalog, ConfigContext, DataError, Handle};
use markup::{Operator, PropertyNode};
use tracing::debug;

use crate::data::{Resource, UnitClass};
use crate::error::{ReferenceExt, ScriptError};
use crate::script::effect::Effect;
use crate::script::{Context, Env, FactionScope, Operators, line, name_of, name_or_unset};
use crate::state::FactionId;

fn signed(operator: Operator, quantity: i64) -> String {
    match operator {
        Operator::Addition => format!("+{quantity}"),
        Operator::Subtraction => format!("-{quantity}"),
        _ => quantity.to_string(),
    }
}

/// Sets or changes a stored resource.
///
/// Written either as the shorthand `gold += 5` or as
/// `resource += { resource = gold quantity = 5 }`.
#[derive(Debug, Default)]
pub struct ResourceEffect {
    resource: Option<Handle<Resource>>,
    quantity: i64,
}

/// `<resource> <op> N` for any key naming a resource.
pub(crate) fn resource_shorthand(
    property: &PropertyNode,
    context: &ConfigContext<'_>,
) -> Option<Result<Box<dyn Effect<FactionScope>>, DataError>> {
    let resource = context.catalog.registry::<Resource>().ok()?.try_get(&property.key)?;
    Some(parse_number(&property.key, &property.value).map(|quantity| {
        Box::new(ResourceEffect {
            resource: Some(resource),
            quantity,
        }) as Box<dyn Effect<FactionScope>>
    }))
}

impl ResourceEffect {
    fn resource(&self) -> Result<Handle<Resource>, ScriptError> {
        self.resource.ok_or_else(|| ScriptError::unresolved("resource", "resource"))
    }
}

impl Effect<FactionScope> for ResourceEffect {
    fn class(&self) -> &'static str {
        "resource"
    }

    fn supported_operators(&self) -> Operators {
        Operators::ALL
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        match property.key.as_str() {
            "resource" => self.resource = Some(context.require(&property.value)?),
            "quantity" => self.quantity = parse_number(&property.key, &property.value)?,
            _ => {
                return Err(DataError::UnknownProperty {
                    class: "resource",
                    key: property.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.resource.is_none() {
            return Err(DataError::Invalid("resource: no resource given".into()));
        }
        Ok(())
    }

    fn apply_assign(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let resource = self.resource()?;
        if let Some(faction) = env.state.faction_mut(target) {
            faction.set_resource(resource, self.quantity);
        }
        Ok(())
    }

    fn apply_add(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let resource = self.resource()?;
        if let Some(faction) = env.state.faction_mut(target) {
            faction.change_resource(resource, self.quantity);
        }
        Ok(())
    }

    fn apply_subtract(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let resource = self.resource()?;
        if let Some(faction) = env.state.faction_mut(target) {
            faction.change_resource(resource, self.quantity.saturating_neg());
        }
        Ok(())
    }

    fn description(&self, operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        let name = name_or_unset(data, self.resource);
        line(indent, prefix, format!("{name}: {}", signed(operator, self.quantity)))
    }
}

/// `score <op> N`
#[derive(Debug)]
pub struct ScoreEffect {
    value: i64,
}

impl ScoreEffect {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Effect<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            value: parse_number(&property.key, &property.value)?,
        }))
    }
}

impl Effect<FactionScope> for ScoreEffect {
    fn class(&self) -> &'static str {
        "score"
    }

    fn supported_operators(&self) -> Operators {
        Operators::ALL
    }

    fn apply_assign(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if let Some(faction) = env.state.faction_mut(target) {
            faction.score = self.value;
        }
        Ok(())
    }

    fn apply_add(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if let Some(faction) = env.state.faction_mut(target) {
            faction.score = faction.score.saturating_add(self.value);
        }
        Ok(())
    }

    fn apply_subtract(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if let Some(faction) = env.state.faction_mut(target) {
            faction.score = faction.score.saturating_sub(self.value);
        }
        Ok(())
    }

    fn description(&self, operator: Operator, _data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Score: {}", signed(operator, self.value)))
    }
}

/// `flag += name` sets a flag, `flag -= name` clears it.
#[derive(Debug)]
pub struct FlagEffect {
    flag: String,
}

impl FlagEffect {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Effect<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            flag: property.value.clone(),
        }))
    }
}

impl Effect<FactionScope> for FlagEffect {
    fn class(&self) -> &'static str {
        "flag"
    }

    fn supported_operators(&self) -> Operators {
        Operators::ADD | Operators::SUBTRACT
    }

    fn apply_add(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if let Some(faction) = env.state.faction_mut(target) {
            faction.flags.insert(self.flag.clone());
        }
        Ok(())
    }

    fn apply_subtract(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if let Some(faction) = env.state.faction_mut(target) {
            faction.flags.remove(&self.flag);
        }
        Ok(())
    }

    // Flags are bookkeeping for other scripts.
    fn description(&self, _operator: Operator, _data: &Catalog, _indent: usize, _prefix: &str) -> String {
        String::new()
    }
}

/// `create_unit = <unit class>`
#[derive(Debug)]
pub struct CreateUnitEffect {
    class: Handle<UnitClass>,
}

impl CreateUnitEffect {
    pub fn build(
        property: &PropertyNode,
        context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Effect<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            class: context.require(&property.value)?,
        }))
    }
}

impl Effect<FactionScope> for CreateUnitEffect {
    fn class(&self) -> &'static str {
        "create_unit"
    }

    fn apply_assign(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let unit = env
            .state
            .spawn_unit(env.data, self.class, target, None)
            .within("create_unit")?;
        debug!(faction = %target, ?unit, "created unit");
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Gain a {} unit", name_of(data, self.class)))
    }
}

/// `defeat = yes`
#[derive(Debug)]
pub struct DefeatEffect {
    defeated: bool,
}

impl DefeatEffect {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Effect<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            defeated: parse_bool(&property.key, &property.value)?,
        }))
    }
}

impl Effect<FactionScope> for DefeatEffect {
    fn class(&self) -> &'static str {
        "defeat"
    }

    fn apply_assign(&self, target: FactionId, _context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if let Some(faction) = env.state.faction_mut(target) {
            faction.defeated = self.defeated;
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, _data: &Catalog, indent: usize, prefix: &str) -> String {
        if self.defeated {
            line(indent, prefix, "Lose the game")
        } else {
            String::new()
        }
    }
}
