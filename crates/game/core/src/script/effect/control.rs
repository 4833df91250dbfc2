//! Control flow: conditionals, repetition, chance, weighted picks, hidden
//! blocks, delays and calls into named definitions.

use database::value::{FixedPoint, parse_number};
use database::{Catalog, ConfigContext, DataError, Handle};
use markup::{Element, Operator, PropertyNode, ScopeNode};
use tracing::trace;

use crate::data::{Dialogue, ScriptedEffect};
use crate::error::ScriptError;
use crate::schedule::{DelayedEffectInstance, DelayedTarget};
use crate::script::effect::{Effect, EffectList};
use crate::script::{Conditions, Context, Env, ScopeType, Weight, line, name_of};
use crate::state::Tick;

/// `if = { conditions = { ... } <effects> }`
pub struct IfEffect<S: ScopeType> {
    conditions: Conditions<S>,
    effects: EffectList<S>,
}

impl<S: ScopeType> Default for IfEffect<S> {
    fn default() -> Self {
        Self {
            conditions: Conditions::new(),
            effects: EffectList::new(),
        }
    }
}

impl<S: ScopeType> Effect<S> for IfEffect<S> {
    fn class(&self) -> &'static str {
        "if"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if scope.tag == "conditions" {
            return self.conditions.extend_from_scope(scope, context);
        }
        self.effects.process_scope(scope, context)
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.conditions.check(data)?;
        self.effects.check(data)
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        if self.conditions.evaluate(target, context, env.view())? {
            self.effects.apply(target, context, env)?;
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        let effects = self.effects.description(data, indent + 1, prefix);
        if effects.is_empty() {
            return String::new();
        }
        let conditions = self.conditions.headed_description("If:", data, indent, prefix);
        if conditions.is_empty() {
            return self.effects.description(data, indent, prefix);
        }
        format!("{conditions}\n{}\n{effects}", line(indent, prefix, "Then:"))
    }
}

/// `repeat = { count = 3 <effects> }`
pub struct RepeatEffect<S: ScopeType> {
    count: i64,
    effects: EffectList<S>,
}

impl<S: ScopeType> Default for RepeatEffect<S> {
    fn default() -> Self {
        Self {
            count: 0,
            effects: EffectList::new(),
        }
    }
}

impl<S: ScopeType> Effect<S> for RepeatEffect<S> {
    fn class(&self) -> &'static str {
        "repeat"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if property.key == "count" {
            self.count = parse_number(&property.key, &property.value)?;
            return Ok(());
        }
        self.effects.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_scope(scope, context)
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.count <= 1 {
            return Err(DataError::invalid_value(
                "count",
                &self.count.to_string(),
                "repeat count must be greater than 1",
            ));
        }
        Ok(())
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.effects.check(data)
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        for _ in 0..self.count {
            self.effects.apply(target, context, env)?;
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        let effects = self.effects.description(data, indent + 1, prefix);
        if effects.is_empty() {
            return String::new();
        }
        format!("{}\n{effects}", line(indent, prefix, format!("{} times:", self.count)))
    }
}

/// `random = { chance = 0.25 <effects> }`
///
/// Runs when a draw over `0..10_000` is below the chance in
/// ten-thousandths.
pub struct RandomEffect<S: ScopeType> {
    chance: FixedPoint,
    effects: EffectList<S>,
}

impl<S: ScopeType> Default for RandomEffect<S> {
    fn default() -> Self {
        Self {
            chance: FixedPoint::ZERO,
            effects: EffectList::new(),
        }
    }
}

impl<S: ScopeType> Effect<S> for RandomEffect<S> {
    fn class(&self) -> &'static str {
        "random"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if property.key == "chance" {
            self.chance = FixedPoint::parse_value(&property.key, &property.value)?;
            return Ok(());
        }
        self.effects.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_scope(scope, context)
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.chance <= FixedPoint::ZERO || self.chance > FixedPoint::ONE {
            return Err(DataError::invalid_value(
                "chance",
                &self.chance.to_string(),
                "chance must be above 0 and at most 1",
            ));
        }
        Ok(())
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.effects.check(data)
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let draw = env.rng.below(FixedPoint::SCALE as u64) as i64;
        if draw < self.chance.raw() {
            self.effects.apply(target, context, env)?;
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        let effects = self.effects.description(data, indent + 1, prefix);
        if effects.is_empty() {
            return String::new();
        }
        let percent = FixedPoint::from_raw(self.chance.raw() * 100);
        format!("{}\n{effects}", line(indent, prefix, format!("{percent}% chance:")))
    }
}

struct RandomListEntry<S: ScopeType> {
    weight: Weight<S>,
    effects: EffectList<S>,
}

/// Picks one entry at random, proportionally to the entries' weights.
///
/// ```text
/// random_list = {
///     10 = { score += 1 }
///     entry = { weight = { base = 5 modifier = { factor = 2 has_flag = lucky } } score += 5 }
/// }
/// ```
///
/// Entries with a weight of zero or less are never picked; if no entry is
/// left nothing happens.
pub struct RandomListEffect<S: ScopeType> {
    entries: Vec<RandomListEntry<S>>,
}

impl<S: ScopeType> Default for RandomListEffect<S> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<S: ScopeType> RandomListEffect<S> {
    fn entry(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<RandomListEntry<S>, DataError> {
        let mut weight = None;
        let mut effects = EffectList::new();

        for element in &scope.elements {
            match element {
                Element::Property(property) if property.key == "weight" => {
                    weight = Some(Weight::from_property(property)?);
                }
                Element::Scope(child) if child.tag == "weight" => {
                    weight = Some(Weight::from_scope(child, context)?);
                }
                Element::Property(property) => effects.process_property(property, context)?,
                Element::Scope(child) => effects.process_scope(child, context)?,
            }
        }

        let weight = weight.ok_or_else(|| DataError::Invalid("random_list: entry without a weight".into()))?;
        Ok(RandomListEntry { weight, effects })
    }
}

impl<S: ScopeType> Effect<S> for RandomListEffect<S> {
    fn class(&self) -> &'static str {
        "random_list"
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if let Ok(weight) = scope.tag.parse::<i64>() {
            self.entries.push(RandomListEntry {
                weight: Weight::Constant(weight),
                effects: EffectList::from_scope(scope, context)?,
            });
            return Ok(());
        }
        if scope.tag == "entry" {
            self.entries.push(Self::entry(scope, context)?);
            return Ok(());
        }
        Err(DataError::UnknownScope {
            class: "random_list",
            tag: scope.tag.clone(),
        })
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.entries.is_empty() {
            return Err(DataError::Invalid("random_list: no entries".into()));
        }
        Ok(())
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        for entry in &self.entries {
            entry.weight.check(data)?;
            entry.effects.check(data)?;
        }
        Ok(())
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let view = env.view();
        let mut weights = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            weights.push(entry.weight.value(target, context, view)?.max(0));
        }

        let total = weights.iter().fold(0_i64, |sum, &weight| sum.saturating_add(weight));
        if total == 0 {
            trace!("random_list has no entry with a positive weight");
            return Ok(());
        }

        let mut draw = env.rng.below(total as u64) as i64;
        for (entry, weight) in self.entries.iter().zip(weights) {
            if draw < weight {
                return entry.effects.apply(target, context, env);
            }
            draw -= weight;
        }
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        let mut lines = vec![line(indent, prefix, "One of the following:")];
        for entry in &self.entries {
            let weight = match &entry.weight {
                Weight::Constant(value) => format!("Weight {value}:"),
                Weight::Factor(factor) => format!("Weight {}:", factor.base_value()),
            };
            let effects = entry.effects.description(data, indent + 2, prefix);
            lines.push(line(indent + 1, prefix, weight));
            if !effects.is_empty() {
                lines.push(effects);
            }
        }
        lines.join("\n")
    }
}

/// `hidden = { <effects> }`: runs its effects without describing them.
pub struct HiddenEffect<S: ScopeType> {
    effects: EffectList<S>,
}

impl<S: ScopeType> Default for HiddenEffect<S> {
    fn default() -> Self {
        Self {
            effects: EffectList::new(),
        }
    }
}

impl<S: ScopeType> Effect<S> for HiddenEffect<S> {
    fn class(&self) -> &'static str {
        "hidden"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_scope(scope, context)
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.effects.check(data)
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        self.effects.apply(target, context, env)
    }

    fn description(&self, _operator: Operator, _data: &Catalog, _indent: usize, _prefix: &str) -> String {
        String::new()
    }

    fn is_hidden(&self) -> bool {
        true
    }
}

enum DelayedCall<S: ScopeType> {
    ScriptedEffect(Handle<ScriptedEffect<S>>),
    Dialogue(Handle<Dialogue>),
}

/// `delayed = { scripted_effect = x delay = 30 }` (or `dialogue = y`).
///
/// Queues the call instead of running it; it fires `delay` ticks later
/// against the same scope and context.
pub struct DelayedEffect<S: ScopeType> {
    call: Option<DelayedCall<S>>,
    delay: Tick,
}

impl<S: ScopeType> Default for DelayedEffect<S> {
    fn default() -> Self {
        Self { call: None, delay: 0 }
    }
}

impl<S: ScopeType> Effect<S> for DelayedEffect<S> {
    fn class(&self) -> &'static str {
        "delayed"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        let call = match property.key.as_str() {
            "delay" => {
                self.delay = parse_number(&property.key, &property.value)?;
                return Ok(());
            }
            "scripted_effect" => DelayedCall::ScriptedEffect(context.require(&property.value)?),
            "dialogue" => DelayedCall::Dialogue(context.require(&property.value)?),
            _ => {
                return Err(DataError::UnknownProperty {
                    class: "delayed",
                    key: property.key.clone(),
                });
            }
        };

        if self.call.is_some() {
            return Err(DataError::Invalid(
                "delayed: only one scripted effect or dialogue may be given".into(),
            ));
        }
        self.call = Some(call);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.call.is_none() {
            return Err(DataError::Invalid("delayed: no scripted effect or dialogue given".into()));
        }
        if self.delay == 0 {
            return Err(DataError::invalid_value("delay", "0", "delay must be at least 1 tick"));
        }
        Ok(())
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        let call = match &self.call {
            Some(DelayedCall::ScriptedEffect(handle)) => S::delayed_effect(*handle),
            Some(DelayedCall::Dialogue(handle)) => DelayedTarget::Dialogue(*handle),
            None => return Err(ScriptError::unresolved("delayed", "delayed call")),
        };
        env.delayed.push(DelayedEffectInstance::new(
            call,
            S::capture(target),
            context.clone(),
            self.delay,
        ));
        Ok(())
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        match &self.call {
            Some(DelayedCall::ScriptedEffect(handle)) => {
                let effects = ScriptedEffect::describe(*handle, data, indent + 1, prefix);
                if effects.is_empty() {
                    return String::new();
                }
                format!("{}\n{effects}", line(indent, prefix, format!("In {} ticks:", self.delay)))
            }
            Some(DelayedCall::Dialogue(handle)) => line(
                indent,
                prefix,
                format!("In {} ticks: {}", self.delay, name_of(data, *handle)),
            ),
            None => String::new(),
        }
    }
}

/// `scripted_effect = name`: runs a named effect list in place.
pub struct ScriptedEffectCall<S: ScopeType> {
    handle: Handle<ScriptedEffect<S>>,
}

impl<S: ScopeType> ScriptedEffectCall<S> {
    pub fn build(property: &PropertyNode, context: &ConfigContext<'_>) -> Result<Box<dyn Effect<S>>, DataError> {
        Ok(Box::new(Self {
            handle: context.require(&property.value)?,
        }))
    }
}

impl<S: ScopeType> Effect<S> for ScriptedEffectCall<S> {
    fn class(&self) -> &'static str {
        "scripted_effect"
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        ScriptedEffect::run(self.handle, target, context, env)
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        ScriptedEffect::describe(self.handle, data, indent, prefix)
    }
}

/// `dialogue = name`: presents a dialogue to the scope's faction.
pub struct DialogueEffect {
    handle: Handle<Dialogue>,
}

impl DialogueEffect {
    pub fn build<S: ScopeType>(
        property: &PropertyNode,
        context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Effect<S>>, DataError> {
        Ok(Box::new(Self {
            handle: context.require(&property.value)?,
        }))
    }
}

impl<S: ScopeType> Effect<S> for DialogueEffect {
    fn class(&self) -> &'static str {
        "dialogue"
    }

    fn apply_assign(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        match S::faction_of(target, env.state) {
            Some(faction) => Dialogue::present(self.handle, faction, context, env),
            None => Ok(()),
        }
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Dialogue: {}", name_of(data, self.handle)))
    }
}
