//! Effects: the statements of the script language.
//!
//! Every effect node stores the operator it was written with and dispatches
//! on it when applied:
//!
//! ```text
//! score = 10      -> apply_assign
//! score += 10     -> apply_add
//! score -= 10     -> apply_subtract
//! ```
//!
//! Redirecting effects (`current_faction = { ... }` and friends) only accept
//! `=`, which is checked when the node is built.

mod control;
mod faction;
mod redirect;
mod unit;

use std::collections::HashMap;

use database::{Catalog, ConfigContext, DataError};
use markup::{Element, Operator, PropertyNode, ScopeNode};

pub use control::{
    DelayedEffect, DialogueEffect, HiddenEffect, IfEffect, RandomEffect, RandomListEffect,
    RepeatEffect, ScriptedEffectCall,
};
pub use faction::{CreateUnitEffect, DefeatEffect, FlagEffect, ResourceEffect, ScoreEffect};
pub use redirect::{
    AnyUnitOfClass, CharacterUnit, CurrentFaction, LastCreatedUnit, Owner, ScopeEffect,
    ScopeSelector,
};
pub use unit::{ExperienceEffect, HitPointsEffect, RemoveEffect, TransformEffect};

pub(crate) use faction::resource_shorthand;

use crate::error::ScriptError;
use crate::script::{Context, Env, FactionScope, Operators, ScopeType, UnitScope};

/// One effect kind.
///
/// Property-form kinds (`key = value`) are built complete by their
/// constructor. Scope-form kinds (`key = { ... }`) start empty and receive
/// the scope's elements through the `process_*` hooks, then `finish`.
pub trait Effect<S: ScopeType> {
    fn class(&self) -> &'static str;

    /// Operators the kind implements. Checked at validation time.
    fn supported_operators(&self) -> Operators {
        Operators::ASSIGN
    }

    /// Kinds that refuse any other operator as soon as they are built.
    fn assignment_only(&self) -> bool {
        false
    }

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

    /// Validates the node once all of its elements were processed.
    fn finish(&mut self) -> Result<(), DataError> {
        Ok(())
    }

    fn check(&self, _data: &Catalog) -> Result<(), DataError> {
        Ok(())
    }

    fn apply_assign(&self, _target: S::Ref, _context: &Context, _env: &mut Env<'_>) -> Result<(), ScriptError> {
        Err(ScriptError::unsupported(self.class(), Operator::Assignment))
    }

    fn apply_add(&self, _target: S::Ref, _context: &Context, _env: &mut Env<'_>) -> Result<(), ScriptError> {
        Err(ScriptError::unsupported(self.class(), Operator::Addition))
    }

    fn apply_subtract(&self, _target: S::Ref, _context: &Context, _env: &mut Env<'_>) -> Result<(), ScriptError> {
        Err(ScriptError::unsupported(self.class(), Operator::Subtraction))
    }

    /// Human-readable text, one or more lines, each starting with `prefix`.
    fn description(&self, operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String;

    /// Hidden nodes run normally but are left out of descriptions.
    fn is_hidden(&self) -> bool {
        false
    }
}

pub enum EffectConstructor<S: ScopeType> {
    /// `key <op> value`
    Value(fn(&PropertyNode, &ConfigContext<'_>) -> Result<Box<dyn Effect<S>>, DataError>),
    /// `key <op> { ... }`
    Scope(fn() -> Box<dyn Effect<S>>),
}

pub type EffectTable<S> = HashMap<&'static str, EffectConstructor<S>>;

/// Feeds every bare value and element of `scope` into `effect`, in order.
fn configure<S: ScopeType>(
    effect: &mut dyn Effect<S>,
    scope: &ScopeNode,
    context: &ConfigContext<'_>,
) -> Result<(), DataError> {
    for value in &scope.values {
        effect.process_value(value, context)?;
    }
    for element in &scope.elements {
        match element {
            Element::Property(property) => effect.process_property(property, context)?,
            Element::Scope(child) => effect.process_scope(child, context)?,
        }
    }
    Ok(())
}

/// An effect together with the operator it was written with.
pub struct EffectNode<S: ScopeType> {
    operator: Operator,
    effect: Box<dyn Effect<S>>,
}

impl<S: ScopeType> EffectNode<S> {
    pub fn new(operator: Operator, effect: Box<dyn Effect<S>>) -> Result<Self, DataError> {
        if effect.assignment_only() && operator != Operator::Assignment {
            return Err(DataError::invalid_operator(effect.class(), operator));
        }
        Ok(Self { operator, effect })
    }

    pub fn from_property(property: &PropertyNode, context: &ConfigContext<'_>) -> Result<Self, DataError> {
        let effect = match S::effect_table().get(property.key.as_str()) {
            Some(EffectConstructor::Value(build)) => build(property, context)?,
            Some(EffectConstructor::Scope(_)) => {
                return Err(DataError::invalid_value(&property.key, &property.value, "expected a scope"));
            }
            None => match S::fallback_effect(property, context) {
                Some(effect) => effect?,
                None => {
                    return Err(DataError::UnknownProperty {
                        class: S::EFFECT_CLASS,
                        key: property.key.clone(),
                    });
                }
            },
        };
        Self::new(property.operator, effect)
    }

    pub fn from_scope(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<Self, DataError> {
        let Some(EffectConstructor::Scope(build)) = S::effect_table().get(scope.tag.as_str()) else {
            return Err(DataError::UnknownScope {
                class: S::EFFECT_CLASS,
                tag: scope.tag.clone(),
            });
        };

        let mut effect = build();
        if effect.assignment_only() && scope.operator != Operator::Assignment {
            return Err(DataError::invalid_operator(effect.class(), scope.operator));
        }
        configure(effect.as_mut(), scope, context)?;
        effect.finish()?;
        Self::new(scope.operator, effect)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn class(&self) -> &'static str {
        self.effect.class()
    }

    pub fn apply(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        match self.operator {
            Operator::Assignment => self.effect.apply_assign(target, context, env),
            Operator::Addition => self.effect.apply_add(target, context, env),
            Operator::Subtraction => self.effect.apply_subtract(target, context, env),
            operator => Err(ScriptError::unsupported(self.effect.class(), operator)),
        }
    }

    pub fn check(&self, data: &Catalog) -> Result<(), DataError> {
        if !self.effect.supported_operators().supports(self.operator) {
            return Err(DataError::invalid_operator(self.effect.class(), self.operator));
        }
        self.effect.check(data)
    }

    pub fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        self.effect.description(self.operator, data, indent, prefix)
    }

    pub fn is_hidden(&self) -> bool {
        self.effect.is_hidden()
    }
}

/// Effects applied in declaration order.
pub struct EffectList<S: ScopeType> {
    nodes: Vec<EffectNode<S>>,
}

impl<S: ScopeType> Default for EffectList<S> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<S: ScopeType> EffectList<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: EffectNode<S>) {
        self.nodes.push(node);
    }

    pub fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.nodes.push(EffectNode::from_property(property, context)?);
        Ok(())
    }

    pub fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.nodes.push(EffectNode::from_scope(scope, context)?);
        Ok(())
    }

    /// Builds a list from every element of `scope`.
    pub fn from_scope(scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<Self, DataError> {
        let mut list = Self::new();
        list.extend_from_scope(scope, context)?;
        Ok(list)
    }

    /// Appends every element of `scope`.
    pub fn extend_from_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if let Some(value) = scope.values.first() {
            return Err(DataError::UnexpectedValue {
                class: S::EFFECT_CLASS,
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
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[EffectNode<S>] {
        &self.nodes
    }

    pub fn apply(&self, target: S::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        for node in &self.nodes {
            node.apply(target, context, env)?;
        }
        Ok(())
    }

    pub fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.nodes.iter().try_for_each(|node| node.check(data))
    }

    /// Joins the descriptions of the visible nodes. Multi-line entries are
    /// set apart by a blank line.
    pub fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let mut text = String::new();
        let mut previous_multiline = false;

        for node in &self.nodes {
            if node.is_hidden() {
                continue;
            }
            let entry = node.description(data, indent, prefix);
            if entry.is_empty() {
                continue;
            }

            let multiline = entry.contains('\n');
            if !text.is_empty() {
                text.push('\n');
                if multiline || previous_multiline {
                    text.push('\n');
                }
            }
            text.push_str(&entry);
            previous_multiline = multiline;
        }

        text
    }
}

fn scope_constructor<S: ScopeType, E: Effect<S> + Default + 'static>() -> Box<dyn Effect<S>> {
    Box::new(E::default())
}

/// Kinds available in both scopes.
fn common_effects<S: ScopeType>() -> EffectTable<S> {
    let mut table = EffectTable::<S>::new();
    table.insert("if", EffectConstructor::Scope(scope_constructor::<S, IfEffect<S>>));
    table.insert("repeat", EffectConstructor::Scope(scope_constructor::<S, RepeatEffect<S>>));
    table.insert("random", EffectConstructor::Scope(scope_constructor::<S, RandomEffect<S>>));
    table.insert(
        "random_list",
        EffectConstructor::Scope(scope_constructor::<S, RandomListEffect<S>>),
    );
    table.insert("hidden", EffectConstructor::Scope(scope_constructor::<S, HiddenEffect<S>>));
    table.insert("delayed", EffectConstructor::Scope(scope_constructor::<S, DelayedEffect<S>>));
    table.insert("scripted_effect", EffectConstructor::Value(ScriptedEffectCall::<S>::build));
    table.insert("dialogue", EffectConstructor::Value(DialogueEffect::build::<S>));
    table.insert(
        "current_faction",
        EffectConstructor::Scope(scope_constructor::<S, ScopeEffect<S, FactionScope, CurrentFaction>>),
    );
    table.insert(
        "character_unit",
        EffectConstructor::Scope(scope_constructor::<S, ScopeEffect<S, UnitScope, CharacterUnit>>),
    );
    table.insert(
        "last_created_unit",
        EffectConstructor::Scope(scope_constructor::<S, ScopeEffect<S, UnitScope, LastCreatedUnit>>),
    );
    table
}

pub(crate) fn faction_effects() -> EffectTable<FactionScope> {
    let mut table = common_effects::<FactionScope>();
    table.insert(
        "resource",
        EffectConstructor::Scope(scope_constructor::<FactionScope, ResourceEffect>),
    );
    table.insert("score", EffectConstructor::Value(ScoreEffect::build));
    table.insert("flag", EffectConstructor::Value(FlagEffect::build));
    table.insert("create_unit", EffectConstructor::Value(CreateUnitEffect::build));
    table.insert("defeat", EffectConstructor::Value(DefeatEffect::build));
    table.insert(
        "any_unit_of_class",
        EffectConstructor::Scope(scope_constructor::<FactionScope, ScopeEffect<FactionScope, UnitScope, AnyUnitOfClass>>),
    );
    table
}

pub(crate) fn unit_effects() -> EffectTable<UnitScope> {
    let mut table = common_effects::<UnitScope>();
    table.insert("hit_points", EffectConstructor::Value(HitPointsEffect::build));
    table.insert("experience", EffectConstructor::Value(ExperienceEffect::build));
    table.insert("transform", EffectConstructor::Value(TransformEffect::build));
    table.insert("remove", EffectConstructor::Value(RemoveEffect::build));
    table.insert(
        "owner",
        EffectConstructor::Scope(scope_constructor::<UnitScope, ScopeEffect<UnitScope, FactionScope, Owner>>),
    );
    table
}
