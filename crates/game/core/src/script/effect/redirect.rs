//! Effects that run a nested list against a related entity.

use core::marker::PhantomData;

use database::{Catalog, ConfigContext, DataError, Handle};
use markup::{Operator, PropertyNode, ScopeNode};

use crate::data::{Character, UnitClass};
use crate::error::ScriptError;
use crate::script::effect::{Effect, EffectList};
use crate::script::{Context, Env, FactionScope, ScopeType, UnitScope, View, line, name_or_unset};

/// Picks the entity a redirect acts on.
pub trait ScopeSelector<From: ScopeType, To: ScopeType>: Default + 'static {
    const CLASS: &'static str;

    /// Offers a property to the selector before it is read as a nested
    /// effect. Returns whether it was consumed.
    fn process_property(&mut self, _property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<bool, DataError> {
        Ok(false)
    }

    fn finish(&self) -> Result<(), DataError> {
        Ok(())
    }

    /// `None` when there is nothing to act on; the nested list is skipped.
    fn select(&self, from: From::Ref, context: &Context, view: View<'_>) -> Option<To::Ref>;

    /// Heading of the description, e.g. "Owner:".
    fn heading(&self, data: &Catalog) -> String;
}

pub struct ScopeEffect<From: ScopeType, To: ScopeType, Sel> {
    selector: Sel,
    effects: EffectList<To>,
    marker: PhantomData<fn(From)>,
}

impl<From: ScopeType, To: ScopeType, Sel: Default> Default for ScopeEffect<From, To, Sel> {
    fn default() -> Self {
        Self {
            selector: Sel::default(),
            effects: EffectList::new(),
            marker: PhantomData,
        }
    }
}

impl<From, To, Sel> ScopeEffect<From, To, Sel>
where
    From: ScopeType,
    To: ScopeType,
    Sel: ScopeSelector<From, To>,
{
    pub fn selector(&self) -> &Sel {
        &self.selector
    }

    pub fn effects(&self) -> &EffectList<To> {
        &self.effects
    }
}

impl<From, To, Sel> Effect<From> for ScopeEffect<From, To, Sel>
where
    From: ScopeType,
    To: ScopeType,
    Sel: ScopeSelector<From, To>,
{
    fn class(&self) -> &'static str {
        <Sel as ScopeSelector<From, To>>::CLASS
    }

    fn assignment_only(&self) -> bool {
        true
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if self.selector.process_property(property, context)? {
            return Ok(());
        }
        self.effects.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_scope(scope, context)
    }

    fn finish(&mut self) -> Result<(), DataError> {
        self.selector.finish()
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.effects.check(data)
    }

    fn apply_assign(&self, target: From::Ref, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        match self.selector.select(target, context, env.view()) {
            Some(next) => self.effects.apply(next, context, env),
            None => Ok(()),
        }
    }

    fn description(&self, _operator: Operator, data: &Catalog, indent: usize, prefix: &str) -> String {
        let body = self.effects.description(data, indent + 1, prefix);
        if body.is_empty() {
            return String::new();
        }
        format!("{}\n{body}", line(indent, prefix, self.selector.heading(data)))
    }
}

// ============================================================================
// Selectors
// ============================================================================

/// The faction the running script was started for.
#[derive(Debug, Default)]
pub struct CurrentFaction;

impl<S: ScopeType> ScopeSelector<S, FactionScope> for CurrentFaction {
    const CLASS: &'static str = "current_faction";

    fn select(&self, _from: S::Ref, context: &Context, view: View<'_>) -> Option<<FactionScope as ScopeType>::Ref> {
        context
            .current_faction
            .filter(|&faction| view.state.faction(faction).is_some())
    }

    fn heading(&self, _data: &Catalog) -> String {
        "Current faction:".to_owned()
    }
}

/// The unit most recently created by the scope's faction.
#[derive(Debug, Default)]
pub struct LastCreatedUnit;

impl<S: ScopeType> ScopeSelector<S, UnitScope> for LastCreatedUnit {
    const CLASS: &'static str = "last_created_unit";

    fn select(&self, from: S::Ref, _context: &Context, view: View<'_>) -> Option<<UnitScope as ScopeType>::Ref> {
        let faction = S::faction_of(from, view.state)?;
        view.state
            .faction(faction)?
            .last_created_unit
            .filter(|&unit| view.state.units.contains(unit))
    }

    fn heading(&self, _data: &Catalog) -> String {
        "Last created unit:".to_owned()
    }
}

/// The unit led by a character: `character_unit = { character = x ... }`.
#[derive(Debug, Default)]
pub struct CharacterUnit {
    character: Option<Handle<Character>>,
}

impl<S: ScopeType> ScopeSelector<S, UnitScope> for CharacterUnit {
    const CLASS: &'static str = "character_unit";

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<bool, DataError> {
        if property.key != "character" {
            return Ok(false);
        }
        self.character = Some(context.require(&property.value)?);
        Ok(true)
    }

    fn finish(&self) -> Result<(), DataError> {
        match self.character {
            Some(_) => Ok(()),
            None => Err(DataError::Invalid("character_unit: no character given".into())),
        }
    }

    fn select(&self, _from: S::Ref, _context: &Context, view: View<'_>) -> Option<<UnitScope as ScopeType>::Ref> {
        let character = self.character?;
        view.state
            .units
            .iter()
            .find(|(_, unit)| unit.character == Some(character))
            .map(|(handle, _)| handle)
    }

    fn heading(&self, data: &Catalog) -> String {
        format!("{}:", name_or_unset(data, self.character))
    }
}

/// First unit of a class owned by the faction:
/// `any_unit_of_class = { unit_class = x ... }`.
#[derive(Debug, Default)]
pub struct AnyUnitOfClass {
    class: Option<Handle<UnitClass>>,
}

impl ScopeSelector<FactionScope, UnitScope> for AnyUnitOfClass {
    const CLASS: &'static str = "any_unit_of_class";

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<bool, DataError> {
        if property.key != "unit_class" {
            return Ok(false);
        }
        self.class = Some(context.require(&property.value)?);
        Ok(true)
    }

    fn finish(&self) -> Result<(), DataError> {
        match self.class {
            Some(_) => Ok(()),
            None => Err(DataError::Invalid("any_unit_of_class: no unit class given".into())),
        }
    }

    fn select(
        &self,
        from: <FactionScope as ScopeType>::Ref,
        _context: &Context,
        view: View<'_>,
    ) -> Option<<UnitScope as ScopeType>::Ref> {
        let class = self.class?;
        view.state
            .units_of(from)
            .find(|(_, unit)| unit.class == class)
            .map(|(handle, _)| handle)
    }

    fn heading(&self, data: &Catalog) -> String {
        format!("A {} unit:", name_or_unset(data, self.class))
    }
}

/// The faction owning the unit.
#[derive(Debug, Default)]
pub struct Owner;

impl ScopeSelector<UnitScope, FactionScope> for Owner {
    const CLASS: &'static str = "owner";

    fn select(
        &self,
        from: <UnitScope as ScopeType>::Ref,
        _context: &Context,
        view: View<'_>,
    ) -> Option<<FactionScope as ScopeType>::Ref> {
        view.state.units.get(from).map(|unit| unit.owner)
    }

    fn heading(&self, _data: &Catalog) -> String {
        "Owner:".to_owned()
    }
}
