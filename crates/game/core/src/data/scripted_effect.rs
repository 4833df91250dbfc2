use std::cell::Cell;

use database::{Catalog, ConfigContext, DataEntry, DataError, Handle, Record};
use markup::{PropertyNode, ScopeNode};

use crate::config::SchedulerConfig;
use crate::data::Named;
use crate::error::{ReferenceExt, ScriptError};
use crate::script::{Context, EffectList, Env, FactionScope, ScopeType, UnitScope, line};

/// A named, reusable effect list for one scope kind.
///
/// The whole body of the definition is the list:
///
/// ```text
/// reward_veterans = {
///     any_unit_of_class = { unit_class = archer experience += 10 }
///     score += 5
/// }
/// ```
pub struct ScriptedEffect<S: ScopeType> {
    record: Record,
    effects: EffectList<S>,
}

pub type FactionScriptedEffect = ScriptedEffect<FactionScope>;
pub type UnitScriptedEffect = ScriptedEffect<UnitScope>;

thread_local! {
    static DESCRIBE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

impl<S: ScopeType> ScriptedEffect<S> {
    pub fn effects(&self) -> &EffectList<S> {
        &self.effects
    }

    /// Runs the named list against `target`.
    pub fn run(
        handle: Handle<Self>,
        target: S::Ref,
        context: &Context,
        env: &mut Env<'_>,
    ) -> Result<(), ScriptError> {
        let data = env.data;
        let effect = data.entry(handle).within(S::SCRIPTED_EFFECT_CLASS)?;

        env.enter()?;
        let result = effect.effects.apply(target, context, env);
        env.leave();
        result
    }

    /// Description of the named list, inlined at `indent`.
    pub fn describe(handle: Handle<Self>, data: &Catalog, indent: usize, prefix: &str) -> String {
        let Ok(effect) = data.entry(handle) else {
            return String::new();
        };

        let depth = DESCRIBE_DEPTH.with(Cell::get);
        if depth >= SchedulerConfig::MAX_SCRIPT_DEPTH {
            return line(indent, prefix, "...");
        }
        DESCRIBE_DEPTH.with(|cell| cell.set(depth + 1));
        let text = effect.effects.description(data, indent, prefix);
        DESCRIBE_DEPTH.with(|cell| cell.set(depth));
        text
    }
}

impl<S: ScopeType> DataEntry for ScriptedEffect<S> {
    const CLASS: &'static str = S::SCRIPTED_EFFECT_CLASS;
    const FOLDER: Option<&'static str> = Some(S::SCRIPTED_EFFECT_FOLDER);
    const DEPENDENCIES: &'static [&'static str] = &["resource", "unit_class", "character", "faction"];

    fn new(record: Record) -> Self {
        Self {
            record,
            effects: EffectList::new(),
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.effects.process_scope(scope, context)
    }

    fn check(&self, catalog: &Catalog) -> Result<(), DataError> {
        if self.effects.is_empty() {
            return Err(DataError::Invalid("scripted effect has no effects".into()));
        }
        self.effects.check(catalog)
    }
}

impl<S: ScopeType> Named for ScriptedEffect<S> {
    fn name(&self) -> &str {
        self.record.identifier()
    }
}
