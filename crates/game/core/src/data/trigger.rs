use database::value::parse_bool;
use database::{Catalog, ConfigContext, DataEntry, DataError, Record};
use markup::{PropertyNode, ScopeNode};

use crate::data::{Named, default_name};
use crate::error::ScriptError;
use crate::script::{Conditions, Context, EffectList, Env, FactionScope, View, Weight};
use crate::state::FactionId;

/// When a trigger is evaluated.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerKind {
    /// Checked one trigger per tick, round-robin, for the player's faction.
    #[default]
    Default,
    /// Checked for every faction once per half-minute pulse.
    HalfMinutePulse,
    /// Checked for every faction once per minute pulse.
    MinutePulse,
}

/// A rule: when `conditions` hold for a faction, run `effects` for it.
///
/// ```text
/// bandit_raid = {
///     type = minute_pulse
///     random = yes
///     weight = { base = 10 modifier = { factor = 2 gold >= 500 } }
///     conditions = { tick >= 1800 }
///     effects = { gold -= 50 dialogue = bandit_raid }
/// }
/// ```
pub struct Trigger {
    record: Record,
    name: Option<String>,
    kind: TriggerKind,
    only_once: bool,
    random: bool,
    weight: Option<Weight<FactionScope>>,
    conditions: Conditions<FactionScope>,
    effects: EffectList<FactionScope>,
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn only_once(&self) -> bool {
        self.only_once
    }

    /// Random triggers compete for a single pick per faction and pulse.
    pub fn is_random(&self) -> bool {
        self.random
    }

    pub fn conditions(&self) -> &Conditions<FactionScope> {
        &self.conditions
    }

    pub fn effects(&self) -> &EffectList<FactionScope> {
        &self.effects
    }

    /// Weight in a random pick. Defaults to 1.
    pub fn weight(&self, faction: FactionId, context: &Context, view: View<'_>) -> Result<i64, ScriptError> {
        match &self.weight {
            Some(weight) => weight.value(faction, context, view),
            None => Ok(1),
        }
    }

    pub fn conditions_hold(&self, faction: FactionId, context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        self.conditions.evaluate(faction, context, view)
    }

    pub fn fire(&self, faction: FactionId, context: &Context, env: &mut Env<'_>) -> Result<(), ScriptError> {
        self.effects.apply(faction, context, env)
    }

    /// Evaluates the conditions and, if they hold, fires. Returns whether it
    /// fired.
    pub fn try_fire(&self, faction: FactionId, env: &mut Env<'_>) -> Result<bool, ScriptError> {
        let context = Context::for_faction(faction);
        if !self.conditions_hold(faction, &context, env.view())? {
            return Ok(false);
        }
        self.fire(faction, &context, env)?;
        Ok(true)
    }
}

impl DataEntry for Trigger {
    const CLASS: &'static str = "trigger";
    const FOLDER: Option<&'static str> = Some("triggers");
    const DEPENDENCIES: &'static [&'static str] = &["faction", "dialogue", "faction_scripted_effect"];

    fn new(record: Record) -> Self {
        Self {
            record,
            name: None,
            kind: TriggerKind::Default,
            only_once: false,
            random: false,
            weight: None,
            conditions: Conditions::new(),
            effects: EffectList::new(),
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn process_property(&mut self, property: &PropertyNode, _context: &ConfigContext<'_>) -> Result<(), DataError> {
        match property.key.as_str() {
            "name" => self.name = Some(property.value.clone()),
            "type" => {
                self.kind = property.value.parse().map_err(|_| {
                    DataError::invalid_value(
                        &property.key,
                        &property.value,
                        "expected default, half_minute_pulse or minute_pulse",
                    )
                })?;
            }
            "only_once" => self.only_once = parse_bool(&property.key, &property.value)?,
            "random" => self.random = parse_bool(&property.key, &property.value)?,
            "weight" => self.weight = Some(Weight::from_property(property)?),
            _ => {
                return Err(DataError::UnknownProperty {
                    class: Self::CLASS,
                    key: property.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        match scope.tag.as_str() {
            "conditions" => self.conditions.extend_from_scope(scope, context)?,
            "effects" => self.effects.extend_from_scope(scope, context)?,
            "weight" => self.weight = Some(Weight::from_scope(scope, context)?),
            _ => {
                return Err(DataError::UnknownScope {
                    class: Self::CLASS,
                    tag: scope.tag.clone(),
                });
            }
        }
        Ok(())
    }

    fn finalize_text(&mut self) -> Result<(), DataError> {
        default_name(&mut self.name, &self.record);
        Ok(())
    }

    fn check(&self, catalog: &Catalog) -> Result<(), DataError> {
        if self.random && self.kind == TriggerKind::Default {
            return Err(DataError::Invalid(
                "only pulse triggers can be random".into(),
            ));
        }
        if self.effects.is_empty() {
            return Err(DataError::Invalid("trigger has no effects".into()));
        }
        if let Some(weight) = &self.weight {
            weight.check(catalog)?;
        }
        self.conditions.check(catalog)?;
        self.effects.check(catalog)
    }
}

impl Named for Trigger {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.record.identifier())
    }
}
