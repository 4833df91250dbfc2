use database::{Catalog, ConfigContext, DataEntry, DataError, Handle, Record};
use markup::{PropertyNode, ScopeNode};

use crate::data::{Character, Named, default_name};
use crate::env::DialogueEvent;
use crate::error::{ReferenceExt, ScriptError};
use crate::script::{Context, EffectList, Env, FactionScope, name_of};
use crate::state::FactionId;

/// A piece of narrative shown to a faction, optionally with effects that
/// run when it is shown.
///
/// ```text
/// harvest_festival = {
///     title = "Harvest Festival"
///     speaker = village_elder
///     text = "The granaries are full."
///     effects = { food += 50 }
/// }
/// ```
pub struct Dialogue {
    record: Record,
    title: Option<String>,
    pub speaker: Option<Handle<Character>>,
    pub text: String,
    pub effects: EffectList<FactionScope>,
}

impl Dialogue {
    /// Shows the dialogue to `faction`, then runs its effects for it under
    /// the caller's `context`.
    pub fn present(
        handle: Handle<Self>,
        faction: FactionId,
        context: &Context,
        env: &mut Env<'_>,
    ) -> Result<(), ScriptError> {
        let data = env.data;
        let dialogue = data.entry(handle).within(Self::CLASS)?;

        env.narrative.present(DialogueEvent {
            tick: env.state.tick,
            faction,
            dialogue: dialogue.identifier().to_owned(),
            speaker: dialogue.speaker.map(|speaker| name_of(data, speaker)),
            title: dialogue.name().to_owned(),
            text: dialogue.text.clone(),
        });

        env.enter()?;
        let result = dialogue.effects.apply(faction, context, env);
        env.leave();
        result
    }
}

impl DataEntry for Dialogue {
    const CLASS: &'static str = "dialogue";
    const FOLDER: Option<&'static str> = Some("dialogues");
    const DEPENDENCIES: &'static [&'static str] = &["character", "faction_scripted_effect", "unit_scripted_effect"];

    fn new(record: Record) -> Self {
        Self {
            record,
            title: None,
            speaker: None,
            text: String::new(),
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
        match property.key.as_str() {
            "title" => self.title = Some(property.value.clone()),
            "speaker" => self.speaker = context.resolve(&property.value)?,
            "text" => self.text = property.value.clone(),
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
        if scope.tag != "effects" {
            return Err(DataError::UnknownScope {
                class: Self::CLASS,
                tag: scope.tag.clone(),
            });
        }
        self.effects.extend_from_scope(scope, context)
    }

    fn finalize_text(&mut self) -> Result<(), DataError> {
        default_name(&mut self.title, &self.record);
        Ok(())
    }

    fn check(&self, catalog: &Catalog) -> Result<(), DataError> {
        if self.text.is_empty() {
            return Err(DataError::Invalid("dialogue has no text".into()));
        }
        self.effects.check(catalog)
    }
}

impl Named for Dialogue {
    fn name(&self) -> &str {
        self.title.as_deref().unwrap_or(self.record.identifier())
    }
}
