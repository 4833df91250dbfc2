use database::value::parse_number;
use database::{ConfigContext, DataEntry, DataError, Handle, Record};
use markup::{PropertyNode, ScopeNode};

use crate::data::{Character, Named, Resource, UnitClass, default_name};

/// A playable side and what it starts the match with.
///
/// ```text
/// kingdom = {
///     resources = { gold = 100 }
///     starting_units = { archer = 2 }
///     starting_characters = { king_arthur }
/// }
/// ```
///
/// An amendment (`kingdom += { ... }`) adds to the starting lists.
#[derive(Debug)]
pub struct Faction {
    record: Record,
    name: Option<String>,
    pub starting_resources: Vec<(Handle<Resource>, i64)>,
    pub starting_units: Vec<(Handle<UnitClass>, u32)>,
    pub starting_characters: Vec<Handle<Character>>,
}

impl DataEntry for Faction {
    const CLASS: &'static str = "faction";
    const FOLDER: Option<&'static str> = Some("factions");
    const DEPENDENCIES: &'static [&'static str] = &["resource", "unit_class", "character"];

    fn new(record: Record) -> Self {
        Self {
            record,
            name: None,
            starting_resources: Vec::new(),
            starting_units: Vec::new(),
            starting_characters: Vec::new(),
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
            "resources" => {
                for property in scope.properties() {
                    let resource = context.require::<Resource>(&property.key)?;
                    let quantity = parse_number(&property.key, &property.value)?;
                    self.starting_resources.push((resource, quantity));
                }
            }
            "starting_units" => {
                for property in scope.properties() {
                    let class = context.require::<UnitClass>(&property.key)?;
                    let count = parse_number(&property.key, &property.value)?;
                    self.starting_units.push((class, count));
                }
            }
            "starting_characters" => {
                for value in &scope.values {
                    self.starting_characters.push(context.require::<Character>(value)?);
                }
            }
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
}

impl Named for Faction {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.record.identifier())
    }
}
