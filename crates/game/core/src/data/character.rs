use database::{Catalog, ConfigContext, DataEntry, DataError, Handle, Record};
use markup::PropertyNode;

use crate::data::{Named, UnitClass, default_name};

/// A named leader who starts the match at the head of a unit.
#[derive(Debug)]
pub struct Character {
    record: Record,
    name: Option<String>,
    unit_class: Option<Handle<UnitClass>>,
}

impl Character {
    pub fn unit_class(&self) -> Result<Handle<UnitClass>, DataError> {
        self.unit_class.ok_or_else(|| {
            DataError::Invalid(format!(
                "character '{}' has no unit class",
                self.record.identifier()
            ))
        })
    }
}

impl DataEntry for Character {
    const CLASS: &'static str = "character";
    const FOLDER: Option<&'static str> = Some("characters");
    const DEPENDENCIES: &'static [&'static str] = &["unit_class"];

    fn new(record: Record) -> Self {
        Self {
            record,
            name: None,
            unit_class: None,
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
            "name" => self.name = Some(property.value.clone()),
            "unit_class" => self.unit_class = Some(context.require(&property.value)?),
            _ => {
                return Err(DataError::UnknownProperty {
                    class: Self::CLASS,
                    key: property.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn finalize_text(&mut self) -> Result<(), DataError> {
        default_name(&mut self.name, &self.record);
        Ok(())
    }

    fn check(&self, _catalog: &Catalog) -> Result<(), DataError> {
        self.unit_class().map(|_| ())
    }
}

impl Named for Character {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.record.identifier())
    }
}
