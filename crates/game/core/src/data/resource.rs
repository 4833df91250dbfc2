use database::{ConfigContext, DataEntry, DataError, Record};
use markup::PropertyNode;

use crate::data::{Named, default_name};

/// A stockpiled good such as gold or food.
#[derive(Debug)]
pub struct Resource {
    record: Record,
    name: Option<String>,
}

impl DataEntry for Resource {
    const CLASS: &'static str = "resource";
    const FOLDER: Option<&'static str> = Some("resources");

    fn new(record: Record) -> Self {
        Self { record, name: None }
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

    fn finalize_text(&mut self) -> Result<(), DataError> {
        default_name(&mut self.name, &self.record);
        Ok(())
    }
}

impl Named for Resource {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.record.identifier())
    }
}
