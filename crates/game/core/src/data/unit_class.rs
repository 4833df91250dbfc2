use database::value::parse_number;
use database::{Catalog, ConfigContext, DataEntry, DataError, Handle, Record};
use markup::{PropertyNode, ScopeNode};

use crate::data::{Named, Resource, default_name};

/// A kind of unit.
///
/// ```text
/// archer = {
///     hit_points = 10
///     cost = { gold = 25 wood = 10 }
/// }
/// ```
#[derive(Debug)]
pub struct UnitClass {
    record: Record,
    name: Option<String>,
    pub hit_points: i64,
    pub cost: Vec<(Handle<Resource>, i64)>,
}

impl DataEntry for UnitClass {
    const CLASS: &'static str = "unit_class";
    const FOLDER: Option<&'static str> = Some("unit_classes");
    const DEPENDENCIES: &'static [&'static str] = &["resource"];

    fn new(record: Record) -> Self {
        Self {
            record,
            name: None,
            hit_points: 0,
            cost: Vec::new(),
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
            "hit_points" => self.hit_points = parse_number(&property.key, &property.value)?,
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
        if scope.tag != "cost" {
            return Err(DataError::UnknownScope {
                class: Self::CLASS,
                tag: scope.tag.clone(),
            });
        }

        for property in scope.properties() {
            let resource = context.require::<Resource>(&property.key)?;
            let quantity = parse_number(&property.key, &property.value)?;
            match self.cost.iter_mut().find(|(known, _)| *known == resource) {
                Some((_, existing)) => *existing = quantity,
                None => self.cost.push((resource, quantity)),
            }
        }
        Ok(())
    }

    fn finalize_text(&mut self) -> Result<(), DataError> {
        default_name(&mut self.name, &self.record);
        Ok(())
    }

    fn check(&self, _catalog: &Catalog) -> Result<(), DataError> {
        if self.hit_points <= 0 {
            return Err(DataError::invalid_value(
                "hit_points",
                &self.hit_points.to_string(),
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl Named for UnitClass {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.record.identifier())
    }
}
