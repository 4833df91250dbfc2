use database::value::parse_bool;
use database::{Catalog, ConfigContext, DataError, Handle};
use markup::PropertyNode;

use crate::data::{Resource, UnitClass};
use crate::error::ScriptError;
use crate::script::condition::{Comparison, Condition, expected_equality};
use crate::script::{Context, FactionScope, View, line, name_or_unset};
use crate::state::FactionId;

/// Compares a stored resource.
///
/// `gold >= 100`, or `resource = { resource = gold quantity >= 100 }`.
#[derive(Debug, Default)]
pub struct ResourceCondition {
    resource: Option<Handle<Resource>>,
    comparison: Option<Comparison>,
}

pub(crate) fn resource_shorthand(
    property: &PropertyNode,
    context: &ConfigContext<'_>,
) -> Option<Result<Box<dyn Condition<FactionScope>>, DataError>> {
    let resource = context.catalog.registry::<Resource>().ok()?.try_get(&property.key)?;
    Some(Comparison::parse(property).map(|comparison| {
        Box::new(ResourceCondition {
            resource: Some(resource),
            comparison: Some(comparison),
        }) as Box<dyn Condition<FactionScope>>
    }))
}

impl Condition<FactionScope> for ResourceCondition {
    fn class(&self) -> &'static str {
        "resource"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        match property.key.as_str() {
            "resource" => self.resource = Some(context.require(&property.value)?),
            "quantity" => self.comparison = Some(Comparison::parse(property)?),
            _ => {
                return Err(DataError::UnknownProperty {
                    class: "resource",
                    key: property.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.resource.is_none() || self.comparison.is_none() {
            return Err(DataError::Invalid(
                "resource: both 'resource' and 'quantity' are required".into(),
            ));
        }
        Ok(())
    }

    fn evaluate(&self, target: FactionId, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let (Some(resource), Some(comparison)) = (self.resource, self.comparison) else {
            return Err(ScriptError::unresolved("resource", "resource"));
        };
        let stored = view
            .state
            .faction(target)
            .map(|faction| faction.resource(resource))
            .unwrap_or(0);
        Ok(comparison.holds(stored))
    }

    fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let comparison = self.comparison.map(|c| c.describe()).unwrap_or_default();
        line(indent, prefix, format!("{} is {comparison}", name_or_unset(data, self.resource)))
    }
}

#[derive(Debug)]
pub struct ScoreCondition {
    comparison: Comparison,
}

impl ScoreCondition {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Condition<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            comparison: Comparison::parse(property)?,
        }))
    }
}

impl Condition<FactionScope> for ScoreCondition {
    fn class(&self) -> &'static str {
        "score"
    }

    fn evaluate(&self, target: FactionId, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let score = view.state.faction(target).map(|faction| faction.score).unwrap_or(0);
        Ok(self.comparison.holds(score))
    }

    fn description(&self, _data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Score is {}", self.comparison.describe()))
    }
}

/// `has_flag = name` (or `!=` for the flag being absent).
#[derive(Debug)]
pub struct HasFlagCondition {
    flag: String,
    expected: bool,
}

impl HasFlagCondition {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Condition<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            flag: property.value.clone(),
            expected: expected_equality(property)?,
        }))
    }
}

impl Condition<FactionScope> for HasFlagCondition {
    fn class(&self) -> &'static str {
        "has_flag"
    }

    fn evaluate(&self, target: FactionId, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let set = view
            .state
            .faction(target)
            .is_some_and(|faction| faction.flags.contains(&self.flag));
        Ok(set == self.expected)
    }

    fn description(&self, _data: &Catalog, _indent: usize, _prefix: &str) -> String {
        String::new()
    }
}

/// Number of units the faction owns.
#[derive(Debug)]
pub struct UnitsCondition {
    comparison: Comparison,
}

impl UnitsCondition {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Condition<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            comparison: Comparison::parse(property)?,
        }))
    }
}

impl Condition<FactionScope> for UnitsCondition {
    fn class(&self) -> &'static str {
        "units"
    }

    fn evaluate(&self, target: FactionId, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let count = view.state.units_of(target).count() as i64;
        Ok(self.comparison.holds(count))
    }

    fn description(&self, _data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Unit count is {}", self.comparison.describe()))
    }
}

/// `unit_class_count = { unit_class = archer count >= 3 }`
#[derive(Debug, Default)]
pub struct UnitClassCountCondition {
    class: Option<Handle<UnitClass>>,
    comparison: Option<Comparison>,
}

impl Condition<FactionScope> for UnitClassCountCondition {
    fn class(&self) -> &'static str {
        "unit_class_count"
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        match property.key.as_str() {
            "unit_class" => self.class = Some(context.require(&property.value)?),
            "count" => self.comparison = Some(Comparison::parse(property)?),
            _ => {
                return Err(DataError::UnknownProperty {
                    class: "unit_class_count",
                    key: property.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DataError> {
        if self.class.is_none() || self.comparison.is_none() {
            return Err(DataError::Invalid(
                "unit_class_count: both 'unit_class' and 'count' are required".into(),
            ));
        }
        Ok(())
    }

    fn evaluate(&self, target: FactionId, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let (Some(class), Some(comparison)) = (self.class, self.comparison) else {
            return Err(ScriptError::unresolved("unit_class_count", "unit class"));
        };
        let count = view
            .state
            .units_of(target)
            .filter(|(_, unit)| unit.class == class)
            .count() as i64;
        Ok(comparison.holds(count))
    }

    fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let comparison = self.comparison.map(|c| c.describe()).unwrap_or_default();
        line(
            indent,
            prefix,
            format!("{} units: {comparison}", name_or_unset(data, self.class)),
        )
    }
}

/// `current_faction = yes`: the scope is the faction the script runs for.
#[derive(Debug)]
pub struct CurrentFactionCondition {
    expected: bool,
}

impl CurrentFactionCondition {
    pub fn build(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Condition<FactionScope>>, DataError> {
        Ok(Box::new(Self {
            expected: parse_bool(&property.key, &property.value)?,
        }))
    }
}

impl Condition<FactionScope> for CurrentFactionCondition {
    fn class(&self) -> &'static str {
        "current_faction"
    }

    fn evaluate(&self, target: FactionId, context: &Context, _view: View<'_>) -> Result<bool, ScriptError> {
        Ok((context.current_faction == Some(target)) == self.expected)
    }

    fn description(&self, _data: &Catalog, indent: usize, prefix: &str) -> String {
        let text = if self.expected {
            "Is the current faction"
        } else {
            "Is not the current faction"
        };
        line(indent, prefix, text)
    }
}
