use core::marker::PhantomData;

use database::{Catalog, ConfigContext, DataError};
use markup::{PropertyNode, ScopeNode};

use crate::error::ScriptError;
use crate::script::condition::{Comparison, Condition, Conditions};
use crate::script::effect::ScopeSelector;
use crate::script::{Context, ScopeType, View, line};

/// `and = { ... }`: every nested condition holds.
pub struct AndCondition<S: ScopeType> {
    conditions: Conditions<S>,
}

/// `or = { ... }`: at least one nested condition holds.
pub struct OrCondition<S: ScopeType> {
    conditions: Conditions<S>,
}

/// `not = { ... }`: none of the nested conditions holds.
pub struct NotCondition<S: ScopeType> {
    conditions: Conditions<S>,
}

macro_rules! list_condition {
    ($name:ident, $class:literal, $heading:literal, |$list:ident, $target:ident, $context:ident, $view:ident| $evaluate:expr) => {
        impl<S: ScopeType> Default for $name<S> {
            fn default() -> Self {
                Self {
                    conditions: Conditions::new(),
                }
            }
        }

        impl<S: ScopeType> Condition<S> for $name<S> {
            fn class(&self) -> &'static str {
                $class
            }

            fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
                self.conditions.process_property(property, context)
            }

            fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
                self.conditions.process_scope(scope, context)
            }

            fn finish(&mut self) -> Result<(), DataError> {
                if self.conditions.is_empty() {
                    return Err(DataError::Invalid(format!("{}: no conditions given", $class)));
                }
                Ok(())
            }

            fn check(&self, data: &Catalog) -> Result<(), DataError> {
                self.conditions.check(data)
            }

            fn evaluate(&self, $target: S::Ref, $context: &Context, $view: View<'_>) -> Result<bool, ScriptError> {
                let $list = &self.conditions;
                $evaluate
            }

            fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
                self.conditions.headed_description($heading, data, indent, prefix)
            }
        }
    };
}

list_condition!(AndCondition, "and", "All of:", |list, target, context, view| list
    .evaluate(target, context, view));
list_condition!(OrCondition, "or", "Any of:", |list, target, context, view| list
    .any(target, context, view));
list_condition!(NotCondition, "not", "None of:", |list, target, context, view| list
    .any(target, context, view)
    .map(|any| !any));

/// `tick >= N`: compares the simulation tick.
#[derive(Debug)]
pub struct TickCondition {
    comparison: Comparison,
}

impl TickCondition {
    pub fn build<S: ScopeType>(
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<Box<dyn Condition<S>>, DataError> {
        Ok(Box::new(Self {
            comparison: Comparison::parse(property)?,
        }))
    }
}

impl<S: ScopeType> Condition<S> for TickCondition {
    fn class(&self) -> &'static str {
        "tick"
    }

    fn evaluate(&self, _target: S::Ref, _context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        let tick = i64::try_from(view.state.tick).unwrap_or(i64::MAX);
        Ok(self.comparison.holds(tick))
    }

    fn description(&self, _data: &Catalog, indent: usize, prefix: &str) -> String {
        line(indent, prefix, format!("Tick is {}", self.comparison.describe()))
    }
}

/// Evaluates nested conditions against a related entity. False when there
/// is no such entity.
pub struct ScopeCondition<From: ScopeType, To: ScopeType, Sel> {
    selector: Sel,
    conditions: Conditions<To>,
    marker: PhantomData<fn(From)>,
}

impl<From: ScopeType, To: ScopeType, Sel: Default> Default for ScopeCondition<From, To, Sel> {
    fn default() -> Self {
        Self {
            selector: Sel::default(),
            conditions: Conditions::new(),
            marker: PhantomData,
        }
    }
}

impl<From, To, Sel> Condition<From> for ScopeCondition<From, To, Sel>
where
    From: ScopeType,
    To: ScopeType,
    Sel: ScopeSelector<From, To>,
{
    fn class(&self) -> &'static str {
        <Sel as ScopeSelector<From, To>>::CLASS
    }

    fn process_property(&mut self, property: &PropertyNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        if self.selector.process_property(property, context)? {
            return Ok(());
        }
        self.conditions.process_property(property, context)
    }

    fn process_scope(&mut self, scope: &ScopeNode, context: &ConfigContext<'_>) -> Result<(), DataError> {
        self.conditions.process_scope(scope, context)
    }

    fn finish(&mut self) -> Result<(), DataError> {
        self.selector.finish()
    }

    fn check(&self, data: &Catalog) -> Result<(), DataError> {
        self.conditions.check(data)
    }

    fn evaluate(&self, target: From::Ref, context: &Context, view: View<'_>) -> Result<bool, ScriptError> {
        match self.selector.select(target, context, view) {
            Some(next) => self.conditions.evaluate(next, context, view),
            None => Ok(false),
        }
    }

    fn description(&self, data: &Catalog, indent: usize, prefix: &str) -> String {
        let heading = self.selector.heading(data);
        self.conditions.headed_description(&heading, data, indent, prefix)
    }
}
