//! Per-entity bookkeeping shared by every data type.

use crate::ModuleId;

/// Identifier that never names an entity; looking it up yields "no entity".
pub const NONE_IDENTIFIER: &str = "none";

/// Separator characters that are interchangeable in identifiers.
pub const SEPARATORS: (char, char) = ('_', '-');

/// Returns the identifier with every separator swapped for its counterpart,
/// or `None` if the identifier contains no separator.
pub fn swapped_separators(identifier: &str) -> Option<String> {
    let (first, second) = SEPARATORS;
    if !identifier.contains([first, second]) {
        return None;
    }

    Some(
        identifier
            .chars()
            .map(|c| match c {
                c if c == first => second,
                c if c == second => first,
                c => c,
            })
            .collect(),
    )
}

/// Identity and lifecycle flags of a registered entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    identifier: String,
    aliases: Vec<String>,
    module: ModuleId,
    defined: bool,
    initialized: bool,
}

impl Record {
    pub(crate) fn new(identifier: String, module: ModuleId) -> Self {
        Self {
            identifier,
            aliases: Vec::new(),
            module,
            defined: false,
            initialized: false,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn push_alias(&mut self, alias: String) {
        self.aliases.push(alias);
    }

    /// Module that created the entity (amending modules do not change it).
    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub(crate) fn mark_defined(&mut self) {
        self.defined = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Display name derived from the identifier: separators become spaces
    /// and each word is capitalized.
    pub fn display_name(&self) -> String {
        self.identifier
            .split([SEPARATORS.0, SEPARATORS.1])
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_in_both_directions() {
        assert_eq!(swapped_separators("heavy_cavalry").as_deref(), Some("heavy-cavalry"));
        assert_eq!(swapped_separators("heavy-cavalry").as_deref(), Some("heavy_cavalry"));
        assert_eq!(swapped_separators("a_b-c").as_deref(), Some("a-b_c"));
        assert_eq!(swapped_separators("archer"), None);
    }

    #[test]
    fn display_name_capitalizes_words() {
        let record = Record::new("heavy_cavalry".into(), ModuleId(0));
        assert_eq!(record.display_name(), "Heavy Cavalry");
    }
}
