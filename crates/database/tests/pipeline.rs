//! End-to-end pipeline tests over on-disk modules.

use std::path::Path;

use database::value::{parse_bool, parse_number};
use database::{
    Catalog, ConfigContext, DataEntry, DataError, Database, Handle, Record, Stage,
};
use markup::{Operator, PropertyNode, ScopeNode};
use tempfile::TempDir;

// ============================================================================
// Test types
// ============================================================================

struct Terrain {
    record: Record,
    movement_cost: i32,
    name: String,
}

impl DataEntry for Terrain {
    const CLASS: &'static str = "terrain";
    const FOLDER: Option<&'static str> = Some("terrains");

    fn new(record: Record) -> Self {
        Self {
            record,
            movement_cost: 1,
            name: String::new(),
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn process_property(
        &mut self,
        property: &PropertyNode,
        _context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        match property.key.as_str() {
            "movement_cost" => {
                self.movement_cost = parse_number(&property.key, &property.value)?;
            }
            "name" => self.name = property.value.clone(),
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
        if self.name.is_empty() {
            self.name = self.record.display_name();
        }
        Ok(())
    }
}

struct Unit {
    record: Record,
    strength: i32,
    terrain: Option<Handle<Terrain>>,
    traits: Vec<String>,
    elite: bool,
}

impl DataEntry for Unit {
    const CLASS: &'static str = "unit";
    const FOLDER: Option<&'static str> = Some("units");
    const DEPENDENCIES: &'static [&'static str] = &["terrain"];

    fn new(record: Record) -> Self {
        Self {
            record,
            strength: 0,
            terrain: None,
            traits: Vec::new(),
            elite: false,
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn process_property(
        &mut self,
        property: &PropertyNode,
        context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        match (property.key.as_str(), property.operator) {
            ("strength", Operator::Assignment) => {
                self.strength = parse_number(&property.key, &property.value)?;
            }
            ("strength", Operator::Addition) => {
                self.strength += parse_number::<i32>(&property.key, &property.value)?;
            }
            ("terrain", Operator::Assignment) => {
                self.terrain = context.resolve::<Terrain>(&property.value)?;
            }
            ("elite", Operator::Assignment) => {
                self.elite = parse_bool(&property.key, &property.value)?;
            }
            (key, operator) if matches!(key, "strength" | "terrain" | "elite") => {
                return Err(DataError::invalid_operator(key, operator));
            }
            _ => {
                return Err(DataError::UnknownProperty {
                    class: Self::CLASS,
                    key: property.key.clone(),
                });
            }
        }
        Ok(())
    }

    fn process_scope(
        &mut self,
        scope: &ScopeNode,
        _context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        if scope.tag != "traits" {
            return Err(DataError::UnknownScope {
                class: Self::CLASS,
                tag: scope.tag.clone(),
            });
        }
        if scope.operator == Operator::Assignment {
            self.traits.clear();
        }
        self.traits.extend(scope.values.iter().cloned());
        Ok(())
    }

    fn check(&self, _catalog: &Catalog) -> Result<(), DataError> {
        if self.strength <= 0 {
            return Err(DataError::Invalid(format!(
                "strength must be positive, got {}",
                self.strength
            )));
        }
        Ok(())
    }
}

/// Type whose initialize forgets to mark the record.
struct Forgetful {
    record: Record,
}

impl DataEntry for Forgetful {
    const CLASS: &'static str = "forgetful";

    fn new(record: Record) -> Self {
        Self { record }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn initialize(&mut self, _catalog: &Catalog) -> Result<(), DataError> {
        Ok(())
    }
}

/// Type that refers to another entity of its own type.
struct Squad {
    record: Record,
    leader: Option<Handle<Squad>>,
    leader_lookup: Option<&'static str>,
}

impl DataEntry for Squad {
    const CLASS: &'static str = "squad";

    fn new(record: Record) -> Self {
        Self {
            record,
            leader: None,
            leader_lookup: None,
        }
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn process_property(
        &mut self,
        property: &PropertyNode,
        context: &ConfigContext<'_>,
    ) -> Result<(), DataError> {
        if property.key != "leader" {
            return Err(DataError::UnknownProperty {
                class: Self::CLASS,
                key: property.key.clone(),
            });
        }
        let leader = context.require::<Squad>(&property.value)?;
        self.leader_lookup = context.catalog.entry(leader).err().map(|error| error.error_code());
        self.leader = Some(leader);
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

fn database() -> Database {
    let mut database = Database::new();
    // Registered out of dependency order on purpose.
    database.register::<Unit>().unwrap();
    database.register::<Terrain>().unwrap();
    database
}

fn unit<'a>(database: &'a Database, identifier: &str) -> &'a Unit {
    database
        .registry::<Unit>()
        .unwrap()
        .find(identifier)
        .unwrap_or_else(|| panic!("unit '{identifier}' missing"))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn load_order_follows_dependencies() {
    let database = database();
    let order: Vec<_> = database
        .load_order()
        .unwrap()
        .into_iter()
        .map(|metadata| metadata.class)
        .collect();
    assert_eq!(order, ["terrain", "unit"]);
    assert!(database.types()[0].depends_on("terrain"));
}

#[test]
fn later_module_amends_earlier_definition() {
    let base = TempDir::new().unwrap();
    let overlay = TempDir::new().unwrap();
    write(base.path(), "terrains/land.txt", "plains = { movement_cost = 1 }\n");
    write(
        base.path(),
        "units/infantry.txt",
        "spearman = {\n    strength = 5\n    terrain = plains\n    traits = { brave }\n}\n",
    );
    write(
        overlay.path(),
        "units/patch.txt",
        "spearman += {\n    strength += 2\n    traits += { stubborn }\n}\n",
    );

    let mut database = database();
    database.add_module("base", base.path(), None).unwrap();
    database
        .add_module("overlay", overlay.path(), Some("base"))
        .unwrap();
    database.load().unwrap();

    let registry = database.registry::<Unit>().unwrap();
    assert_eq!(registry.len(), 1);
    let spearman = unit(&database, "spearman");
    assert_eq!(spearman.strength, 7);
    assert_eq!(spearman.traits, ["brave", "stubborn"]);
    assert!(spearman.record().is_defined());
    assert!(spearman.record().is_initialized());

    let plains = database.catalog().require::<Terrain>("plains").unwrap();
    assert_eq!(spearman.terrain, Some(plains));
    assert_eq!(
        database.catalog().entry(plains).unwrap().name,
        "Plains"
    );
}

#[test]
fn amending_unknown_entity_fails_in_define() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/patch.txt", "ghost += { strength = 1 }\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    let error = database.load().unwrap_err();

    let DataError::Entity {
        stage,
        class,
        identifier,
        source,
        ..
    } = &error
    else {
        panic!("expected entity error, got {error:?}");
    };
    assert_eq!(*stage, Stage::Define);
    assert_eq!(*class, "unit");
    assert_eq!(identifier, "ghost");
    assert!(matches!(**source, DataError::NotFound { .. }));
}

#[test]
fn configure_failure_names_entity_and_module() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/bad.txt", "archer = { speed = 3 }\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    let error = database.load().unwrap_err();

    assert_eq!(
        error.to_string(),
        "configure failed for unit 'archer' (module 'base')"
    );
    assert_eq!(error.error_code(), "DATA_UNKNOWN_PROPERTY");
}

#[test]
fn unresolved_reference_fails_configure() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/a.txt", "archer = { strength = 1 terrain = swamp }\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    let error = database.load().unwrap_err();
    assert!(matches!(error.root_cause(), DataError::NotFound { class: "terrain", .. }));
}

#[test]
fn none_reference_resolves_to_nothing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/a.txt", "archer = { strength = 1 terrain = none }\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    database.load().unwrap();
    assert_eq!(unit(&database, "archer").terrain, None);
}

#[test]
fn validation_reports_every_bad_entity() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "units/weak.txt",
        "peasant = { strength = 0 }\nmilitia = { strength = -1 }\nknight = { strength = 9 }\n",
    );

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    database.build().unwrap();

    let errors = database.validation_errors().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(matches!(
        &errors[0],
        DataError::Entity { stage: Stage::Validate, identifier, .. } if identifier == "peasant"
    ));

    let error = database.validate().unwrap_err();
    assert!(error.report().contains("strength must be positive, got -1"));
}

#[test]
fn declared_aliases_and_separator_aliases_resolve() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "units/a.txt",
        "heavy_cavalry = {\n    aliases += knight\n    aliases += mounted_lance\n    strength = 8\n}\n",
    );

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    database.load().unwrap();

    let registry = database.registry::<Unit>().unwrap();
    let handle = registry.require("heavy_cavalry").unwrap();
    for name in ["heavy-cavalry", "knight", "mounted_lance", "mounted-lance"] {
        assert_eq!(registry.try_get(name), Some(handle), "{name}");
    }
}

#[test]
fn aliases_require_addition_operator() {
    let mut database = database();
    let base = database.add_module("base", "/nonexistent", None).unwrap();
    database
        .enqueue_text::<Unit>(base, "archer = { aliases = bowman strength = 1 }")
        .unwrap();

    let error = database.load().unwrap_err();
    assert!(matches!(
        error.root_cause(),
        DataError::InvalidOperator { operator: Operator::Assignment, .. }
    ));
}

#[test]
fn duplicate_definition_fails() {
    let mut database = database();
    let base = database.add_module("base", "/nonexistent", None).unwrap();
    database
        .enqueue_text::<Unit>(base, "archer = { strength = 1 }\narcher = { strength = 2 }")
        .unwrap();

    let error = database.load().unwrap_err();
    assert!(matches!(
        error.root_cause(),
        DataError::DuplicateIdentifier { .. }
    ));
}

#[test]
fn top_level_property_is_rejected() {
    let mut database = database();
    let base = database.add_module("base", "/nonexistent", None).unwrap();
    let error = database
        .enqueue_text::<Unit>(base, "strength = 4")
        .unwrap_err();
    assert!(matches!(error, DataError::Invalid(_)));
}

#[test]
fn initialize_must_mark_entities() {
    let mut database = Database::new();
    database.register::<Forgetful>().unwrap();
    let base = database.add_module("base", "/nonexistent", None).unwrap();
    database.enqueue_text::<Forgetful>(base, "x = { }").unwrap();

    let error = database.load().unwrap_err();
    assert!(matches!(
        error,
        DataError::Entity {
            stage: Stage::Initialize,
            ..
        }
    ));
}

#[test]
fn cycles_and_unknown_dependencies_are_fatal() {
    struct Left(Record);
    struct Right(Record);

    impl DataEntry for Left {
        const CLASS: &'static str = "left";
        const DEPENDENCIES: &'static [&'static str] = &["right"];
        fn new(record: Record) -> Self {
            Self(record)
        }
        fn record(&self) -> &Record {
            &self.0
        }
        fn record_mut(&mut self) -> &mut Record {
            &mut self.0
        }
    }

    impl DataEntry for Right {
        const CLASS: &'static str = "right";
        const DEPENDENCIES: &'static [&'static str] = &["left"];
        fn new(record: Record) -> Self {
            Self(record)
        }
        fn record(&self) -> &Record {
            &self.0
        }
        fn record_mut(&mut self) -> &mut Record {
            &mut self.0
        }
    }

    let mut database = Database::new();
    database.register::<Left>().unwrap();
    assert!(matches!(
        database.load_order(),
        Err(DataError::UnknownDependency {
            class: "left",
            dependency: "right"
        })
    ));

    database.register::<Right>().unwrap();
    let error = database.load().unwrap_err();
    let DataError::DependencyCycle { classes } = error else {
        panic!("expected cycle, got {error:?}");
    };
    assert_eq!(classes, ["left", "right"]);
}

#[test]
fn registering_twice_fails() {
    let mut database = database();
    assert!(matches!(
        database.register::<Unit>(),
        Err(DataError::DuplicateType { class: "unit" })
    ));
}

#[test]
fn reload_picks_up_changed_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/a.txt", "archer = { strength = 3 }\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    database.load().unwrap();
    assert_eq!(unit(&database, "archer").strength, 3);

    write(
        dir.path(),
        "units/a.txt",
        "archer = { strength = 4 }\nslinger = { strength = 2 }\n",
    );
    database.reload().unwrap();

    assert_eq!(unit(&database, "archer").strength, 4);
    assert_eq!(database.registry::<Unit>().unwrap().len(), 2);
}

#[test]
fn files_outside_extension_and_nested_folders() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/nested/deep.txt", "archer = { strength = 3 }\n");
    write(dir.path(), "units/readme.md", "not = markup {\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    database.load().unwrap();
    assert_eq!(unit(&database, "archer").strength, 3);
}

#[test]
fn parse_errors_are_wrapped_with_module() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "units/broken.txt", "archer = {\n");

    let mut database = database();
    database.add_module("base", dir.path(), None).unwrap();
    let error = database.load().unwrap_err();

    assert!(matches!(&error, DataError::Module { module, .. } if module == "base"));
    assert_eq!(error.error_code(), "MARKUP_UNCLOSED_SCOPE");
}

#[test]
fn overlay_modules_are_discovered() {
    let base = TempDir::new().unwrap();
    let mods = TempDir::new().unwrap();
    write(base.path(), "units/a.txt", "archer = { strength = 3 }\n");
    write(mods.path(), "buff/module.txt", "parent = base\n");
    write(mods.path(), "buff/units/a.txt", "archer += { strength += 10 }\n");

    let mut database = database();
    database.add_module("base", base.path(), None).unwrap();
    let added = database.add_overlay_modules(mods.path()).unwrap();
    assert_eq!(added.len(), 1);
    database.load().unwrap();

    assert_eq!(unit(&database, "archer").strength, 13);
    assert_eq!(
        database.module("buff").unwrap().parent,
        Some(database.module("base").unwrap().id)
    );
}

#[test]
fn same_type_entities_are_detached_while_configured() {
    let mut database = Database::new();
    database.register::<Squad>().unwrap();
    let base = database.add_module("base", "/nonexistent", None).unwrap();
    database
        .enqueue_text::<Squad>(base, "vanguard = { }\nrearguard = { leader = vanguard }")
        .unwrap();
    database.load().unwrap();

    let catalog = database.catalog();
    let vanguard = catalog.require::<Squad>("vanguard").unwrap();
    let rearguard = catalog.entry(catalog.require::<Squad>("rearguard").unwrap()).unwrap();
    assert_eq!(rearguard.leader, Some(vanguard));
    assert_eq!(rearguard.leader_lookup, Some("DATA_STALE_HANDLE"));
    assert!(catalog.entry(vanguard).is_ok());
}
