//! Generic implementations of the load passes.
//!
//! Each pass is a plain function monomorphized per data type and stored as a
//! function pointer in [`TypeMetadata`], so the driver can run the passes over
//! heterogeneous types in dependency order without knowing them statically.

use std::path::{Path, PathBuf};

use markup::{Element, Operator, ScopeNode};
use tracing::{debug, trace};

use crate::entry::configure_entry;
use crate::registry::PendingDefinition;
use crate::{
    ALIASES_KEY, Catalog, ConfigContext, DataEntry, DataError, DataModule, ModuleId, Registry,
    Stage,
};

type ModulePass = fn(&mut Catalog, &DataModule, &str) -> Result<usize, DataError>;
type CatalogPass = fn(&mut Catalog, &[DataModule]) -> Result<usize, DataError>;

/// Static description of a registered data type and its pass functions.
#[derive(Clone, Copy)]
pub struct TypeMetadata {
    pub class: &'static str,
    pub folder: Option<&'static str>,
    pub dependencies: &'static [&'static str],
    pub(crate) insert: fn(&mut Catalog) -> bool,
    pub(crate) parse: ModulePass,
    pub(crate) define: CatalogPass,
    pub(crate) configure: CatalogPass,
    pub(crate) initialize: CatalogPass,
    pub(crate) finalize_text: CatalogPass,
    pub(crate) validate: fn(&Catalog, &[DataModule]) -> Vec<DataError>,
    pub(crate) clear: fn(&mut Catalog),
}

impl TypeMetadata {
    pub fn of<T: DataEntry>() -> Self {
        Self {
            class: T::CLASS,
            folder: T::FOLDER,
            dependencies: T::DEPENDENCIES,
            insert: Catalog::insert::<T>,
            parse: parse_module::<T>,
            define: define::<T>,
            configure: configure::<T>,
            initialize: initialize::<T>,
            finalize_text: finalize_text::<T>,
            validate: validate::<T>,
            clear: clear::<T>,
        }
    }

    /// Whether this type declares a dependency on `class`.
    pub fn depends_on(&self, class: &str) -> bool {
        self.dependencies.contains(&class)
    }
}

impl std::fmt::Debug for TypeMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("class", &self.class)
            .field("folder", &self.folder)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

fn module_name(modules: &[DataModule], id: ModuleId) -> String {
    modules
        .get(id.rank() as usize)
        .map(|module| module.identifier.clone())
        .unwrap_or_default()
}

fn entity_error<T: DataEntry>(
    stage: Stage,
    identifier: &str,
    module: String,
    source: DataError,
) -> DataError {
    DataError::Entity {
        stage,
        class: T::CLASS,
        identifier: identifier.to_owned(),
        module,
        source: Box::new(source),
    }
}

// ============================================================================
// Parse
// ============================================================================

/// Files under `dir` with the given extension, recursively, in path order.
fn collect_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, DataError> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let read_dir = std::fs::read_dir(&current).map_err(|source| DataError::Io {
            path: current.clone(),
            source,
        })?;
        for entry in read_dir {
            let path = entry
                .map_err(|source| DataError::Io {
                    path: current.clone(),
                    source,
                })?
                .path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Queues every top-level scope of a parsed file as a pending definition.
pub(crate) fn enqueue_root<T: DataEntry>(
    registry: &mut Registry<T>,
    module: ModuleId,
    root: ScopeNode,
) -> Result<usize, DataError> {
    if let Some(value) = root.values.first() {
        return Err(DataError::Invalid(format!(
            "unexpected top-level value '{value}' in '{}'",
            root.tag
        )));
    }

    let mut count = 0;
    for element in root.elements {
        match element {
            Element::Scope(node) => {
                registry.enqueue(module, node);
                count += 1;
            }
            Element::Property(property) => {
                return Err(DataError::Invalid(format!(
                    "unexpected top-level property '{}' in '{}'",
                    property.key, root.tag
                )));
            }
        }
    }
    Ok(count)
}

fn parse_module<T: DataEntry>(
    catalog: &mut Catalog,
    module: &DataModule,
    extension: &str,
) -> Result<usize, DataError> {
    let Some(folder) = T::FOLDER else {
        return Ok(0);
    };
    let dir = module.path.join(folder);
    if !dir.is_dir() {
        return Ok(0);
    }

    let registry = catalog.registry_mut::<T>()?;
    let mut count = 0;
    for path in collect_files(&dir, extension)? {
        trace!(class = T::CLASS, path = %path.display(), "reading definitions");
        let root = markup::parse_file(&path)?;
        count += enqueue_root(registry, module.id, root)?;
    }
    Ok(count)
}

// ============================================================================
// Define
// ============================================================================

fn define<T: DataEntry>(catalog: &mut Catalog, modules: &[DataModule]) -> Result<usize, DataError> {
    let registry = catalog.registry_mut::<T>()?;
    registry.sort_pending();
    let pending = registry.take_pending();
    let result = define_all(registry, &pending, modules);
    registry.restore_pending(pending);
    result
}

fn define_all<T: DataEntry>(
    registry: &mut Registry<T>,
    pending: &[PendingDefinition],
    modules: &[DataModule],
) -> Result<usize, DataError> {
    let mut created = 0;

    for definition in pending {
        let node = &definition.node;
        let wrap = |source| {
            entity_error::<T>(Stage::Define, &node.tag, module_name(modules, definition.module), source)
        };

        let handle = if node.operator == Operator::Addition {
            registry.require(&node.tag).map_err(wrap)?
        } else {
            created += 1;
            registry.add(&node.tag, definition.module).map_err(wrap)?
        };

        for property in node.properties().filter(|p| p.key == ALIASES_KEY) {
            if property.operator != Operator::Addition {
                return Err(wrap(DataError::invalid_operator(ALIASES_KEY, property.operator)));
            }
            registry.add_alias(handle, &property.value).map_err(wrap)?;
        }
    }

    debug!(class = T::CLASS, created, amended = pending.len() - created, "defined entities");
    Ok(created)
}

// ============================================================================
// Configure
// ============================================================================

fn configure<T: DataEntry>(catalog: &mut Catalog, modules: &[DataModule]) -> Result<usize, DataError> {
    let (pending, mut entries) = {
        let registry = catalog.registry_mut::<T>()?;
        (registry.take_pending(), registry.take_entries())
    };

    let result = configure_all::<T>(catalog, modules, &pending, &mut entries);
    catalog.registry_mut::<T>()?.restore_entries(entries);
    result
}

fn configure_all<T: DataEntry>(
    catalog: &Catalog,
    modules: &[DataModule],
    pending: &[PendingDefinition],
    entries: &mut [Option<T>],
) -> Result<usize, DataError> {
    let registry = catalog.registry::<T>()?;

    for definition in pending {
        let node = &definition.node;
        let wrap = |source| {
            entity_error::<T>(Stage::Configure, &node.tag, module_name(modules, definition.module), source)
        };

        let module = modules
            .get(definition.module.rank() as usize)
            .ok_or_else(|| DataError::UnknownModule(format!("#{}", definition.module.rank())))?;
        let handle = registry.require(&node.tag).map_err(wrap)?;
        let entry = entries
            .get_mut(handle.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(DataError::StaleHandle {
                class: T::CLASS,
                index: handle.index(),
            })
            .map_err(wrap)?;

        let context = ConfigContext { catalog, module };
        configure_entry(entry, node, &context).map_err(wrap)?;
        entry.record_mut().mark_defined();
    }

    debug!(class = T::CLASS, definitions = pending.len(), "configured entities");
    Ok(pending.len())
}

// ============================================================================
// Initialize / finalize text / validate / clear
// ============================================================================

fn initialize<T: DataEntry>(catalog: &mut Catalog, modules: &[DataModule]) -> Result<usize, DataError> {
    let mut entries = catalog.registry_mut::<T>()?.take_entries();
    let result = initialize_all(catalog, modules, &mut entries);
    catalog.registry_mut::<T>()?.restore_entries(entries);
    result
}

fn initialize_all<T: DataEntry>(
    catalog: &Catalog,
    modules: &[DataModule],
    entries: &mut [Option<T>],
) -> Result<usize, DataError> {
    let mut count = 0;

    for entry in entries.iter_mut().flatten() {
        if entry.record().is_initialized() {
            continue;
        }

        let identifier = entry.record().identifier().to_owned();
        let module = module_name(modules, entry.record().module());
        let wrap =
            |source| entity_error::<T>(Stage::Initialize, &identifier, module.clone(), source);

        entry.initialize(catalog).map_err(wrap)?;
        if !entry.record().is_initialized() {
            return Err(wrap(DataError::Invalid(
                "entity was not marked initialized".into(),
            )));
        }
        count += 1;
    }

    Ok(count)
}

fn finalize_text<T: DataEntry>(catalog: &mut Catalog, modules: &[DataModule]) -> Result<usize, DataError> {
    let registry = catalog.registry_mut::<T>()?;
    let mut count = 0;

    for entry in registry.entries_mut() {
        let identifier = entry.record().identifier().to_owned();
        let module = module_name(modules, entry.record().module());
        entry
            .finalize_text()
            .map_err(|source| entity_error::<T>(Stage::FinalizeText, &identifier, module, source))?;
        count += 1;
    }

    Ok(count)
}

fn validate<T: DataEntry>(catalog: &Catalog, modules: &[DataModule]) -> Vec<DataError> {
    let registry = match catalog.registry::<T>() {
        Ok(registry) => registry,
        Err(error) => return vec![error],
    };

    let mut errors = Vec::new();
    for entry in registry.get_all() {
        let record = entry.record();
        let wrap = |source| {
            entity_error::<T>(
                Stage::Validate,
                record.identifier(),
                module_name(modules, record.module()),
                source,
            )
        };

        if !record.is_defined() {
            errors.push(wrap(DataError::Invalid("entity was never configured".into())));
        }
        if let Err(error) = entry.check(catalog) {
            errors.push(wrap(error));
        }
    }
    errors
}

fn clear<T: DataEntry>(catalog: &mut Catalog) {
    if let Ok(registry) = catalog.registry_mut::<T>() {
        registry.clear();
    }
}
