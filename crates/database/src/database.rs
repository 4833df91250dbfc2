//! Pipeline driver owning the catalog, the registered types and the modules.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::module::discover_modules;
use crate::pipeline::{TypeMetadata, enqueue_root};
use crate::{Catalog, DataEntry, DataError, DataModule, ModuleId, Registry};

/// Extension of data files when none is configured.
pub const DEFAULT_FILE_EXTENSION: &str = "txt";

/// Runs the load pipeline over every registered type:
///
/// ```text
/// parse -> define -> configure -> initialize -> finalize_text -> validate
/// ```
///
/// Every pass runs over all types, in dependency order, before the next pass
/// starts. Types are registered once at startup; [`Database::clear`] drops
/// the loaded entities but keeps the registrations and modules so
/// [`Database::reload`] can rebuild everything from disk.
pub struct Database {
    catalog: Catalog,
    types: Vec<TypeMetadata>,
    modules: Vec<DataModule>,
    file_extension: String,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            types: Vec::new(),
            modules: Vec::new(),
            file_extension: DEFAULT_FILE_EXTENSION.to_owned(),
        }
    }

    /// Sets the extension (without the dot) of files read by the parse pass.
    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry<T: DataEntry>(&self) -> Result<&Registry<T>, DataError> {
        self.catalog.registry::<T>()
    }

    pub fn types(&self) -> &[TypeMetadata] {
        &self.types
    }

    pub fn modules(&self) -> &[DataModule] {
        &self.modules
    }

    pub fn module(&self, identifier: &str) -> Option<&DataModule> {
        self.modules
            .iter()
            .find(|module| module.identifier == identifier)
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Registers a data type. Must happen before anything is loaded.
    pub fn register<T: DataEntry>(&mut self) -> Result<(), DataError> {
        let metadata = TypeMetadata::of::<T>();
        if self.types.iter().any(|known| known.class == metadata.class)
            || !(metadata.insert)(&mut self.catalog)
        {
            return Err(DataError::DuplicateType { class: T::CLASS });
        }

        debug!(class = T::CLASS, folder = ?T::FOLDER, "registered data type");
        self.types.push(metadata);
        Ok(())
    }

    /// Appends a module to the load order. `parent` must already be added.
    pub fn add_module(
        &mut self,
        identifier: impl Into<String>,
        path: impl Into<PathBuf>,
        parent: Option<&str>,
    ) -> Result<ModuleId, DataError> {
        let identifier = identifier.into();
        if self.module(&identifier).is_some() {
            return Err(DataError::DuplicateModule(identifier));
        }

        let parent = match parent {
            Some(name) => Some(
                self.module(name)
                    .map(|module| module.id)
                    .ok_or_else(|| DataError::UnknownModule(name.to_owned()))?,
            ),
            None => None,
        };

        let id = ModuleId(self.modules.len() as u32);
        let path = path.into();
        info!(module = %identifier, path = %path.display(), "added data module");
        self.modules.push(DataModule {
            id,
            identifier,
            path,
            parent,
        });
        Ok(id)
    }

    /// Adds every overlay module found under `mods_dir`, parents first.
    pub fn add_overlay_modules(&mut self, mods_dir: &Path) -> Result<Vec<ModuleId>, DataError> {
        let known: Vec<&str> = self
            .modules
            .iter()
            .map(|module| module.identifier.as_str())
            .collect();
        let manifests = discover_modules(mods_dir, &known)?;

        manifests
            .into_iter()
            .map(|manifest| {
                self.add_module(manifest.identifier, manifest.path, manifest.parent.as_deref())
            })
            .collect()
    }

    /// Registered types in the order every pass visits them.
    ///
    /// Kahn's algorithm over the declared dependencies; among types whose
    /// dependencies are all satisfied, the earliest registered goes first.
    pub fn load_order(&self) -> Result<Vec<&TypeMetadata>, DataError> {
        let count = self.types.len();
        let mut remaining: Vec<usize> = vec![0; count];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

        for (index, metadata) in self.types.iter().enumerate() {
            for &dependency in metadata.dependencies {
                let Some(target) = self.types.iter().position(|t| t.class == dependency) else {
                    return Err(DataError::UnknownDependency {
                        class: metadata.class,
                        dependency,
                    });
                };
                remaining[index] += 1;
                dependents[target].push(index);
            }
        }

        let mut done = vec![false; count];
        let mut order = Vec::with_capacity(count);
        while let Some(next) = (0..count).find(|&i| !done[i] && remaining[i] == 0) {
            done[next] = true;
            order.push(&self.types[next]);
            for &dependent in &dependents[next] {
                remaining[dependent] -= 1;
            }
        }

        if order.len() < count {
            let classes = (0..count)
                .filter(|&i| !done[i])
                .map(|i| self.types[i].class)
                .collect();
            return Err(DataError::DependencyCycle { classes });
        }

        Ok(order)
    }

    fn ordered(&self) -> Result<Vec<TypeMetadata>, DataError> {
        Ok(self.load_order()?.into_iter().copied().collect())
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Reads every module's files for every type into the pending queues.
    pub fn parse(&mut self) -> Result<usize, DataError> {
        let order = self.ordered()?;
        let mut total = 0;

        for module in &self.modules {
            for metadata in &order {
                total += (metadata.parse)(&mut self.catalog, module, &self.file_extension).map_err(
                    |source| DataError::Module {
                        module: module.identifier.clone(),
                        source: Box::new(source),
                    },
                )?;
            }
        }

        info!(definitions = total, modules = self.modules.len(), "parsed data files");
        Ok(total)
    }

    /// Queues definitions from in-memory text as if read from `module`.
    pub fn enqueue_text<T: DataEntry>(&mut self, module: ModuleId, text: &str) -> Result<usize, DataError> {
        if module.rank() as usize >= self.modules.len() {
            return Err(DataError::UnknownModule(format!("#{}", module.rank())));
        }
        let root = markup::parse_tagged(text, T::CLASS)?;
        enqueue_root(self.catalog.registry_mut::<T>()?, module, root)
    }

    pub fn define(&mut self) -> Result<usize, DataError> {
        self.run_pass("define", |metadata| metadata.define)
    }

    pub fn configure(&mut self) -> Result<usize, DataError> {
        self.run_pass("configure", |metadata| metadata.configure)
    }

    pub fn initialize(&mut self) -> Result<usize, DataError> {
        self.run_pass("initialize", |metadata| metadata.initialize)
    }

    pub fn finalize_text(&mut self) -> Result<usize, DataError> {
        self.run_pass("finalize_text", |metadata| metadata.finalize_text)
    }

    fn run_pass(
        &mut self,
        name: &'static str,
        select: impl Fn(&TypeMetadata) -> fn(&mut Catalog, &[DataModule]) -> Result<usize, DataError>,
    ) -> Result<usize, DataError> {
        let mut total = 0;
        for metadata in self.ordered()? {
            total += select(&metadata)(&mut self.catalog, &self.modules)?;
        }
        info!(pass = name, entities = total, "completed pass");
        Ok(total)
    }

    /// Checks every entity of every type, collecting all failures.
    pub fn validation_errors(&self) -> Result<Vec<DataError>, DataError> {
        let mut errors = Vec::new();
        for metadata in self.load_order()? {
            errors.extend((metadata.validate)(&self.catalog, &self.modules));
        }
        Ok(errors)
    }

    /// Fails with [`DataError::Validation`] if any entity fails its check.
    pub fn validate(&self) -> Result<(), DataError> {
        let errors = self.validation_errors()?;
        if errors.is_empty() {
            info!("validation passed");
            Ok(())
        } else {
            warn!(errors = errors.len(), "validation failed");
            Err(DataError::Validation(errors))
        }
    }

    /// Runs every pass except validation.
    pub fn build(&mut self) -> Result<(), DataError> {
        self.parse()?;
        self.define()?;
        self.configure()?;
        self.initialize()?;
        self.finalize_text()?;
        Ok(())
    }

    /// Runs the whole pipeline, validation included.
    pub fn load(&mut self) -> Result<(), DataError> {
        self.build()?;
        self.validate()
    }

    /// Drops every entity, alias and pending definition of every type.
    pub fn clear(&mut self) {
        for metadata in &self.types {
            (metadata.clear)(&mut self.catalog);
        }
        info!("cleared database");
    }

    /// Clears and loads again from the registered modules.
    ///
    /// Definitions queued with [`Database::enqueue_text`] are not replayed.
    pub fn reload(&mut self) -> Result<(), DataError> {
        self.clear();
        self.load()
    }
}
