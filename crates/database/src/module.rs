//! Data modules: the base content plus overlay packages.
//!
//! An overlay module is a directory under a mods folder. It may carry a
//! `module.txt` manifest naming the module it builds on:
//!
//! ```text
//! parent = base
//! ```
//!
//! Modules load in registration order, so a parent always precedes the
//! modules that amend its entities.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{DataError, ModuleId};

/// Name of the optional manifest file inside an overlay module.
pub const MANIFEST_FILE: &str = "module.txt";

/// A content package contributing files to the registries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataModule {
    pub id: ModuleId,
    pub identifier: String,
    pub path: PathBuf,
    pub parent: Option<ModuleId>,
}

/// A module found on disk, before it is registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleManifest {
    pub identifier: String,
    pub path: PathBuf,
    pub parent: Option<String>,
}

impl ModuleManifest {
    /// Reads the manifest of the module rooted at `path`. A missing
    /// `module.txt` yields a module without a parent.
    pub fn read(path: &Path) -> Result<Self, DataError> {
        let identifier = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let manifest_path = path.join(MANIFEST_FILE);
        let parent = if manifest_path.is_file() {
            let manifest = markup::parse_file(&manifest_path)?;
            manifest.property_value("parent").map(str::to_owned)
        } else {
            None
        };

        Ok(Self {
            identifier,
            path: path.to_path_buf(),
            parent,
        })
    }
}

/// Lists overlay modules under `mods_dir` in a parents-first order.
///
/// Siblings are ordered by identifier. A manifest naming a parent that is
/// neither in `known` nor among the discovered modules fails with
/// [`DataError::UnknownModule`].
pub fn discover_modules(mods_dir: &Path, known: &[&str]) -> Result<Vec<ModuleManifest>, DataError> {
    let read_dir = std::fs::read_dir(mods_dir).map_err(|source| DataError::Io {
        path: mods_dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| DataError::Io {
            path: mods_dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            found.push(ModuleManifest::read(&entry.path())?);
        }
    }
    found.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    let mut available: Vec<String> = known.iter().map(|name| (*name).to_owned()).collect();
    let mut ordered = Vec::with_capacity(found.len());

    while !found.is_empty() {
        let ready = found.iter().position(|manifest| {
            manifest
                .parent
                .as_ref()
                .is_none_or(|parent| available.contains(parent))
        });

        let Some(index) = ready else {
            let blocked = &found[0];
            return Err(DataError::UnknownModule(
                blocked.parent.clone().unwrap_or_default(),
            ));
        };

        let manifest = found.remove(index);
        debug!(
            module = %manifest.identifier,
            parent = ?manifest.parent,
            "discovered overlay module"
        );
        available.push(manifest.identifier.clone());
        ordered.push(manifest);
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn module(root: &Path, name: &str, parent: Option<&str>) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(parent) = parent {
            std::fs::write(dir.join(MANIFEST_FILE), format!("parent = {parent}\n")).unwrap();
        }
    }

    #[test]
    fn parents_come_first() {
        let dir = TempDir::new().unwrap();
        module(dir.path(), "a_addon", Some("z_core"));
        module(dir.path(), "z_core", Some("base"));
        module(dir.path(), "standalone", None);

        let order: Vec<_> = discover_modules(dir.path(), &["base"])
            .unwrap()
            .into_iter()
            .map(|manifest| manifest.identifier)
            .collect();

        assert_eq!(order, ["standalone", "z_core", "a_addon"]);
    }

    #[test]
    fn missing_parent_fails() {
        let dir = TempDir::new().unwrap();
        module(dir.path(), "orphan", Some("nowhere"));

        let error = discover_modules(dir.path(), &["base"]).unwrap_err();
        assert!(matches!(error, DataError::UnknownModule(ref name) if name == "nowhere"));
    }
}
