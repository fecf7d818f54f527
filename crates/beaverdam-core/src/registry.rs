//! Display names and the document paths they project
//!
//! Display names are unique; paths are not. Several names may share a
//! path, and lookups by path then behave differently depending on their
//! form: a single-path lookup returns the first name in registration
//! order, while a multi-path lookup returns every matching name.

use crate::criteria::ROW_INDEX_KEY;
use crate::error::RegistryError;
use crate::path::FieldPath;
use crate::table::SELECTION_STATE_COLUMN;

/// Names that cannot be registered as fields
pub const RESERVED_NAMES: [&str; 2] = [SELECTION_STATE_COLUMN, ROW_INDEX_KEY];

/// Which registered fields a lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelector<'a> {
    /// Every registered field, in registration order
    All,
    /// A single name or path
    One(&'a str),
    /// Several names or paths
    Many(&'a [&'a str]),
}

/// Bidirectional mapping between display names and dotted paths
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<(String, FieldPath)>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(display_name, path)` pairs in order.
    pub fn from_pairs<I, N, P>(pairs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<FieldPath>,
    {
        let mut registry = Self::new();
        for (name, path) in pairs {
            registry.register(name, path)?;
        }
        Ok(registry)
    }

    /// Register a new field. Fails if the display name is already taken or
    /// is one of [`RESERVED_NAMES`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        path: impl Into<FieldPath>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(RegistryError::ReservedField(name));
        }
        if self.contains_name(&name) {
            return Err(RegistryError::DuplicateField(name));
        }
        self.fields.push((name, path.into()));
        Ok(())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(display_name, path)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldPath)> {
        self.fields.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Path registered for a display name
    pub fn path_for(&self, name: &str) -> Result<&FieldPath, RegistryError> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| RegistryError::UnknownField(name.to_string()))
    }

    /// Paths registered for several display names, in the order requested
    pub fn paths_for(&self, names: &[&str]) -> Result<Vec<&FieldPath>, RegistryError> {
        names.iter().map(|name| self.path_for(name)).collect()
    }

    /// First display name (in registration order) registered for a path
    pub fn name_for(&self, path: &str) -> Result<&str, RegistryError> {
        self.fields
            .iter()
            .find(|(_, p)| p.as_str() == path)
            .map(|(n, _)| n.as_str())
            .ok_or_else(|| RegistryError::UnknownField(path.to_string()))
    }

    /// Every display name whose path is among `paths`, in registration order.
    ///
    /// Each requested path must be registered.
    pub fn names_for(&self, paths: &[&str]) -> Result<Vec<&str>, RegistryError> {
        for path in paths {
            self.name_for(path)?;
        }
        Ok(self
            .fields
            .iter()
            .filter(|(_, p)| paths.contains(&p.as_str()))
            .map(|(n, _)| n.as_str())
            .collect())
    }

    /// Resolve a selector of display names to paths.
    pub fn resolve_paths(&self, names: FieldSelector<'_>) -> Result<Vec<&FieldPath>, RegistryError> {
        match names {
            FieldSelector::All => Ok(self.fields.iter().map(|(_, p)| p).collect()),
            FieldSelector::One(name) => Ok(vec![self.path_for(name)?]),
            FieldSelector::Many(names) => self.paths_for(names),
        }
    }

    /// Resolve a selector of paths to display names.
    pub fn resolve_names(&self, paths: FieldSelector<'_>) -> Result<Vec<&str>, RegistryError> {
        match paths {
            FieldSelector::All => Ok(self.fields.iter().map(|(n, _)| n.as_str()).collect()),
            FieldSelector::One(path) => Ok(vec![self.name_for(path)?]),
            FieldSelector::Many(paths) => self.names_for(paths),
        }
    }

    /// Select the fields to project into a result table.
    pub fn projection(&self, names: FieldSelector<'_>) -> Result<Projection, RegistryError> {
        let columns = match names {
            FieldSelector::All => self.fields.clone(),
            FieldSelector::One(name) => vec![(name.to_string(), self.path_for(name)?.clone())],
            FieldSelector::Many(names) => names
                .iter()
                .map(|name| Ok((name.to_string(), self.path_for(name)?.clone())))
                .collect::<Result<_, RegistryError>>()?,
        };
        Ok(Projection { columns })
    }
}

/// An ordered set of `(display_name, path)` columns to project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    columns: Vec<(String, FieldPath)>,
}

impl Projection {
    /// Iterate over the projected columns in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldPath)> {
        self.columns.iter().map(|(n, p)| (n.as_str(), p))
    }

    /// Display names of the projected columns
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Distinct paths to request from a document store
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::with_capacity(self.columns.len());
        for (_, path) in &self.columns {
            if !paths.contains(&path.as_str()) {
                paths.push(path.as_str());
            }
        }
        paths
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn music_registry() -> FieldRegistry {
        FieldRegistry::from_pairs([
            ("genre", "info.genre"),
            ("artist", "info.artist.name"),
            ("style", "info.genre"),
        ])
        .unwrap()
    }

    #[test]
    fn register_duplicate_fails() {
        let mut reg = music_registry();
        let err = reg.register("genre", "other.path").unwrap_err();
        assert_eq!(err, RegistryError::DuplicateField("genre".into()));
        assert_eq!(reg.len(), 3);
    }

    #[rstest]
    #[case("selectionState")]
    #[case("row_index")]
    fn reserved_names_cannot_be_registered(#[case] name: &str) {
        let mut reg = music_registry();
        assert_eq!(
            reg.register(name, "info.anything").unwrap_err(),
            RegistryError::ReservedField(name.into())
        );
        assert!(!reg.contains_name(name));
        assert!(FieldRegistry::from_pairs([(name, "info.anything")]).is_err());
    }

    #[test]
    fn path_lookups() {
        let reg = music_registry();
        assert_eq!(reg.path_for("artist").unwrap().as_str(), "info.artist.name");
        let paths: Vec<&str> = reg
            .paths_for(&["style", "artist"])
            .unwrap()
            .iter()
            .map(|p| p.as_str())
            .collect();
        assert_eq!(paths, ["info.genre", "info.artist.name"]);
        assert_eq!(reg.resolve_paths(FieldSelector::All).unwrap().len(), 3);
    }

    #[test]
    fn unknown_names_and_paths_fail() {
        let reg = music_registry();
        assert_eq!(
            reg.path_for("year").unwrap_err(),
            RegistryError::UnknownField("year".into())
        );
        assert!(reg.paths_for(&["genre", "year"]).is_err());
        assert!(reg.name_for("info.year").is_err());
        assert!(reg.names_for(&["info.genre", "info.year"]).is_err());
    }

    #[test]
    fn shared_path_single_lookup_returns_first_name() {
        let reg = music_registry();
        assert_eq!(reg.name_for("info.genre").unwrap(), "genre");
        assert_eq!(
            reg.resolve_names(FieldSelector::One("info.genre")).unwrap(),
            ["genre"]
        );
    }

    #[test]
    fn shared_path_multi_lookup_returns_all_names() {
        let reg = music_registry();
        assert_eq!(
            reg.names_for(&["info.genre"]).unwrap(),
            ["genre", "style"]
        );
        assert_eq!(
            reg.resolve_names(FieldSelector::Many(&["info.artist.name", "info.genre"]))
                .unwrap(),
            ["genre", "artist", "style"]
        );
    }

    #[test]
    fn projection_dedups_paths() {
        let reg = music_registry();
        let projection = reg.projection(FieldSelector::All).unwrap();
        assert_eq!(projection.names(), ["genre", "artist", "style"]);
        assert_eq!(projection.paths(), ["info.genre", "info.artist.name"]);

        let single = reg.projection(FieldSelector::One("artist")).unwrap();
        assert_eq!(single.len(), 1);
        assert!(reg.projection(FieldSelector::Many(&["nope"])).is_err());
    }
}
