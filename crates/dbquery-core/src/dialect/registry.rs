//! Dialect lookup by name.

use std::sync::Arc;

use super::Dialect;

/// Registered dialects, looked up case-insensitively by name.
///
/// Built once at startup and passed by reference to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: Vec<Arc<Dialect>>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in dialect.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for dialect in [
            Dialect::mysql(),
            Dialect::mariadb(),
            Dialect::postgresql(),
            Dialect::mssql(),
            Dialect::h2_portable(),
            Dialect::sqlite(),
        ] {
            registry.register(dialect);
        }
        registry
    }

    /// Registers a dialect, replacing one with the same name.
    pub fn register(&mut self, dialect: Dialect) -> Arc<Dialect> {
        self.unregister(dialect.name());
        let dialect = Arc::new(dialect);
        self.dialects.push(Arc::clone(&dialect));
        dialect
    }

    /// Removes a dialect by name, returning it if present.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Dialect>> {
        let index = self
            .dialects
            .iter()
            .position(|d| d.name().eq_ignore_ascii_case(name))?;
        Some(self.dialects.remove(index))
    }

    /// Looks up a dialect by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Dialect>> {
        self.dialects
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.iter().map(|d| d.name())
    }

    /// Returns the registered dialects.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Dialect>> {
        self.dialects.iter()
    }
}
