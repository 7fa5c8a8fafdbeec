//! Language handles and the name registry.

use super::table::GrammarTable;
use crate::lexer::{ExternalScanner, ExternalScannerFactory};
use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

/// Opaque, read-only handle to a language's grammar
///
/// This is what a language binding's entry point returns. Cloning is an
/// `Arc` bump; any number of parsers on any number of threads may share
/// one handle.
#[derive(Clone)]
pub struct Language {
    inner: Arc<LanguageInner>,
}

struct LanguageInner {
    table: GrammarTable,
    scanner: Option<Arc<dyn ExternalScannerFactory>>,
}

impl Language {
    pub fn new(table: GrammarTable) -> Self {
        Self {
            inner: Arc::new(LanguageInner {
                table,
                scanner: None,
            }),
        }
    }

    /// A language whose external tokens are recognised by scanners from
    /// `factory`. Each parser creates its own scanner instance.
    pub fn with_scanner(table: GrammarTable, factory: impl ExternalScannerFactory + 'static) -> Self {
        Self {
            inner: Arc::new(LanguageInner {
                table,
                scanner: Some(Arc::new(factory)),
            }),
        }
    }

    pub fn table(&self) -> &GrammarTable {
        &self.inner.table
    }

    pub fn name(&self) -> &str {
        self.inner.table.name()
    }

    pub fn has_scanner(&self) -> bool {
        self.inner.scanner.is_some()
    }

    pub(crate) fn create_scanner(&self) -> Option<Box<dyn ExternalScanner>> {
        self.inner.scanner.as_ref().map(|factory| factory.create())
    }

    /// Whether both handles refer to the same loaded grammar
    pub fn ptr_eq(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("symbols", &self.table().symbol_count())
            .field("states", &self.table().state_count())
            .field("scanner", &self.has_scanner())
            .finish()
    }
}

/// Maps language names to loaded handles, in registration order
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    languages: RwLock<IndexMap<SmolStr, Language>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the grammar's own name, returning any handle it replaced.
    pub fn register(&self, language: Language) -> Option<Language> {
        let name = SmolStr::new(language.name());
        self.languages.write().insert(name, language)
    }

    pub fn get(&self, name: &str) -> Option<Language> {
        self.languages.read().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Language> {
        self.languages.write().shift_remove(name)
    }

    pub fn names(&self) -> Vec<SmolStr> {
        self.languages.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.languages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.read().is_empty()
    }
}
