//! In-memory app catalog, seeded once at startup.

use crate::error::CatalogError;
use std::collections::HashMap;

/// What opening an app does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    /// Modal dialog with the app's description.
    Dialog,
    /// The keyword assistant chat.
    Assistant,
}

/// A dock entry. Immutable once seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Compatibility score, 0 to 100.
    pub rating: u8,
    pub description: String,
    pub kind: AppKind,
}

impl AppEntry {
    #[must_use]
    pub fn new(id: &str, name: &str, category: &str, rating: u8, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            rating: rating.min(100),
            description: description.to_string(),
            kind: AppKind::Dialog,
        }
    }

    #[must_use]
    pub fn assistant(mut self) -> Self {
        self.kind = AppKind::Assistant;
        self
    }
}

/// Built-in seed, in dock order.
#[must_use]
pub fn default_entries() -> Vec<AppEntry> {
    vec![
        AppEntry::new("q-browser", "Q-Browser", "Internet", 97, "Browse every branch of the multiverse at once."),
        AppEntry::new("neural-chat", "Neural Chat", "Assistant", 99, "Talk to the on-board quantum assistant.")
            .assistant(),
        AppEntry::new("q-mail", "Q-Mail", "Productivity", 92, "Messages delivered before you send them."),
        AppEntry::new("holo-studio", "Holo Studio", "Creative", 88, "Sculpt holograms in superposed layers."),
        AppEntry::new("entangle-drive", "Entangle Drive", "Storage", 94, "Files that exist everywhere you need them."),
        AppEntry::new("q-music", "Q-Music", "Media", 90, "Every song you might like, collapsed into one playlist."),
        AppEntry::new("chrono-cal", "ChronoCal", "Productivity", 86, "A calendar aware of both past and future you."),
        AppEntry::new("q-maps", "Q-Maps", "Navigation", 91, "Shortest routes through spacetime."),
        AppEntry::new("q-settings", "Settings", "System", 100, "Tune coherence, themes and notifications."),
    ]
}

/// Write-once list of apps keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AppCatalog {
    entries: Vec<AppEntry>,
    by_id: HashMap<String, usize>,
}

impl AppCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in seed.
    pub fn seeded() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.seed_default()?;
        Ok(catalog)
    }

    /// Load the built-in seed. Safe to call more than once.
    pub fn seed_default(&mut self) -> Result<usize, CatalogError> {
        self.load(default_entries())
    }

    /// Add `entries`, returning how many were new.
    ///
    /// An entry equal to one already present is skipped. An id already
    /// present with different contents fails the whole load and leaves
    /// the catalog unchanged.
    pub fn load(&mut self, entries: impl IntoIterator<Item = AppEntry>) -> Result<usize, CatalogError> {
        let mut fresh: Vec<AppEntry> = Vec::new();
        for entry in entries {
            let existing = self
                .get(&entry.id)
                .or_else(|| fresh.iter().find(|e| e.id == entry.id));
            match existing {
                Some(current) if *current == entry => {}
                Some(_) => return Err(CatalogError::Conflict { id: entry.id }),
                None => fresh.push(entry),
            }
        }
        let added = fresh.len();
        for entry in fresh {
            self.by_id.insert(entry.id.clone(), self.entries.len());
            self.entries.push(entry);
        }
        Ok(added)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AppEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    /// Entry at dock position `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&AppEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_default_loads_every_entry() {
        let mut catalog = AppCatalog::new();
        let added = catalog.seed_default().unwrap();
        assert_eq!(added, default_entries().len());
        assert_eq!(catalog.len(), added);
        assert_eq!(catalog.at(0).unwrap().id, "q-browser");
    }

    #[test]
    fn test_seeding_twice_is_idempotent() {
        let mut catalog = AppCatalog::seeded().unwrap();
        let before = catalog.entries().to_vec();
        assert_eq!(catalog.seed_default().unwrap(), 0);
        assert_eq!(catalog.entries(), before.as_slice());
    }

    #[test]
    fn test_conflicting_id_rejected_and_catalog_unchanged() {
        let mut catalog = AppCatalog::seeded().unwrap();
        let len = catalog.len();
        let result = catalog.load([
            AppEntry::new("q-new", "New", "Misc", 50, "new"),
            AppEntry::new("q-mail", "Q-Mail 2", "Productivity", 10, "other"),
        ]);
        assert_eq!(
            result,
            Err(CatalogError::Conflict {
                id: "q-mail".to_string()
            })
        );
        assert_eq!(catalog.len(), len);
        assert!(catalog.get("q-new").is_none());
    }

    #[test]
    fn test_duplicates_within_one_load() {
        let mut catalog = AppCatalog::new();
        let entry = AppEntry::new("x", "X", "Misc", 1, "x");
        assert_eq!(catalog.load([entry.clone(), entry]).unwrap(), 1);

        let clash = [
            AppEntry::new("y", "Y", "Misc", 1, "y"),
            AppEntry::new("y", "Y", "Misc", 2, "y"),
        ];
        assert!(catalog.load(clash).is_err());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_ids_unique_and_ratings_in_range() {
        let entries = default_entries();
        let catalog = AppCatalog::seeded().unwrap();
        assert_eq!(catalog.len(), entries.len());
        assert!(entries.iter().all(|e| e.rating <= 100));
        assert_eq!(AppEntry::new("z", "Z", "Misc", 250, "").rating, 100);
    }

    #[test]
    fn test_exactly_one_assistant_app() {
        let catalog = AppCatalog::seeded().unwrap();
        let assistants: Vec<_> = catalog
            .entries()
            .iter()
            .filter(|e| e.kind == AppKind::Assistant)
            .collect();
        assert_eq!(assistants.len(), 1);
        assert_eq!(assistants[0].name, "Neural Chat");
    }
}
