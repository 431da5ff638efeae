//! In-memory record stores.
//!
//! Each store is a minimal key-value container owning its own map, keyed by
//! the opaque record identifier. Identifiers are always generated by the
//! server, so there are no uniqueness constraints beyond key identity. A
//! fetch of a missing key yields `None`; the catalogue layer turns that
//! into the appropriate domain error.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{Author, AuthorId, Book, BookId};

/// Store for author records.
pub type AuthorStore = InMemoryStore<AuthorId, Author>;

/// Store for book records.
pub type BookStore = InMemoryStore<BookId, Book>;

/// An in-memory record store backed by a HashMap.
///
/// Records are owned by the store; lookups return references and removal
/// returns the record. Enumeration order is unspecified.
#[derive(Debug, Clone)]
pub struct InMemoryStore<K, R> {
    records: HashMap<K, R>,
}

impl<K: Eq + Hash, R> InMemoryStore<K, R> {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Store a record under the given id.
    ///
    /// Replaces and returns any record already stored under that id.
    pub fn insert(&mut self, id: K, record: R) -> Option<R> {
        self.records.insert(id, record)
    }

    /// Retrieve a record by id.
    pub fn get(&self, id: &K) -> Option<&R> {
        self.records.get(id)
    }

    /// Retrieve a record by id for in-place mutation.
    pub fn get_mut(&mut self, id: &K) -> Option<&mut R> {
        self.records.get_mut(id)
    }

    /// Check if a record with the given id exists.
    pub fn contains(&self, id: &K) -> bool {
        self.records.contains_key(id)
    }

    /// Remove a record by id, returning it if it existed.
    pub fn remove(&mut self, id: &K) -> Option<R> {
        self.records.remove(id)
    }

    /// Iterate over all records with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &R)> {
        self.records.iter()
    }

    /// Get the number of records in the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store contains no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<K: Eq + Hash, R> Default for InMemoryStore<K, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdSet;

    fn test_author(name: &str) -> Author {
        Author::new(name, "Tester", 1970, IdSet::new())
    }

    #[test]
    fn test_store_new_is_empty() {
        let store = AuthorStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = AuthorStore::new();
        let id = AuthorId::generate();

        let previous = store.insert(id.clone(), test_author("Ada"));
        assert!(previous.is_none());

        let fetched = store.get(&id);
        assert_eq!(fetched.map(|a| a.name()), Some("Ada"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing() {
        let store = AuthorStore::new();
        assert!(store.get(&AuthorId::from_string("missing")).is_none());
    }

    #[test]
    fn test_store_insert_replaces() {
        let mut store = AuthorStore::new();
        let id = AuthorId::generate();

        store.insert(id.clone(), test_author("Before"));
        let previous = store.insert(id.clone(), test_author("After"));

        assert_eq!(previous.map(|a| a.name().to_string()), Some("Before".into()));
        assert_eq!(store.get(&id).map(|a| a.name()), Some("After"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_contains() {
        let mut store = AuthorStore::new();
        let id = AuthorId::generate();

        assert!(!store.contains(&id));
        store.insert(id.clone(), test_author("Ada"));
        assert!(store.contains(&id));
    }

    #[test]
    fn test_store_get_mut() {
        let mut store = AuthorStore::new();
        let id = AuthorId::generate();
        store.insert(id.clone(), test_author("Ada"));

        let book = BookId::from_string("b1");
        if let Some(author) = store.get_mut(&id) {
            author.add_book(book.clone());
        }

        assert!(store.get(&id).is_some_and(|a| a.book_ids().contains(&book)));
    }

    #[test]
    fn test_store_remove() {
        let mut store = AuthorStore::new();
        let id = AuthorId::generate();
        store.insert(id.clone(), test_author("Ada"));

        let removed = store.remove(&id);
        assert_eq!(removed.map(|a| a.name().to_string()), Some("Ada".into()));
        assert!(store.is_empty());

        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn test_store_iter() {
        let mut store = AuthorStore::new();
        let id1 = AuthorId::generate();
        let id2 = AuthorId::generate();
        store.insert(id1.clone(), test_author("One"));
        store.insert(id2.clone(), test_author("Two"));

        let ids: Vec<&AuthorId> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&&id1));
        assert!(ids.contains(&&id2));
    }

    #[test]
    fn test_store_clear() {
        let mut store = AuthorStore::new();
        store.insert(AuthorId::generate(), test_author("One"));
        store.insert(AuthorId::generate(), test_author("Two"));

        assert_eq!(store.len(), 2);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_book_store() {
        use chrono::NaiveDate;

        let mut store = BookStore::new();
        let id = BookId::generate();
        let book = crate::model::Book::new(
            "Dune",
            IdSet::new(),
            "Chilton",
            1,
            NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
        );

        store.insert(id.clone(), book);
        assert_eq!(store.get(&id).map(|b| b.title()), Some("Dune"));
    }
}
