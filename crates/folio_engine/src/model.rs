//! Data model for the catalogue: author and book records, their opaque
//! identifiers, and the insertion-order-preserving id set used for the
//! cross-reference lists on both sides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an author.
///
/// Identifiers are opaque strings, generated server-side as UUID v4. They
/// are never supplied by clients at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorId(String);

impl AuthorId {
    /// Generate a fresh unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an AuthorId from an existing string representation.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace-only.
    ///
    /// Blank identifiers can arrive in request payloads; they never match a
    /// stored record.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a book.
///
/// Same scheme as [`AuthorId`]: opaque server-generated UUID v4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(String);

impl BookId {
    /// Generate a fresh unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a BookId from an existing string representation.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An insertion-order-preserving set of identifiers.
///
/// Cross-reference lists are semantically sets: duplicates collapse, first
/// occurrence wins. The boundary still speaks ordered JSON sequences, so
/// the set is Vec-backed and serializes in insertion order. Deserializing a
/// sequence deduplicates on the way in.
///
/// # Examples
/// ```
/// use folio_engine::model::{BookId, IdSet};
///
/// let ids: IdSet<BookId> = [
///     BookId::from_string("b1"),
///     BookId::from_string("b2"),
///     BookId::from_string("b1"),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(ids.len(), 2);
/// assert!(ids.contains(&BookId::from_string("b1")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IdSet<T>(Vec<T>);

impl<T: PartialEq> IdSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a value if it is not already present.
    ///
    /// Returns `true` if the value was inserted, `false` if it was already
    /// in the set.
    pub fn insert(&mut self, value: T) -> bool {
        if self.0.contains(&value) {
            false
        } else {
            self.0.push(value);
            true
        }
    }

    /// Remove a value, preserving the order of the remaining entries.
    ///
    /// Returns `true` if the value was present.
    pub fn remove(&mut self, value: &T) -> bool {
        match self.0.iter().position(|v| v == value) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    /// Check whether a value is present.
    pub fn contains(&self, value: &T) -> bool {
        self.0.contains(value)
    }

    /// Iterate over the values in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    /// Returns the values as a slice, in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Get the number of values in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: PartialEq> FromIterator<T> for IdSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a IdSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// Deserialization accepts any JSON sequence and collapses duplicates,
// keeping the first occurrence of each value.
impl<'de, T> Deserialize<'de> for IdSet<T>
where
    T: Deserialize<'de> + PartialEq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = Vec::<T>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

/// An author record.
///
/// The `book_ids` field is the author's cross-reference list: the books
/// this author is credited on. It must stay consistent with the
/// `author_ids` lists of those books; the catalogue maintains that
/// invariant, record types only provide the mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    name: String,
    surname: String,
    birthyear: i32,
    book_ids: IdSet<BookId>,
}

impl Author {
    /// Create a new author record.
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        birthyear: i32,
        book_ids: IdSet<BookId>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            birthyear,
            book_ids,
        }
    }

    /// Returns the author's first name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the author's last name.
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// Returns the year the author was born.
    pub fn birthyear(&self) -> i32 {
        self.birthyear
    }

    /// Returns the books this author is credited on.
    pub fn book_ids(&self) -> &IdSet<BookId> {
        &self.book_ids
    }

    /// Returns the number of books this author is credited on.
    pub fn book_count(&self) -> usize {
        self.book_ids.len()
    }

    /// Credit this author on a book. Idempotent.
    ///
    /// Returns `true` if the book was newly added.
    pub fn add_book(&mut self, id: BookId) -> bool {
        self.book_ids.insert(id)
    }

    /// Remove a book credit from this author.
    ///
    /// Returns `true` if the book was present.
    pub fn remove_book(&mut self, id: &BookId) -> bool {
        self.book_ids.remove(id)
    }
}

/// A book record.
///
/// `author_ids` mirrors [`Author::book_ids`] from the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: String,
    author_ids: IdSet<AuthorId>,
    publisher: String,
    edition: i32,
    published_date: NaiveDate,
}

impl Book {
    /// Create a new book record.
    pub fn new(
        title: impl Into<String>,
        author_ids: IdSet<AuthorId>,
        publisher: impl Into<String>,
        edition: i32,
        published_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            author_ids,
            publisher: publisher.into(),
            edition,
            published_date,
        }
    }

    /// Returns the title of the book.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the authors credited on this book.
    pub fn author_ids(&self) -> &IdSet<AuthorId> {
        &self.author_ids
    }

    /// Returns the publisher name.
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Returns the edition number.
    pub fn edition(&self) -> i32 {
        self.edition
    }

    /// Returns the publication date.
    pub fn published_date(&self) -> NaiveDate {
        self.published_date
    }

    /// Credit an author on this book. Idempotent.
    ///
    /// Returns `true` if the author was newly added.
    pub fn add_author(&mut self, id: AuthorId) -> bool {
        self.author_ids.insert(id)
    }

    /// Remove an author credit from this book.
    ///
    /// Returns `true` if the author was present.
    pub fn remove_author(&mut self, id: &AuthorId) -> bool {
        self.author_ids.remove(id)
    }
}
