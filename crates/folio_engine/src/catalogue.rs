//! The catalogue: both record stores behind one lock, and the operations
//! that keep their cross-reference lists consistent.
//!
//! Every id appearing in an author's `book_ids` must refer to a stored
//! book whose `author_ids` contains that author, and vice versa. Each
//! mutating operation validates against both stores before its first
//! write, under the single write lock, so a failed operation leaves no
//! partial update and a concurrent reader never observes one in progress.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::model::{Author, AuthorId, Book, BookId};
use crate::store::{AuthorStore, BookStore};

/// Classification of a rejected catalogue operation.
///
/// The HTTP layer maps these to status codes; NotFound is surfaced as 400
/// in this interface, not 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The target record of the operation does not exist.
    NotFound,
    /// The operation would violate a catalogue invariant.
    Conflict,
    /// The request referenced records that do not exist.
    BadRequest,
}

/// Why a catalogue operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    /// The author targeted by the operation is absent.
    AuthorNotFound { id: AuthorId },

    /// The book targeted by the operation is absent.
    BookNotFound { id: BookId },

    /// A book referenced from an author payload does not exist.
    MissingBookReference { id: BookId },

    /// An author referenced from a book payload does not exist.
    MissingAuthorReference { id: AuthorId },

    /// The author is still credited on books and cannot be deleted.
    AuthorHasBooks { id: AuthorId, book_count: usize },
}

impl CatalogueError {
    /// Classify this error for the interface layer.
    ///
    /// Author-side dangling references are conflicts (409 on the wire)
    /// while book-side ones are bad requests (400). The asymmetry is part
    /// of the service contract.
    pub fn class(&self) -> ErrorClass {
        match self {
            CatalogueError::AuthorNotFound { .. } | CatalogueError::BookNotFound { .. } => {
                ErrorClass::NotFound
            }
            CatalogueError::MissingBookReference { .. }
            | CatalogueError::AuthorHasBooks { .. } => ErrorClass::Conflict,
            CatalogueError::MissingAuthorReference { .. } => ErrorClass::BadRequest,
        }
    }
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueError::AuthorNotFound { id }
            | CatalogueError::MissingAuthorReference { id } => {
                write!(f, "Author with ID {} not found", id)
            }
            CatalogueError::BookNotFound { id } | CatalogueError::MissingBookReference { id } => {
                write!(f, "Book with ID {} not found", id)
            }
            CatalogueError::AuthorHasBooks { id, book_count } => {
                write!(
                    f,
                    "Cannot delete author {}: Author has {} books associated",
                    id, book_count
                )
            }
        }
    }
}

impl std::error::Error for CatalogueError {}

/// Result type for catalogue operations.
pub type CatalogueResult<T> = std::result::Result<T, CatalogueError>;

/// Both stores, guarded together.
///
/// The compound operations read and write both maps; holding them under
/// one lock keeps validation and the multi-record writes atomic.
#[derive(Debug, Default)]
struct CatalogueState {
    authors: AuthorStore,
    books: BookStore,
}

/// Handle to the catalogue.
///
/// Cheap to clone (Arc); clones share the same underlying stores. Mutating
/// operations take the write lock for their whole validate-then-write
/// span; reads take the shared read lock.
#[derive(Debug, Clone, Default)]
pub struct Catalogue(Arc<RwLock<CatalogueState>>);

impl Catalogue {
    /// Create a new, empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Author operations ==========

    /// Store a new author, returning its freshly assigned id.
    ///
    /// Every referenced book must exist; otherwise the operation fails
    /// with [`CatalogueError::MissingBookReference`] and nothing is stored.
    /// On success the new author is credited on every referenced book.
    pub fn create_author(&self, author: Author) -> CatalogueResult<AuthorId> {
        let mut state = self.0.write();

        for book_id in author.book_ids() {
            if !state.books.contains(book_id) {
                debug!(book_id = %book_id, "author creation rejected: unknown book");
                return Err(CatalogueError::MissingBookReference {
                    id: book_id.clone(),
                });
            }
        }

        let id = AuthorId::generate();
        for book_id in author.book_ids() {
            if let Some(book) = state.books.get_mut(book_id) {
                book.add_author(id.clone());
            }
        }
        state.authors.insert(id.clone(), author);

        debug!(author_id = %id, "author created");
        Ok(id)
    }

    /// Fetch an author by id.
    pub fn author(&self, id: &AuthorId) -> CatalogueResult<Author> {
        self.0
            .read()
            .authors
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogueError::AuthorNotFound { id: id.clone() })
    }

    /// Enumerate all authors with their ids. Order is unspecified.
    pub fn authors(&self) -> Vec<(AuthorId, Author)> {
        self.0
            .read()
            .authors
            .iter()
            .map(|(id, author)| (id.clone(), author.clone()))
            .collect()
    }

    /// Get the number of stored authors.
    pub fn author_count(&self) -> usize {
        self.0.read().authors.len()
    }

    /// Replace an author record, reconciling reverse references.
    ///
    /// The record stored under `id` is replaced wholesale by `author`.
    /// Books dropped from the author's list lose the author credit; books
    /// added to it must exist (otherwise
    /// [`CatalogueError::MissingBookReference`], with no mutation) and gain
    /// it. Books on both lists are untouched.
    pub fn update_author(&self, id: &AuthorId, author: Author) -> CatalogueResult<AuthorId> {
        let mut state = self.0.write();

        let old_ids = match state.authors.get(id) {
            Some(current) => current.book_ids().clone(),
            None => return Err(CatalogueError::AuthorNotFound { id: id.clone() }),
        };
        let new_ids = author.book_ids().clone();

        for added in new_ids.iter().filter(|b| !old_ids.contains(b)) {
            if !state.books.contains(added) {
                debug!(author_id = %id, book_id = %added, "author update rejected: unknown book");
                return Err(CatalogueError::MissingBookReference { id: added.clone() });
            }
        }

        for removed in old_ids.iter().filter(|b| !new_ids.contains(b)) {
            if let Some(book) = state.books.get_mut(removed) {
                book.remove_author(id);
            }
        }
        for added in new_ids.iter().filter(|b| !old_ids.contains(b)) {
            if let Some(book) = state.books.get_mut(added) {
                book.add_author(id.clone());
            }
        }
        state.authors.insert(id.clone(), author);

        debug!(author_id = %id, "author updated");
        Ok(id.clone())
    }

    /// Delete an author.
    ///
    /// Fails with [`CatalogueError::AuthorHasBooks`] while the author is
    /// still credited on any book; no cleanup happens in that case.
    pub fn delete_author(&self, id: &AuthorId) -> CatalogueResult<AuthorId> {
        let mut state = self.0.write();

        let book_count = match state.authors.get(id) {
            Some(author) => author.book_count(),
            None => return Err(CatalogueError::AuthorNotFound { id: id.clone() }),
        };
        if book_count > 0 {
            debug!(author_id = %id, book_count, "author deletion rejected: still credited");
            return Err(CatalogueError::AuthorHasBooks {
                id: id.clone(),
                book_count,
            });
        }

        state.authors.remove(id);
        debug!(author_id = %id, "author deleted");
        Ok(id.clone())
    }

    // ========== Book operations ==========

    /// Store a new book, returning its freshly assigned id.
    ///
    /// Every referenced author must exist (a blank id never does);
    /// otherwise the operation fails with
    /// [`CatalogueError::MissingAuthorReference`] and nothing is stored.
    /// On success the new book is added to every referenced author's list.
    pub fn create_book(&self, book: Book) -> CatalogueResult<BookId> {
        let mut state = self.0.write();

        for author_id in book.author_ids() {
            if author_id.is_blank() || !state.authors.contains(author_id) {
                debug!(author_id = %author_id, "book creation rejected: unknown author");
                return Err(CatalogueError::MissingAuthorReference {
                    id: author_id.clone(),
                });
            }
        }

        let id = BookId::generate();
        for author_id in book.author_ids() {
            if let Some(author) = state.authors.get_mut(author_id) {
                author.add_book(id.clone());
            }
        }
        state.books.insert(id.clone(), book);

        debug!(book_id = %id, "book created");
        Ok(id)
    }

    /// Fetch a book by id.
    pub fn book(&self, id: &BookId) -> CatalogueResult<Book> {
        self.0
            .read()
            .books
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogueError::BookNotFound { id: id.clone() })
    }

    /// Enumerate all books with their ids. Order is unspecified.
    pub fn books(&self) -> Vec<(BookId, Book)> {
        self.0
            .read()
            .books
            .iter()
            .map(|(id, book)| (id.clone(), book.clone()))
            .collect()
    }

    /// Get the number of stored books.
    pub fn book_count(&self) -> usize {
        self.0.read().books.len()
    }

    /// Replace a book record, reconciling reverse references.
    ///
    /// Every author in the new list must exist (blank ids never do);
    /// otherwise [`CatalogueError::MissingAuthorReference`] with no
    /// mutation. Authors dropped from the book's list lose the book,
    /// authors added to it gain it, unchanged ones are untouched.
    pub fn update_book(&self, id: &BookId, book: Book) -> CatalogueResult<BookId> {
        let mut state = self.0.write();

        let old_ids = match state.books.get(id) {
            Some(current) => current.author_ids().clone(),
            None => return Err(CatalogueError::BookNotFound { id: id.clone() }),
        };
        let new_ids = book.author_ids().clone();

        for author_id in new_ids.iter() {
            if author_id.is_blank() || !state.authors.contains(author_id) {
                debug!(book_id = %id, author_id = %author_id, "book update rejected: unknown author");
                return Err(CatalogueError::MissingAuthorReference {
                    id: author_id.clone(),
                });
            }
        }

        for removed in old_ids.iter().filter(|a| !new_ids.contains(a)) {
            if let Some(author) = state.authors.get_mut(removed) {
                author.remove_book(id);
            }
        }
        for added in new_ids.iter().filter(|a| !old_ids.contains(a)) {
            if let Some(author) = state.authors.get_mut(added) {
                author.add_book(id.clone());
            }
        }
        state.books.insert(id.clone(), book);

        debug!(book_id = %id, "book updated");
        Ok(id.clone())
    }

    /// Delete a book, cascading the cleanup.
    ///
    /// The book's id is removed from every referencing author that still
    /// exists, then the record itself is removed. Nothing blocks book
    /// deletion.
    pub fn delete_book(&self, id: &BookId) -> CatalogueResult<BookId> {
        let mut state = self.0.write();

        let book = match state.books.remove(id) {
            Some(book) => book,
            None => return Err(CatalogueError::BookNotFound { id: id.clone() }),
        };
        for author_id in book.author_ids() {
            if let Some(author) = state.authors.get_mut(author_id) {
                author.remove_book(id);
            }
        }

        debug!(book_id = %id, "book deleted");
        Ok(id.clone())
    }
}
