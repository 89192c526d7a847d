//! Notes repository
//!
//! Title-keyed plain-text notes. Titles are unique within the collection, and
//! changing a note's title moves the record in a single store transaction so
//! an interrupted rename can never lose the note.

use crate::error::{Result, ScribeError};
use crate::storage::{CollectionSpec, Store, StoreLocation, WriteOutcome};
use serde::{Deserialize, Serialize};

/// Database name for the notes store
pub const NOTES_DB_NAME: &str = "notes";
/// Current notes schema version
pub const NOTES_DB_VERSION: u32 = 1;
/// Collection holding every note, keyed by title
pub const NOTES: CollectionSpec = CollectionSpec::new("notes", "title");

/// A single note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique, non-empty title; also the record key
    pub title: String,
    /// Free-form body text
    pub body: String,
}

/// Domain operations over the notes collection
#[derive(Debug, Clone)]
pub struct NotesRepository {
    store: Store,
}

impl NotesRepository {
    /// Wrap an already opened store that declares the [`NOTES`] collection
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Open the notes database at `location`
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::StorageUnavailable` if the database cannot be opened
    pub async fn open(location: &StoreLocation) -> Result<Self> {
        let store = Store::open(location, NOTES_DB_NAME, NOTES_DB_VERSION, &[NOTES]).await?;
        Ok(Self::new(store))
    }

    /// Save a note, creating, replacing or renaming as needed
    ///
    /// # Arguments
    ///
    /// * `title` - New title; trimmed, must not be empty
    /// * `body` - Note body; trimmed
    /// * `previous_title` - Title the note had when editing started, `None` for a new note
    ///
    /// # Errors
    ///
    /// - `ScribeError::Validation` if the trimmed title is empty
    /// - `ScribeError::DuplicateTitle` if a new note, or a rename target,
    ///   collides with a different existing note
    ///
    /// In both error cases nothing is written.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe::notes::NotesRepository;
    /// use scribe::storage::StoreLocation;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> scribe::error::Result<()> {
    /// let notes = NotesRepository::open(&StoreLocation::Temporary).await?;
    /// notes.save("Draft", "first pass", None).await?;
    /// notes.save("Final", "first pass", Some("Draft")).await?;
    ///
    /// let titles: Vec<String> = notes.list_all().await?.into_iter().map(|n| n.title).collect();
    /// assert_eq!(titles, vec!["Final".to_string()]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save(&self, title: &str, body: &str, previous_title: Option<&str>) -> Result<Note> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ScribeError::Validation("Title cannot be empty".to_string()).into());
        }

        let note = Note {
            title: title.to_string(),
            body: body.trim().to_string(),
        };

        let outcome = match previous_title.map(str::trim) {
            None => self.store.insert_new(NOTES.name, &note).await?,
            Some(previous) if previous != title => {
                tracing::info!("Renaming note '{}' to '{}'", previous, title);
                self.store.rekey(NOTES.name, previous, &note).await?
            }
            Some(_) => {
                self.store.put(NOTES.name, &note).await?;
                WriteOutcome::Written
            }
        };

        match outcome {
            WriteOutcome::Written => Ok(note),
            WriteOutcome::KeyTaken => {
                tracing::debug!("Rejected save: title '{}' already taken", title);
                Err(ScribeError::DuplicateTitle(note.title).into())
            }
        }
    }

    /// Load a note by title
    pub async fn get(&self, title: &str) -> Result<Option<Note>> {
        self.store.get(NOTES.name, title).await
    }

    /// All notes sorted ascending by title (case-sensitive)
    pub async fn list_all(&self) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self.store.get_all(NOTES.name).await?;
        notes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(notes)
    }

    /// Delete a note; deleting a missing title is a no-op
    pub async fn remove(&self, title: &str) -> Result<()> {
        self.store.delete(NOTES.name, title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::as_scribe_error;

    async fn repo() -> NotesRepository {
        NotesRepository::open(&StoreLocation::Temporary)
            .await
            .expect("open notes")
    }

    fn titles(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_save_new_note_is_listed_once() {
        let notes = repo().await;
        notes.save("Groceries", "eggs, milk", None).await.unwrap();

        let all = notes.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Groceries");
        assert_eq!(all[0].body, "eggs, milk");
    }

    #[tokio::test]
    async fn test_save_trims_title_and_body() {
        let notes = repo().await;
        let saved = notes.save("  Todo  ", "\n  call back \n", None).await.unwrap();
        assert_eq!(saved.title, "Todo");
        assert_eq!(saved.body, "call back");
        assert!(notes.get("Todo").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let notes = repo().await;
        let err = notes.save("   ", "body", None).await.unwrap_err();
        assert!(matches!(
            as_scribe_error(&err),
            Some(ScribeError::Validation(_))
        ));
        assert!(notes.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_new_note_leaves_original() {
        let notes = repo().await;
        notes.save("Ideas", "original", None).await.unwrap();

        let err = notes.save("Ideas", "replacement", None).await.unwrap_err();
        assert!(matches!(
            as_scribe_error(&err),
            Some(ScribeError::DuplicateTitle(t)) if t == "Ideas"
        ));
        assert_eq!(notes.get("Ideas").await.unwrap().unwrap().body, "original");
    }

    #[tokio::test]
    async fn test_rename_replaces_old_title() {
        let notes = repo().await;
        notes.save("A", "body", None).await.unwrap();
        notes.save("B", "body", Some("A")).await.unwrap();

        let all = notes.list_all().await.unwrap();
        assert_eq!(titles(&all), vec!["B"]);
    }

    #[tokio::test]
    async fn test_rename_onto_third_note_is_rejected() {
        let notes = repo().await;
        notes.save("A", "alpha", None).await.unwrap();
        notes.save("C", "gamma", None).await.unwrap();

        let err = notes.save("C", "alpha edited", Some("A")).await.unwrap_err();
        assert!(matches!(
            as_scribe_error(&err),
            Some(ScribeError::DuplicateTitle(_))
        ));

        assert_eq!(notes.get("A").await.unwrap().unwrap().body, "alpha");
        assert_eq!(notes.get("C").await.unwrap().unwrap().body, "gamma");
    }

    #[tokio::test]
    async fn test_edit_same_title_overwrites_body() {
        let notes = repo().await;
        notes.save("Log", "day one", None).await.unwrap();
        notes.save("Log", "day two", Some("Log")).await.unwrap();

        let all = notes.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].body, "day two");
    }

    #[tokio::test]
    async fn test_list_all_sorted_by_title() {
        let notes = repo().await;
        for title in ["Zebra", "Apple", "Mango"] {
            notes.save(title, "", None).await.unwrap();
        }
        let all = notes.list_all().await.unwrap();
        assert_eq!(titles(&all), vec!["Apple", "Mango", "Zebra"]);
    }

    #[tokio::test]
    async fn test_list_all_is_case_sensitive() {
        let notes = repo().await;
        for title in ["banana", "Cherry", "apple"] {
            notes.save(title, "", None).await.unwrap();
        }
        let all = notes.list_all().await.unwrap();
        assert_eq!(titles(&all), vec!["Cherry", "apple", "banana"]);
    }

    #[tokio::test]
    async fn test_remove_deletes_note() {
        let notes = repo().await;
        notes.save("Temp", "x", None).await.unwrap();
        notes.remove("Temp").await.unwrap();
        notes.remove("Temp").await.unwrap();
        assert!(notes.get("Temp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notes_survive_reopen() {
        let (location, _dir) = crate::test_utils::temp_location();
        {
            let notes = NotesRepository::open(&location).await.unwrap();
            notes.save("Keep", "me around", None).await.unwrap();
        }

        let notes = NotesRepository::open(&location).await.unwrap();
        let kept = notes.get("Keep").await.unwrap().unwrap();
        assert_eq!(kept.body, "me around");
    }

    #[tokio::test]
    async fn test_previous_title_with_padding_updates_in_place() {
        let notes = repo().await;
        notes.save("A", "one", None).await.unwrap();

        let saved = notes.save("A", "two", Some(" A ")).await.unwrap();
        assert_eq!(saved.body, "two");

        let all = notes.list_all().await.unwrap();
        assert_eq!(titles(&all), vec!["A"]);
        assert_eq!(all[0].body, "two");
    }
}
