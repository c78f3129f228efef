//! Observable in-memory collection

use crate::game::{Game, RecordId};
use crate::LibraryError;
use std::collections::BTreeMap;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Sort keys for the collection view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Title ascending, case-sensitive
    Title,
    /// Newest first
    DateAdded,
}

/// Change notifications sent to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    Added { index: usize, id: i64 },
    Removed { ids: Vec<i64> },
    Sorted(SortKey),
    Replaced { count: usize },
    Cleared,
    RecordLinked { index: usize, record_id: RecordId },
}

/// The ordered list of games on display
///
/// Mutations take `&mut self`, so there is one writer at a time; readers
/// follow changes through [`CollectionStore::subscribe`].
pub struct CollectionStore {
    games: Vec<Game>,
    events: broadcast::Sender<CollectionEvent>,
}

impl Default for CollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            games: Vec::new(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: CollectionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn get(&self, index: usize) -> Option<&Game> {
        self.games.get(index)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.games.iter().any(|g| g.id == id)
    }

    /// Append a game and return its index
    pub fn add(&mut self, game: Game) -> usize {
        let id = game.id;
        self.games.push(game);
        let index = self.games.len() - 1;
        self.notify(CollectionEvent::Added { index, id });
        index
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Game, LibraryError> {
        let mut removed = self.remove_indices(&[index])?;
        removed
            .pop()
            .ok_or(LibraryError::IndexOutOfRange { index, len: self.len() })
    }

    /// Remove several games at once
    ///
    /// Every index is checked before anything is removed. Duplicates are
    /// ignored. Removed games come back in ascending index order.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Result<Vec<Game>, LibraryError> {
        let len = self.games.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(LibraryError::IndexOutOfRange { index, len });
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut removed: Vec<Game> = sorted
            .iter()
            .rev()
            .map(|&i| self.games.remove(i))
            .collect();
        removed.reverse();

        if !removed.is_empty() {
            self.notify(CollectionEvent::Removed {
                ids: removed.iter().map(|g| g.id).collect(),
            });
        }
        Ok(removed)
    }

    pub fn sort_by_title(&mut self) {
        self.games.sort_by(|a, b| a.title.cmp(&b.title));
        self.notify(CollectionEvent::Sorted(SortKey::Title));
    }

    pub fn sort_by_date(&mut self) {
        self.games.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        self.notify(CollectionEvent::Sorted(SortKey::DateAdded));
    }

    pub fn sort_by(&mut self, key: SortKey) {
        match key {
            SortKey::Title => self.sort_by_title(),
            SortKey::DateAdded => self.sort_by_date(),
        }
    }

    /// Swap in a whole collection, e.g. after a cold-start load
    pub fn replace_all(&mut self, games: Vec<Game>) {
        let count = games.len();
        self.games = games;
        self.notify(CollectionEvent::Replaced { count });
    }

    pub fn clear(&mut self) -> Vec<Game> {
        let games = std::mem::take(&mut self.games);
        self.notify(CollectionEvent::Cleared);
        games
    }

    /// Attach the record-store handle acknowledged for the game at `index`
    pub fn link_record(&mut self, index: usize, record_id: RecordId) -> Result<(), LibraryError> {
        let len = self.games.len();
        let game = self
            .games
            .get_mut(index)
            .ok_or(LibraryError::IndexOutOfRange { index, len })?;
        game.record_id = Some(record_id.clone());
        self.notify(CollectionEvent::RecordLinked { index, record_id });
        Ok(())
    }

    /// Games whose title contains `text`, ignoring case
    pub fn search_titles(&self, text: &str) -> Vec<&Game> {
        let needle = text.to_lowercase();
        self.games
            .iter()
            .filter(|g| g.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Games grouped by platform name; a game appears under each of its platforms
    pub fn by_platform(&self) -> BTreeMap<String, Vec<&Game>> {
        let mut groups: BTreeMap<String, Vec<&Game>> = BTreeMap::new();
        for game in &self.games {
            for platform in &game.platforms {
                groups.entry(platform.name.clone()).or_default().push(game);
            }
        }
        groups
    }
}
