use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    filter_by_state, filter_by_text, summarize, Item, ItemError, ItemId, ItemKind, NewItem,
    StateFilter, Summary,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),
    #[error("expected a {expected:?}, got a {found:?}")]
    WrongKind { expected: ItemKind, found: ItemKind },
    #[error(transparent)]
    Item(#[from] ItemError),
}

/// The ordered items owned by a single screen, newest first.
#[derive(Clone, Debug)]
pub struct Collection {
    kind: ItemKind,
    items: Vec<Item>,
}

impl Collection {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn with_items(kind: ItemKind, items: Vec<Item>) -> Result<Self, CollectionError> {
        let mut seen = HashSet::with_capacity(items.len());

        for item in &items {
            if item.kind() != kind {
                return Err(CollectionError::WrongKind {
                    expected: kind,
                    found: item.kind(),
                });
            }

            if !seen.insert(item.id()) {
                return Err(CollectionError::DuplicateId(item.id()));
            }
        }

        Ok(Self { kind, items })
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn add(&mut self, new: NewItem, now: DateTime<Utc>) -> Result<&Item, CollectionError> {
        if new.kind != self.kind {
            return Err(CollectionError::WrongKind {
                expected: self.kind,
                found: new.kind,
            });
        }

        let item = Item::new(new, now)?;

        // ids stay unique for the lifetime of the collection
        if self.get(item.id()).is_some() {
            return Err(CollectionError::DuplicateId(item.id()));
        }

        self.items.insert(0, item);
        Ok(&self.items[0])
    }

    pub fn toggle(&mut self, id: ItemId, now: DateTime<Utc>) -> Result<&Item, CollectionError> {
        let item = self.get_mut(id)?;
        item.toggle(now);
        Ok(&*item)
    }

    /// Completes the item, leaving an already completed one untouched.
    pub fn mark_complete(
        &mut self,
        id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<&Item, CollectionError> {
        let item = self.get_mut(id)?;
        item.complete(now);
        Ok(&*item)
    }

    pub fn search(&self, query: &str) -> Vec<&Item> {
        filter_by_text(&self.items, query)
    }

    pub fn summary(&self, now: DateTime<Utc>) -> Summary {
        summarize(&self.items, &self.items, now)
    }

    pub fn search_summary(&self, query: &str, now: DateTime<Utc>) -> Summary {
        summarize(&self.items, self.search(query), now)
    }

    pub fn state_summary(&self, filter: StateFilter, now: DateTime<Utc>) -> Summary {
        summarize(&self.items, filter_by_state(&self.items, filter, now), now)
    }

    fn get_mut(&mut self, id: ItemId) -> Result<&mut Item, CollectionError> {
        (self.items.iter_mut())
            .find(|item| item.id() == id)
            .ok_or(CollectionError::NotFound(id))
    }
}
