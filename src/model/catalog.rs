// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Media catalog management.
//!
//! This module provides the [`Catalog`], the owner of every playable item
//! known to the application. It keeps items in insertion order, maintains the
//! exact-term [`SearchIndex`], deduplicates authors by name and answers the
//! popularity ranking queries used for recommendations.

use std::{borrow::Cow, cmp::Ordering, collections::HashMap};

use crate::model::{
    AudioItem, Author, AuthorId, ItemId, ItemKind, Release, ReleaseId, compare_popularity,
    search::{SearchIndex, normalize},
};

const RECOMMENDATION_LIMIT: usize = 5;

#[derive(Debug, Default)]
pub(crate) struct Catalog {
    items: Vec<AudioItem>,
    index: SearchIndex,
    authors: HashMap<AuthorId, Author>,
    author_cache: HashMap<String, AuthorId>,
    releases: HashMap<ReleaseId, Release>,
}

impl Catalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the author registered under `name`, ignoring case, creating
    /// and caching a new one if none exists yet.
    pub(crate) fn get_or_create_author(&mut self, name: &str) -> AuthorId {
        let key = normalize(name);
        if let Some(&id) = self.author_cache.get(&key) {
            return id;
        }

        let author = Author::new(name);
        let id = author.id();
        self.author_cache.insert(key, id);
        self.authors.insert(id, author);
        id
    }

    /// Registers an existing author, replacing any cache entry for its name.
    pub(crate) fn insert_author(&mut self, author: Author) -> AuthorId {
        let id = author.id();
        self.author_cache.insert(normalize(author.name()), id);
        self.authors.insert(id, author);
        id
    }

    pub(crate) fn author(&self, id: AuthorId) -> Option<&Author> {
        self.authors.get(&id)
    }

    pub(crate) fn authors(&self) -> impl Iterator<Item = &Author> {
        self.authors.values()
    }

    pub(crate) fn add_genre(&mut self, author: AuthorId, genre: &str) -> bool {
        self.authors
            .get_mut(&author)
            .is_some_and(|a| a.add_genre(genre))
    }

    pub(crate) fn create_release(&mut self, title: &str, author: AuthorId, year: i32) -> ReleaseId {
        self.insert_release(Release::new(title, author, year))
    }

    pub(crate) fn insert_release(&mut self, release: Release) -> ReleaseId {
        let id = release.id();
        self.releases.insert(id, release);
        id
    }

    pub(crate) fn release(&self, id: ReleaseId) -> Option<&Release> {
        self.releases.get(&id)
    }

    pub(crate) fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    /// Appends an item to the catalog and indexes it.
    ///
    /// The item is indexed under its title and, for tracks, under the author
    /// name. A track belonging to a known release is also appended to that
    /// release's track list.
    pub(crate) fn add_item(&mut self, item: AudioItem) -> ItemId {
        let id = ItemId(self.items.len());

        self.index.insert(item.title(), id);
        if let ItemKind::Track(track) = item.kind() {
            self.index.insert(&track.author_name, id);

            if let Some(release) = track
                .release
                .as_ref()
                .and_then(|r| self.releases.get_mut(&r.id))
            {
                release.push_track(id);
            }
        }

        self.items.push(item);
        id
    }

    /// Convenience wrapper building a track from catalog-owned references.
    ///
    /// Returns `None` if the author is unknown to this catalog.
    pub(crate) fn add_track(
        &mut self,
        title: &str,
        duration_secs: u32,
        author: AuthorId,
        release: Option<ReleaseId>,
    ) -> Option<ItemId> {
        let author = self.authors.get(&author)?;
        let release = release.and_then(|id| self.releases.get(&id));
        let item = AudioItem::track(title, duration_secs, author, release);
        Some(self.add_item(item))
    }

    pub(crate) fn get(&self, id: ItemId) -> Option<&AudioItem> {
        self.items.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut AudioItem> {
        self.items.get_mut(id.index())
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read-only view of every item, in catalog order.
    pub(crate) fn all_items(&self) -> &[AudioItem] {
        &self.items
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len()).map(ItemId)
    }

    /// Finds items matching `term`, ignoring case.
    ///
    /// An exact index hit is returned as a borrowed view of the index itself;
    /// callers needing to keep or modify the result must copy it. Only when
    /// no exact entry exists does the search fall back to a linear scan for
    /// titles, or track author names, containing the term.
    pub(crate) fn search(&self, term: &str) -> Cow<'_, [ItemId]> {
        let term = normalize(term);

        if let Some(hits) = self.index.get(&term) {
            return Cow::Borrowed(hits);
        }

        let matches = self
            .ids()
            .zip(&self.items)
            .filter(|(_, item)| {
                normalize(item.title()).contains(&term)
                    || item
                        .author_name()
                        .is_some_and(|name| normalize(name).contains(&term))
            })
            .map(|(id, _)| id)
            .collect();

        Cow::Owned(matches)
    }

    /// Every item ordered by likes then plays, both descending.
    ///
    /// The sort is stable: items with identical counters keep catalog order.
    pub(crate) fn rank_by_popularity(&self) -> Vec<ItemId> {
        let mut ranked: Vec<ItemId> = self.ids().collect();
        ranked.sort_by(|a, b| self.popularity_order(*a, *b));
        ranked
    }

    /// The most popular items, at most five.
    pub(crate) fn recommend(&self) -> Vec<ItemId> {
        let mut ranked = self.rank_by_popularity();
        ranked.truncate(RECOMMENDATION_LIMIT);
        ranked
    }

    /// Compares two items by popularity. Unknown ids sort last.
    pub(crate) fn popularity_order(&self, a: ItemId, b: ItemId) -> Ordering {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => compare_popularity(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
