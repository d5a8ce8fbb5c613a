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

//! Users, their playlists and liked items.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use uuid::Uuid;

use crate::model::{ItemId, catalog::Catalog};

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid e-mail address: {0}")]
    InvalidEmail(String),

    #[error("e-mail address already registered: {0}")]
    DuplicateEmail(String),
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub(crate) struct Playlist {
    name: String,
    items: Vec<ItemId>,
}

impl Playlist {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Adds an item unless one with an equal title is already in the playlist.
    pub(crate) fn add(&mut self, catalog: &Catalog, id: ItemId) -> bool {
        let Some(item) = catalog.get(id) else {
            return false;
        };

        if self.items.iter().any(|&existing| catalog.get(existing) == Some(item)) {
            return false;
        }

        self.items.push(id);
        true
    }

    /// Removes the first entry whose title equals the given item's title.
    pub(crate) fn remove(&mut self, catalog: &Catalog, id: ItemId) -> bool {
        let Some(item) = catalog.get(id) else {
            return false;
        };

        match self
            .items
            .iter()
            .position(|&existing| catalog.get(existing) == Some(item))
        {
            Some(position) => {
                self.items.remove(position);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UserProfile {
    id: Uuid,
    email: String,
    name: String,
    playlists: Vec<Playlist>,
    liked: BTreeSet<String>,
    saved_queue_index: Option<usize>,
}

impl UserProfile {
    pub(crate) fn new(email: &str, name: impl Into<String>) -> Self {
        Self::restore(Uuid::new_v4(), email, name)
    }

    pub(crate) fn restore(id: Uuid, email: &str, name: impl Into<String>) -> Self {
        Self {
            id,
            email: normalize_email(email),
            name: name.into(),
            playlists: Vec::new(),
            liked: BTreeSet::new(),
            saved_queue_index: None,
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Creates an empty playlist, or returns the existing one with that name.
    pub(crate) fn create_playlist(&mut self, name: &str) -> &mut Playlist {
        match self.playlists.iter().position(|p| p.name == name) {
            Some(position) => &mut self.playlists[position],
            None => {
                self.playlists.push(Playlist::new(name));
                let last = self.playlists.len() - 1;
                &mut self.playlists[last]
            }
        }
    }

    pub(crate) fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    pub(crate) fn playlist_mut(&mut self, name: &str) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| p.name == name)
    }

    /// Deletes the named playlist, returning `false` if there was none.
    pub(crate) fn remove_playlist(&mut self, name: &str) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| p.name != name);
        self.playlists.len() != before
    }

    /// Likes the item, or takes the like back if it was already liked.
    ///
    /// Returns the new liked state, or `None` for an id the catalog does not
    /// hold.
    pub(crate) fn toggle_like(&mut self, catalog: &mut Catalog, id: ItemId) -> Option<bool> {
        let item = catalog.get_mut(id)?;

        if self.liked.remove(item.title()) {
            item.unlike();
            Some(false)
        } else {
            self.liked.insert(item.title().to_string());
            item.like();
            Some(true)
        }
    }

    pub(crate) fn is_liked(&self, title: &str) -> bool {
        self.liked.contains(title)
    }

    pub(crate) fn liked_titles(&self) -> impl Iterator<Item = &str> {
        self.liked.iter().map(String::as_str)
    }

    /// Records a liked title without touching any counter, e.g. on load.
    pub(crate) fn restore_like(&mut self, title: impl Into<String>) {
        self.liked.insert(title.into());
    }

    pub(crate) fn saved_queue_index(&self) -> Option<usize> {
        self.saved_queue_index
    }

    pub(crate) fn set_saved_queue_index(&mut self, index: Option<usize>) {
        self.saved_queue_index = index;
    }
}

#[derive(Debug, Default)]
pub(crate) struct UserDirectory {
    profiles: BTreeMap<String, UserProfile>,
}

impl UserDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, email: &str, name: &str) -> Result<&mut UserProfile, ValidationError> {
        let email = normalize_email(email);
        let name = name.trim();

        if email.is_empty() {
            return Err(ValidationError::MissingField("e-mail"));
        }
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if !email.contains('@') || !email.contains('.') {
            return Err(ValidationError::InvalidEmail(email));
        }
        if self.profiles.contains_key(&email) {
            return Err(ValidationError::DuplicateEmail(email));
        }

        tracing::info!(%email, "Registered user");

        let profile = UserProfile::new(&email, name);
        Ok(self.profiles.entry(email).or_insert(profile))
    }

    /// Adds an already validated profile, replacing any with the same e-mail.
    pub(crate) fn insert(&mut self, profile: UserProfile) {
        self.profiles.insert(profile.email.clone(), profile);
    }

    pub(crate) fn find(&self, email: &str) -> Option<&UserProfile> {
        self.profiles.get(&normalize_email(email))
    }

    pub(crate) fn find_mut(&mut self, email: &str) -> Option<&mut UserProfile> {
        self.profiles.get_mut(&normalize_email(email))
    }

    pub(crate) fn len(&self) -> usize {
        self.profiles.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub(crate) fn profiles(&self) -> impl Iterator<Item = &UserProfile> {
        self.profiles.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AudioItem;

    fn catalog() -> (Catalog, Vec<ItemId>) {
        let mut catalog = Catalog::new();
        let queen = catalog.get_or_create_author("Queen");
        let eagles = catalog.get_or_create_author("Eagles");
        let ids = vec![
            catalog.add_track("Bohemian Rhapsody", 354, queen, None).unwrap(),
            catalog.add_track("Hotel California", 390, eagles, None).unwrap(),
            catalog.add_track("Hotel California", 200, queen, None).unwrap(),
            catalog.add_item(AudioItem::episode("Tech News #1", 1200, "TechDaily", 1)),
        ];
        (catalog, ids)
    }

    #[test]
    fn playlist_rejects_title_duplicates() {
        let (catalog, ids) = catalog();
        let mut playlist = Playlist::new("Road trip");

        assert!(playlist.add(&catalog, ids[1]));
        assert!(!playlist.add(&catalog, ids[1]));
        assert!(!playlist.add(&catalog, ids[2]));
        assert!(playlist.add(&catalog, ids[0]));
        assert!(!playlist.add(&catalog, ItemId(99)));
        assert_eq!(playlist.items(), &[ids[1], ids[0]]);
    }

    #[test]
    fn playlist_removes_by_title() {
        let (catalog, ids) = catalog();
        let mut playlist = Playlist::new("Road trip");
        playlist.add(&catalog, ids[1]);
        playlist.add(&catalog, ids[3]);

        assert!(playlist.remove(&catalog, ids[2]));
        assert_eq!(playlist.items(), &[ids[3]]);
        assert!(!playlist.remove(&catalog, ids[0]));
    }

    #[test]
    fn toggle_like_updates_shared_counter() {
        let (mut catalog, ids) = catalog();
        let mut alice = UserProfile::new("alice@example.com", "Alice");
        let mut bob = UserProfile::new("bob@example.com", "Bob");

        assert_eq!(alice.toggle_like(&mut catalog, ids[0]), Some(true));
        assert_eq!(bob.toggle_like(&mut catalog, ids[0]), Some(true));
        assert_eq!(catalog.get(ids[0]).unwrap().like_count(), 2);
        assert!(alice.is_liked("Bohemian Rhapsody"));

        assert_eq!(alice.toggle_like(&mut catalog, ids[0]), Some(false));
        assert_eq!(catalog.get(ids[0]).unwrap().like_count(), 1);
        assert!(!alice.is_liked("Bohemian Rhapsody"));

        assert_eq!(alice.toggle_like(&mut catalog, ItemId(42)), None);
    }

    #[test]
    fn create_playlist_is_idempotent() {
        let (catalog, ids) = catalog();
        let mut user = UserProfile::new("alice@example.com", "Alice");

        user.create_playlist("Favourites").add(&catalog, ids[0]);
        user.create_playlist("Favourites");

        assert_eq!(user.playlists().len(), 1);
        assert_eq!(user.playlist("Favourites").unwrap().items(), &[ids[0]]);
        assert!(user.playlist_mut("Missing").is_none());
    }

    #[test]
    fn remove_playlist_deletes_only_the_named_one() {
        let mut user = UserProfile::new("alice@example.com", "Alice");
        user.create_playlist("Mix");
        user.create_playlist("Chill");

        assert!(user.remove_playlist("Mix"));
        assert!(!user.remove_playlist("Mix"));
        assert!(user.playlist("Mix").is_none());
        assert!(user.playlist("Chill").is_some());
    }

    #[test]
    fn register_validates_input() {
        let mut users = UserDirectory::new();

        assert_eq!(
            users.register("", "Alice").unwrap_err(),
            ValidationError::MissingField("e-mail")
        );
        assert_eq!(
            users.register("alice@example.com", "  ").unwrap_err(),
            ValidationError::MissingField("name")
        );
        assert_eq!(
            users.register("alice", "Alice").unwrap_err(),
            ValidationError::InvalidEmail("alice".to_string())
        );

        assert!(users.register(" Alice@Example.com ", "Alice").is_ok());
        assert_eq!(
            users.register("alice@example.com", "Other").unwrap_err(),
            ValidationError::DuplicateEmail("alice@example.com".to_string())
        );
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn lookups_ignore_case_and_whitespace() {
        let mut users = UserDirectory::new();
        users.register("bob@example.com", "Bob").unwrap();

        assert_eq!(users.find("BOB@example.com ").unwrap().name(), "Bob");
        assert!(users.find_mut("bob@EXAMPLE.com").is_some());
        assert!(users.find("carol@example.com").is_none());
        assert!(!users.is_empty());
    }
}
