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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application (audio items,
//! authors and releases) together with the identifiers used to refer to them
//! from the catalog, the playback queue and user playlists.
//!
//! Items live exactly once, in the [`catalog::Catalog`] arena. Every other
//! container stores an [`ItemId`], so a play or a like recorded through the
//! queue is visible from every playlist holding the same item.

pub(crate) mod catalog;
pub(crate) mod library;
pub(crate) mod queue;
pub(crate) mod search;
pub(crate) mod seed;

use std::{cmp::Ordering, collections::BTreeSet, fmt};

use uuid::Uuid;

const SINGLE_RELEASE: &str = "Single";

/// Position of an item in the catalog arena.
///
/// Items are never removed from a catalog, so an id stays valid for the
/// lifetime of the catalog that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ItemId(pub(crate) usize);

impl ItemId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Generated identity of an [`Author`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct AuthorId(Uuid);

impl AuthorId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub(crate) fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generated identity of a [`Release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ReleaseId(Uuid);

impl ReleaseId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub(crate) fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A performer, band or composer.
///
/// Authors are identified by their generated id, never by name. Two authors
/// sharing a name are only the same entity when both were obtained through
/// [`catalog::Catalog::get_or_create_author`].
#[derive(Debug, Clone)]
pub(crate) struct Author {
    id: AuthorId,
    name: String,
    genres: BTreeSet<String>,
}

impl Author {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self::restore(AuthorId::generate(), name, [])
    }

    /// Rebuilds an author with a known identity, e.g. when loading from disk.
    pub(crate) fn restore(
        id: AuthorId,
        name: impl Into<String>,
        genres: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            genres: genres.into_iter().collect(),
        }
    }

    pub(crate) fn id(&self) -> AuthorId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    /// Returns `false` if the genre was already present.
    pub(crate) fn add_genre(&mut self, genre: impl Into<String>) -> bool {
        self.genres.insert(genre.into())
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Author {}

/// An album: an ordered collection of tracks by one author.
#[derive(Debug, Clone)]
pub(crate) struct Release {
    id: ReleaseId,
    title: String,
    author: AuthorId,
    year: i32,
    tracks: Vec<ItemId>,
}

impl Release {
    pub(crate) fn new(title: impl Into<String>, author: AuthorId, year: i32) -> Self {
        Self::restore(ReleaseId::generate(), title, author, year)
    }

    /// Rebuilds a release with a known identity and no tracks yet.
    pub(crate) fn restore(id: ReleaseId, title: impl Into<String>, author: AuthorId, year: i32) -> Self {
        Self {
            id,
            title: title.into(),
            author,
            year,
            tracks: Vec::new(),
        }
    }

    pub(crate) fn id(&self) -> ReleaseId {
        self.id
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn author(&self) -> AuthorId {
        self.author
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    /// Track order within the release.
    pub(crate) fn tracks(&self) -> &[ItemId] {
        &self.tracks
    }

    pub(crate) fn push_track(&mut self, id: ItemId) {
        self.tracks.push(id);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ReleaseRef {
    pub(crate) id: ReleaseId,
    pub(crate) title: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TrackDetails {
    pub(crate) author_id: AuthorId,
    pub(crate) author_name: String,
    /// `None` means the track was released as a single.
    pub(crate) release: Option<ReleaseRef>,
}

#[derive(Debug, Clone)]
pub(crate) struct EpisodeDetails {
    pub(crate) host: String,
    pub(crate) episode_number: u32,
}

#[derive(Debug, Clone)]
pub(crate) enum ItemKind {
    Track(TrackDetails),
    Episode(EpisodeDetails),
}

/// A playable item: a music track or a podcast episode.
///
/// Equality is by title only, so two tracks sharing a title are equal even
/// when they belong to different authors.
#[derive(Debug, Clone)]
pub(crate) struct AudioItem {
    title: String,
    duration_secs: u32,
    play_count: u32,
    like_count: u32,
    kind: ItemKind,
}

impl AudioItem {
    pub(crate) fn track(
        title: impl Into<String>,
        duration_secs: u32,
        author: &Author,
        release: Option<&Release>,
    ) -> Self {
        Self::with_kind(
            title,
            duration_secs,
            ItemKind::Track(TrackDetails {
                author_id: author.id(),
                author_name: author.name().to_string(),
                release: release.map(|r| ReleaseRef {
                    id: r.id(),
                    title: r.title().to_string(),
                }),
            }),
        )
    }

    pub(crate) fn episode(
        title: impl Into<String>,
        duration_secs: u32,
        host: impl Into<String>,
        episode_number: u32,
    ) -> Self {
        Self::with_kind(
            title,
            duration_secs,
            ItemKind::Episode(EpisodeDetails {
                host: host.into(),
                episode_number,
            }),
        )
    }

    fn with_kind(title: impl Into<String>, duration_secs: u32, kind: ItemKind) -> Self {
        Self {
            title: title.into(),
            duration_secs,
            play_count: 0,
            like_count: 0,
            kind,
        }
    }

    /// Restores previously recorded counters.
    pub(crate) fn with_counts(mut self, play_count: u32, like_count: u32) -> Self {
        self.play_count = play_count;
        self.like_count = like_count;
        self
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub(crate) fn play_count(&self) -> u32 {
        self.play_count
    }

    pub(crate) fn like_count(&self) -> u32 {
        self.like_count
    }

    pub(crate) fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// The author name of a track, `None` for episodes.
    pub(crate) fn author_name(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Track(track) => Some(&track.author_name),
            ItemKind::Episode(_) => None,
        }
    }

    pub(crate) fn release_title(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Track(track) => Some(
                track
                    .release
                    .as_ref()
                    .map_or(SINGLE_RELEASE, |r| r.title.as_str()),
            ),
            ItemKind::Episode(_) => None,
        }
    }

    pub(crate) fn increment_play(&mut self) {
        self.play_count = self.play_count.saturating_add(1);
    }

    pub(crate) fn like(&mut self) {
        self.like_count = self.like_count.saturating_add(1);
    }

    pub(crate) fn unlike(&mut self) {
        self.like_count = self.like_count.saturating_sub(1);
    }

    pub(crate) fn start_playback(&self) {
        match &self.kind {
            ItemKind::Track(track) => tracing::info!(
                title = %self.title,
                author = %track.author_name,
                "Playing track"
            ),
            ItemKind::Episode(episode) => tracing::info!(
                title = %self.title,
                host = %episode.host,
                episode = episode.episode_number,
                "Playing episode"
            ),
        }
    }

    pub(crate) fn pause_playback(&self) {
        tracing::info!(title = %self.title, "Paused");
    }

    /// A short one-line description tagged with the item kind.
    pub(crate) fn formatted_details(&self) -> String {
        match &self.kind {
            ItemKind::Track(track) => format!("[Track] {} ({})", self.title, track.author_name),
            ItemKind::Episode(episode) => format!("[Podcast] {} with {}", self.title, episode.host),
        }
    }
}

impl PartialEq for AudioItem {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for AudioItem {}

impl fmt::Display for AudioItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | Plays: {} | Likes: {}",
            self.formatted_details(),
            self.play_count,
            self.like_count
        )
    }
}

/// Popularity ordering: most liked first, ties broken by most played.
pub(crate) fn compare_popularity(a: &AudioItem, b: &AudioItem) -> Ordering {
    b.like_count
        .cmp(&a.like_count)
        .then_with(|| b.play_count.cmp(&a.play_count))
}
