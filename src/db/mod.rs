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

//! Data access layer.
//!
//! This module persists the catalog and the user directory to SQLite. Both
//! are written as wholesale snapshots: a save replaces every stored row inside
//! one transaction, and a load rebuilds fresh in-memory state that the caller
//! swaps in only once it has been read completely.
//!
//! # Tables
//!
//! * `authors`, `author_genres` - Authors with their generated ids and genres.
//! * `releases` - Albums, linked to authors.
//! * `items` - Tracks and episodes keyed by catalog position.
//! * `users`, `user_likes` - Profiles and their liked titles.
//! * `playlists`, `playlist_items` - Named playlists referring to item positions.
//!
//! # Performance
//!
//! Most functions in this module use [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead.

mod model;
pub(crate) mod scan;

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::model::{
    AudioItem, Author, AuthorId, ItemId, ItemKind, Release, ReleaseId,
    catalog::Catalog,
    library::{UserDirectory, UserProfile},
};

use self::model::{ItemRow, KindTag};

/// Opens a connection to the SQLite database and configures performance settings.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL` and increases the cache size.
/// * **Constraints**: Enforces foreign key integrity.
/// * **Schema**: Executes [`create_schema`] to ensure all tables and indices exist.
///
/// # Errors
///
/// Returns an error if the database file cannot be opened, the initial
/// PRAGMA configurations fail or the schema initialization fails.
pub(crate) fn init_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        bail!(
            "Failed to switch to WAL mode. Current mode: {}",
            journal_mode
        );
    }

    conn.execute_batch(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -16000;
    ",
    )?;

    conn.set_prepared_statement_cache_capacity(32);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// Items refer to authors and releases by id but carry no foreign keys to
/// them, so a track whose author was never registered with the catalog can
/// still be stored. Playlists refer to items by position only.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS author_genres (
            author_id TEXT NOT NULL,
            genre TEXT NOT NULL,
            PRIMARY KEY (author_id, genre),
            FOREIGN KEY (author_id) REFERENCES authors (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS releases (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            title TEXT NOT NULL,
            year INTEGER NOT NULL,
            FOREIGN KEY (author_id) REFERENCES authors (id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_releases_author_id ON releases (author_id);

        CREATE TABLE IF NOT EXISTS items (
            position INTEGER PRIMARY KEY,
            kind TEXT NOT NULL,
            title TEXT NOT NULL,
            duration INTEGER NOT NULL,
            play_count INTEGER NOT NULL DEFAULT 0,
            like_count INTEGER NOT NULL DEFAULT 0,
            author_id TEXT,
            author_name TEXT,
            release_id TEXT,
            host TEXT,
            episode_number INTEGER
        );

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            queue_index INTEGER
        );

        CREATE TABLE IF NOT EXISTS user_likes (
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            PRIMARY KEY (user_id, title),
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            UNIQUE (user_id, name),
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS playlist_items (
            playlist_id INTEGER NOT NULL,
            seq INTEGER NOT NULL,
            item_position INTEGER NOT NULL,
            PRIMARY KEY (playlist_id, seq),
            FOREIGN KEY (playlist_id) REFERENCES playlists (id) ON DELETE CASCADE
        );

        COMMIT;",
    )
    .context("Failed to create schema")
}

fn to_db_index(index: usize) -> Result<i64> {
    i64::try_from(index).context("Index does not fit in a database integer")
}

/// Replaces the stored catalog with `catalog`.
///
/// Everything happens in one transaction; on failure the previous snapshot
/// is left intact.
pub(crate) fn save_catalog(conn: &mut Connection, catalog: &Catalog) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "DELETE FROM items;
         DELETE FROM releases;
         DELETE FROM author_genres;
         DELETE FROM authors;",
    )
    .context("Failed to clear stored catalog")?;

    {
        let mut insert_author = tx.prepare_cached("INSERT INTO authors (id, name) VALUES (?1, ?2)")?;
        let mut insert_genre =
            tx.prepare_cached("INSERT INTO author_genres (author_id, genre) VALUES (?1, ?2)")?;
        for author in catalog.authors() {
            insert_author.execute(params![author.id(), author.name()])?;
            for genre in author.genres() {
                insert_genre.execute(params![author.id(), genre])?;
            }
        }

        let mut insert_release = tx.prepare_cached(
            "INSERT INTO releases (id, author_id, title, year) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for release in catalog.releases() {
            insert_release.execute(params![
                release.id(),
                release.author(),
                release.title(),
                release.year()
            ])?;
        }

        let mut insert_item = tx.prepare_cached(
            "INSERT INTO items (
                position, kind, title, duration, play_count, like_count,
                author_id, author_name, release_id, host, episode_number
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for (id, item) in catalog.ids().zip(catalog.all_items()) {
            let (author_id, author_name, release_id, host, episode_number) = match item.kind() {
                ItemKind::Track(track) => (
                    Some(track.author_id),
                    Some(track.author_name.as_str()),
                    track.release.as_ref().map(|r| r.id),
                    None,
                    None,
                ),
                ItemKind::Episode(episode) => (
                    None,
                    None,
                    None,
                    Some(episode.host.as_str()),
                    Some(episode.episode_number),
                ),
            };

            insert_item.execute(params![
                to_db_index(id.index())?,
                KindTag::of(item),
                item.title(),
                item.duration_secs(),
                item.play_count(),
                item.like_count(),
                author_id,
                author_name,
                release_id,
                host,
                episode_number,
            ])?;
        }
    }

    tx.commit().context("Failed to commit catalog")?;

    tracing::info!(items = catalog.len(), "Saved catalog");

    Ok(())
}

/// Reads the stored catalog into a new [`Catalog`].
///
/// Items are re-added in position order, which rebuilds the search index and
/// each release's track list exactly as they were when saved.
pub(crate) fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    let mut genres: HashMap<AuthorId, Vec<String>> = HashMap::new();
    let mut stmt = conn.prepare_cached("SELECT author_id, genre FROM author_genres")?;
    for row in stmt.query_map([], |row| {
        Ok((row.get::<_, AuthorId>(0)?, row.get::<_, String>(1)?))
    })? {
        let (author_id, genre) = row?;
        genres.entry(author_id).or_default().push(genre);
    }

    let mut stmt = conn.prepare_cached("SELECT id, name FROM authors")?;
    let authors = stmt
        .query_map([], |row| Ok((row.get::<_, AuthorId>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    for (id, name) in authors {
        let author_genres = genres.remove(&id).unwrap_or_default();
        catalog.insert_author(Author::restore(id, name, author_genres));
    }

    let mut stmt = conn.prepare_cached("SELECT id, title, author_id, year FROM releases")?;
    let releases = stmt
        .query_map([], |row| {
            Ok(Release::restore(
                row.get::<_, ReleaseId>(0)?,
                row.get::<_, String>(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for release in releases {
        catalog.insert_release(release);
    }

    let mut stmt = conn.prepare_cached(
        "SELECT position, kind, title, duration, play_count, like_count,
                author_id, author_name, release_id, host, episode_number
         FROM items
         ORDER BY position",
    )?;
    let rows = stmt
        .query_map([], ItemRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    for row in rows {
        if usize::try_from(row.position).ok() != Some(catalog.len()) {
            bail!("Stored catalog has a gap at position {}", row.position);
        }
        let item = restore_item(&mut catalog, row)?;
        catalog.add_item(item);
    }

    tracing::info!(items = catalog.len(), "Loaded catalog");

    Ok(catalog)
}

fn restore_item(catalog: &mut Catalog, row: ItemRow) -> Result<AudioItem> {
    let item = match row.kind {
        KindTag::Track => {
            let author_id = match row.author_id {
                Some(id) if catalog.author(id).is_some() => id,
                _ => {
                    let Some(name) = row.author_name.as_deref() else {
                        bail!("Track at position {} has no author", row.position);
                    };
                    catalog.get_or_create_author(name)
                }
            };
            let Some(author) = catalog.author(author_id) else {
                bail!("Track at position {} has no author", row.position);
            };
            let release = row.release_id.and_then(|id| catalog.release(id));
            AudioItem::track(row.title, row.duration_secs, author, release)
        }
        KindTag::Episode => AudioItem::episode(
            row.title,
            row.duration_secs,
            row.host.unwrap_or_default(),
            row.episode_number.unwrap_or_default(),
        ),
    };

    Ok(item.with_counts(row.play_count, row.like_count))
}

/// Replaces the stored user directory with `users`.
pub(crate) fn save_users(conn: &mut Connection, users: &UserDirectory) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "DELETE FROM playlist_items;
         DELETE FROM playlists;
         DELETE FROM user_likes;
         DELETE FROM users;",
    )
    .context("Failed to clear stored users")?;

    {
        let mut insert_user = tx.prepare_cached(
            "INSERT INTO users (id, email, name, queue_index) VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut insert_like =
            tx.prepare_cached("INSERT INTO user_likes (user_id, title) VALUES (?1, ?2)")?;
        let mut insert_playlist =
            tx.prepare_cached("INSERT INTO playlists (user_id, name) VALUES (?1, ?2)")?;
        let mut insert_entry = tx.prepare_cached(
            "INSERT INTO playlist_items (playlist_id, seq, item_position) VALUES (?1, ?2, ?3)",
        )?;

        for profile in users.profiles() {
            let user_id = profile.id().to_string();
            let queue_index = profile.saved_queue_index().map(to_db_index).transpose()?;

            insert_user.execute(params![user_id, profile.email(), profile.name(), queue_index])?;

            for title in profile.liked_titles() {
                insert_like.execute(params![user_id, title])?;
            }

            for playlist in profile.playlists() {
                insert_playlist.execute(params![user_id, playlist.name()])?;
                let playlist_id = tx.last_insert_rowid();
                for (seq, id) in playlist.items().iter().enumerate() {
                    insert_entry.execute(params![
                        playlist_id,
                        to_db_index(seq)?,
                        to_db_index(id.index())?
                    ])?;
                }
            }
        }
    }

    tx.commit().context("Failed to commit users")?;

    tracing::info!(users = users.len(), "Saved users");

    Ok(())
}

/// Reads the stored user directory.
///
/// Playlist entries pointing past the end of `catalog` are dropped.
pub(crate) fn load_users(conn: &Connection, catalog: &Catalog) -> Result<UserDirectory> {
    let mut profiles: HashMap<String, UserProfile> = HashMap::new();

    let mut stmt = conn.prepare_cached("SELECT id, email, name, queue_index FROM users")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (id, email, name, queue_index) in rows {
        let uuid = Uuid::parse_str(&id).with_context(|| format!("Invalid user id {id}"))?;
        let mut profile = UserProfile::restore(uuid, &email, name);
        profile.set_saved_queue_index(queue_index.and_then(|i| usize::try_from(i).ok()));
        profiles.insert(id, profile);
    }

    let mut stmt = conn.prepare_cached("SELECT user_id, title FROM user_likes")?;
    for row in stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))? {
        let (user_id, title) = row?;
        if let Some(profile) = profiles.get_mut(&user_id) {
            profile.restore_like(title);
        }
    }

    let mut stmt = conn.prepare_cached(
        "SELECT p.user_id, p.name, pi.item_position
         FROM playlists p
         LEFT JOIN playlist_items pi ON pi.playlist_id = p.id
         ORDER BY p.id, pi.seq",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<i64>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (user_id, name, position) in rows {
        let Some(profile) = profiles.get_mut(&user_id) else {
            continue;
        };
        let playlist = profile.create_playlist(&name);

        let Some(position) = position else {
            continue;
        };
        let id = usize::try_from(position).ok().map(ItemId);
        if !id.is_some_and(|id| playlist.add(catalog, id)) {
            tracing::warn!(playlist = %name, position, "Dropped stale playlist entry");
        }
    }

    let mut users = UserDirectory::new();
    for profile in profiles.into_values() {
        users.insert(profile);
    }

    tracing::info!(users = users.len(), "Loaded users");

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed;

    fn open() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = init_db(&dir.path().join("catalog.db")).unwrap();
        (dir, conn)
    }

    #[test]
    fn empty_database_loads_empty_catalog() {
        let (_dir, conn) = open();

        let catalog = load_catalog(&conn).unwrap();
        assert!(catalog.is_empty());
        assert!(load_users(&conn, &catalog).unwrap().is_empty());
    }

    #[test]
    fn catalog_round_trip() {
        let (_dir, mut conn) = open();

        let mut catalog = Catalog::new();
        seed::populate(&mut catalog);
        let queen = catalog.get_or_create_author("Queen");
        let bohemian = catalog.search("Bohemian Rhapsody")[0];
        catalog.get_mut(bohemian).unwrap().increment_play();
        catalog.get_mut(bohemian).unwrap().like();

        save_catalog(&mut conn, &catalog).unwrap();
        save_catalog(&mut conn, &catalog).unwrap();

        let mut loaded = load_catalog(&conn).unwrap();
        assert_eq!(loaded.len(), catalog.len());

        for (before, after) in catalog.all_items().iter().zip(loaded.all_items()) {
            assert_eq!(before.to_string(), after.to_string());
            assert_eq!(before.duration_secs(), after.duration_secs());
            assert_eq!(before.release_title(), after.release_title());
        }

        assert_eq!(loaded.get_or_create_author("QUEEN"), queen);
        assert_eq!(loaded.author(queen).unwrap().genres().len(), 2);

        let opera = loaded
            .releases()
            .find(|r| r.title() == "A Night at the Opera")
            .unwrap();
        let titles: Vec<&str> = opera
            .tracks()
            .iter()
            .map(|&id| loaded.get(id).unwrap().title())
            .collect();
        assert_eq!(titles, ["Bohemian Rhapsody", "Love of My Life"]);

        assert_eq!(loaded.recommend()[0], bohemian);
    }

    #[test]
    fn users_round_trip() {
        let (_dir, mut conn) = open();

        let mut catalog = Catalog::new();
        seed::populate(&mut catalog);
        let lucky = catalog.search("get lucky")[0];
        let castle = catalog.search("castle on the hill")[0];

        let mut users = UserDirectory::new();
        let alice = users.register("alice@example.com", "Alice").unwrap();
        alice.toggle_like(&mut catalog, lucky);
        alice.set_saved_queue_index(Some(3));
        let mix = alice.create_playlist("Mix");
        mix.add(&catalog, castle);
        mix.add(&catalog, lucky);
        alice.create_playlist("Empty");
        users.register("bob@example.com", "Bob").unwrap();

        save_users(&mut conn, &users).unwrap();
        let loaded = load_users(&conn, &catalog).unwrap();

        assert_eq!(loaded.len(), 2);
        let alice = loaded.find("alice@example.com").unwrap();
        assert_eq!(alice.name(), "Alice");
        assert!(alice.is_liked("Get Lucky"));
        assert_eq!(alice.saved_queue_index(), Some(3));
        assert_eq!(alice.playlist("Mix").unwrap().items(), &[castle, lucky]);
        assert!(alice.playlist("Empty").unwrap().items().is_empty());
        assert_eq!(loaded.find("bob@example.com").unwrap().playlists().len(), 0);
    }

    #[test]
    fn stale_playlist_entries_are_dropped() {
        let (_dir, mut conn) = open();

        let mut catalog = Catalog::new();
        seed::populate(&mut catalog);
        let last = ItemId(catalog.len() - 1);

        let mut users = UserDirectory::new();
        users
            .register("alice@example.com", "Alice")
            .unwrap()
            .create_playlist("Mix")
            .add(&catalog, last);
        save_users(&mut conn, &users).unwrap();

        let loaded = load_users(&conn, &Catalog::new()).unwrap();
        let alice = loaded.find("alice@example.com").unwrap();
        assert!(alice.playlist("Mix").unwrap().items().is_empty());
    }
}
