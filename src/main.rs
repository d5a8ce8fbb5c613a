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

//! # Audio catalog and playback queue.
//!
//! A line-oriented session over an in-memory catalog of music tracks and
//! podcast episodes, with search, popularity ranking and a playback queue.
//!
//! ## Architecture
//!
//! The application follows a setup-run-teardown pattern:
//!
//! * **Setup** loads configuration, starts the file logger and hydrates the
//!   catalog and users from SQLite, falling back to the built-in seed.
//! * **Run** reads commands from standard input and applies them to the
//!   session state through [`actions::commands::handle_command`].
//! * **Teardown** writes the catalog and users back to the database. A failed
//!   save is logged and does not fail the process.

mod actions;
mod config;
mod db;
mod logging;
mod model;
mod util;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use crate::{
    actions::commands::{AppCommand, handle_command},
    config::AppConfig,
    model::{
        ItemId,
        catalog::Catalog,
        library::{UserDirectory, UserProfile},
        queue::PlaybackQueue,
        seed,
    },
};

/// Application state.
pub(crate) struct App {
    pub config: AppConfig,
    pub conn: Connection,

    pub catalog: Catalog,
    pub queue: PlaybackQueue,
    pub users: UserDirectory,

    /// E-mail of the logged in user.
    pub current_user: Option<String>,
    /// Items of the last listing, addressed by number in `add`.
    pub results: Vec<ItemId>,

    /// Cleared when the stored catalog failed to load, so the seed that
    /// replaced it is never written over it.
    pub save_catalog: bool,
    /// Cleared when the stored users failed to load or were not loaded.
    pub save_users: bool,
}

impl App {
    /// Create a new instance of application state with an empty catalog.
    pub fn new(config: AppConfig, conn: Connection) -> Self {
        Self {
            config,
            conn,
            catalog: Catalog::new(),
            queue: PlaybackQueue::new(),
            users: UserDirectory::new(),
            current_user: None,
            results: Vec::new(),
            save_catalog: true,
            save_users: true,
        }
    }

    /// Loads the saved catalog and users.
    ///
    /// State is replaced only after a load succeeds. A failed or empty catalog
    /// load leaves the seed in place when seeding is enabled.
    ///
    /// Stored data that failed to load is left untouched by [`App::persist`].
    /// Users are not loaded at all without the stored catalog, as their
    /// playlists refer to its positions.
    pub fn hydrate(&mut self) {
        match db::load_catalog(&self.conn) {
            Ok(catalog) => self.catalog = catalog,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "Failed to load catalog");
                self.save_catalog = false;
                self.save_users = false;
            }
        }

        if self.catalog.is_empty() && self.config.seed_defaults {
            seed::populate(&mut self.catalog);
        }

        if !self.save_catalog {
            return;
        }

        match db::load_users(&self.conn, &self.catalog) {
            Ok(users) => self.users = users,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "Failed to load users");
                self.save_users = false;
            }
        }
    }

    pub fn current_profile_mut(&mut self) -> Option<&mut UserProfile> {
        let email = self.current_user.as_deref()?;
        self.users.find_mut(email)
    }

    /// Writes the catalog and users to the database, remembering the queue
    /// position for the logged in user.
    pub fn persist(&mut self) -> Result<()> {
        let index = self.queue.current_index();
        if let Some(profile) = self.current_profile_mut() {
            profile.set_saved_queue_index(index);
        }

        if self.save_catalog {
            db::save_catalog(&mut self.conn, &self.catalog)?;
        } else {
            tracing::warn!("Stored catalog failed to load, not overwriting it");
        }

        if self.save_users {
            db::save_users(&mut self.conn, &self.users)?;
        } else {
            tracing::warn!("Stored users failed to load, not overwriting them");
        }

        Ok(())
    }
}

/// The entry point of the application.
fn main() -> Result<()> {
    let config = config::load_config();

    let _guard = logging::init_logging(Path::new(&config.log_dir))?;

    // Writes back any settings added since the file was created.
    if let Err(e) = config::save_config(&config) {
        tracing::warn!(error = %e, "Failed to save configuration");
    }

    let conn = db::init_db(Path::new(&config.database_file))
        .context("Failed to initialise database")?;

    let mut app = App::new(config, conn);
    app.hydrate();

    for dir in app.config.media_dirs.clone() {
        if let Err(e) = db::scan::import_directory(&mut app.catalog, Path::new(&dir)) {
            tracing::warn!(dir = %dir, error = %format!("{e:#}"), "Import failed");
        }
    }

    let res = run(&mut app);

    if let Err(e) = app.persist() {
        tracing::error!(error = %format!("{e:#}"), "Failed to save state");
        eprintln!("Failed to save state: {e:#}");
    }

    res.context("Application error occurred")
}

/// Reads commands until `quit` or end of input.
fn run(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    writeln!(
        stdout,
        "{} items in catalog. Type 'help' for commands.",
        app.catalog.len()
    )?;

    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let keep_running = match AppCommand::parse(&line) {
            Some(command) => handle_command(app, command, &mut stdout)?,
            None => {
                writeln!(stdout, "Unknown command. Type 'help' for commands.")?;
                true
            }
        };

        if !keep_running {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(dir: &tempfile::TempDir) -> App {
        let conn = db::init_db(&dir.path().join("catalog.db")).unwrap();
        App::new(AppConfig::default(), conn)
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn hydrate_seeds_and_persist_writes_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);

        app.hydrate();
        app.users.register("alice@example.com", "Alice").unwrap();
        app.persist().unwrap();

        assert_eq!(count(&app.conn, "items"), app.catalog.len() as i64);
        assert_eq!(count(&app.conn, "users"), 1);
    }

    #[test]
    fn broken_catalog_is_not_overwritten_by_the_seed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.conn
            .execute_batch(
                "INSERT INTO items (position, kind, title, duration, host, episode_number)
                 VALUES (5, 'episode', 'Lost', 60, 'Host', 1);
                 INSERT INTO users (id, email, name) VALUES
                 ('9b2f5c1e-8d4a-4f6b-9c3e-2a1d7e5f8b40', 'alice@example.com', 'Alice');",
            )
            .unwrap();

        app.hydrate();
        assert!(!app.catalog.is_empty());
        assert!(app.users.is_empty());
        assert!(!app.save_catalog);
        assert!(!app.save_users);

        app.persist().unwrap();
        assert_eq!(count(&app.conn, "items"), 1);
        assert_eq!(count(&app.conn, "users"), 1);
    }

    #[test]
    fn broken_users_are_not_overwritten_with_nobody() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.conn
            .execute(
                "INSERT INTO users (id, email, name) VALUES ('not-a-uuid', 'bob@example.com', 'Bob')",
                [],
            )
            .unwrap();

        app.hydrate();
        assert!(app.save_catalog);
        assert!(!app.save_users);

        app.persist().unwrap();
        assert_eq!(count(&app.conn, "items"), app.catalog.len() as i64);
        assert_eq!(count(&app.conn, "users"), 1);
    }
}
