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

//! Application command processing.
//!
//! This module parses session input into [`AppCommand`]s and applies them to
//! the [`App`] state, writing a human-readable response for each one.
//!
//! Commands never fail because of what the user asked for: an empty queue,
//! an unknown playlist or a missing login is reported as a message. Only I/O
//! errors on the output itself are returned.

use anyhow::Result;
use std::{io::Write, path::PathBuf};

use crate::{
    App,
    db::{self, scan},
    model::{AudioItem, ItemId},
    util::format::item_line,
};

const HELP: &str = "\
Commands:
  search <term>          find items by title or artist
  top                    list the catalog by popularity
  recommend              list the five most popular items
  catalog                list every item
  album <title>          list the tracks of a release
  queue <term>           replace the queue with search results
  queue-top              replace the queue with recommendations
  add <n>                append item <n> of the last listing to the queue
  goto <n>               move the cursor to queue entry <n>
  play | pause | next | prev
  shuffle | sort         reorder the queue
  list                   show the queue
  clear                  empty the queue
  like                   like or unlike the current item
  status                 show playback status
  register <email> <name>
  login <email>
  playlist new <name>    create a playlist
  playlist add <name>    add the current item to a playlist
  playlist remove <name> drop the current item from a playlist
  playlist delete <name> delete a playlist
  playlist play <name>   queue a playlist
  playlist queue <name>  append a playlist to the queue
  import <dir>           import audio files from a directory
  save                   write the catalog and users to disk
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppCommand {
    Search(String),
    Top,
    Recommend,
    Catalog,
    Album(String),
    QueueMatches(String),
    QueueTop,
    Add(usize),
    Goto(usize),
    Play,
    Pause,
    Next,
    Previous,
    Shuffle,
    Sort,
    List,
    Clear,
    Like,
    Status,
    Register { email: String, name: String },
    Login(String),
    PlaylistNew(String),
    PlaylistAdd(String),
    PlaylistRemove(String),
    PlaylistDelete(String),
    PlaylistPlay(String),
    PlaylistQueue(String),
    Import(PathBuf),
    Save,
    Help,
    Quit,
}

impl AppCommand {
    /// Parses one input line, returning `None` for anything unrecognised.
    ///
    /// Keywords are case-insensitive; arguments are kept as typed apart from
    /// surrounding whitespace.
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        let command = match (keyword.to_lowercase().as_str(), rest) {
            ("search", term) if !term.is_empty() => Self::Search(term.to_string()),
            ("top", "") => Self::Top,
            ("recommend", "") => Self::Recommend,
            ("catalog", "") => Self::Catalog,
            ("album", title) if !title.is_empty() => Self::Album(title.to_string()),
            ("queue", term) if !term.is_empty() => Self::QueueMatches(term.to_string()),
            ("queue-top", "") => Self::QueueTop,
            ("add", n) => Self::Add(n.parse().ok().filter(|&n| n > 0)?),
            ("goto", n) => Self::Goto(n.parse().ok().filter(|&n| n > 0)?),
            ("play", "") => Self::Play,
            ("pause", "") => Self::Pause,
            ("next", "") => Self::Next,
            ("prev" | "previous", "") => Self::Previous,
            ("shuffle", "") => Self::Shuffle,
            ("sort", "") => Self::Sort,
            ("list", "") => Self::List,
            ("clear", "") => Self::Clear,
            ("like", "") => Self::Like,
            ("status", "") => Self::Status,
            ("register", args) => {
                let (email, name) = args.split_once(char::is_whitespace)?;
                Self::Register {
                    email: email.to_string(),
                    name: name.trim().to_string(),
                }
            }
            ("login", email) if !email.is_empty() => Self::Login(email.to_string()),
            ("playlist", args) => {
                let (action, name) = args.split_once(char::is_whitespace)?;
                let name = name.trim().to_string();
                match action.to_lowercase().as_str() {
                    "new" => Self::PlaylistNew(name),
                    "add" => Self::PlaylistAdd(name),
                    "remove" => Self::PlaylistRemove(name),
                    "delete" => Self::PlaylistDelete(name),
                    "play" => Self::PlaylistPlay(name),
                    "queue" => Self::PlaylistQueue(name),
                    _ => return None,
                }
            }
            ("import", dir) if !dir.is_empty() => Self::Import(PathBuf::from(dir)),
            ("save", "") => Self::Save,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", "") => Self::Quit,
            _ => return None,
        };

        Some(command)
    }
}

/// Listing suffix for items the logged-in user has liked.
fn liked_mark(app: &App, item: &AudioItem) -> &'static str {
    let liked = app
        .current_user
        .as_deref()
        .and_then(|email| app.users.find(email))
        .is_some_and(|profile| profile.is_liked(item.title()));
    if liked { " ♥" } else { "" }
}

fn list_items(app: &mut App, ids: Vec<ItemId>, out: &mut impl Write) -> Result<()> {
    if ids.is_empty() {
        writeln!(out, "No items found.")?;
    }
    for (n, &id) in ids.iter().enumerate() {
        if let Some(item) = app.catalog.get(id) {
            writeln!(out, "{}{}", item_line(n + 1, item, false), liked_mark(app, item))?;
        }
    }
    app.results = ids;
    Ok(())
}

fn report_current(app: &App, out: &mut impl Write) -> Result<()> {
    match app.queue.current_item().and_then(|id| app.catalog.get(id)) {
        Some(item) => writeln!(out, "{}: {}", app.queue.status_label(), item.formatted_details())?,
        None => writeln!(out, "{}", app.queue.status_label())?,
    }
    Ok(())
}

/// Orchestrates the execution of a single command.
///
/// Returns `false` once the session should end.
pub(crate) fn handle_command(app: &mut App, command: AppCommand, out: &mut impl Write) -> Result<bool> {
    tracing::debug!(?command, "Handling command");

    match command {
        AppCommand::Search(term) => {
            let hits = app.catalog.search(&term).into_owned();
            list_items(app, hits, out)?;
        }
        AppCommand::Top => {
            let ranked = app.catalog.rank_by_popularity();
            list_items(app, ranked, out)?;
        }
        AppCommand::Recommend => {
            let recommended = app.catalog.recommend();
            list_items(app, recommended, out)?;
        }
        AppCommand::Catalog => {
            let all = app.catalog.ids().collect();
            list_items(app, all, out)?;
        }
        AppCommand::Album(title) => {
            let wanted = title.to_lowercase();
            let tracks = app
                .catalog
                .releases()
                .find(|release| release.title().to_lowercase() == wanted)
                .map(|release| release.tracks().to_vec());
            match tracks {
                Some(tracks) => list_items(app, tracks, out)?,
                None => writeln!(out, "No release titled '{title}'.")?,
            }
        }
        AppCommand::QueueMatches(term) => {
            let hits = app.catalog.search(&term).into_owned();
            if app.queue.set_queue(&hits) {
                writeln!(out, "Queued {} items.", hits.len())?;
            } else {
                writeln!(out, "No items match '{term}'.")?;
            }
        }
        AppCommand::QueueTop => {
            let recommended = app.catalog.recommend();
            if app.queue.set_queue(&recommended) {
                writeln!(out, "Queued {} items.", recommended.len())?;
            } else {
                writeln!(out, "The catalog is empty.")?;
            }
        }
        AppCommand::Add(n) => match n.checked_sub(1).and_then(|i| app.results.get(i)).copied() {
            Some(id) => {
                app.queue.add_one(id);
                writeln!(out, "Added to queue ({} items).", app.queue.len())?;
            }
            None => writeln!(out, "No item {n} in the last listing.")?,
        },
        AppCommand::Goto(n) => {
            if n.checked_sub(1).is_some_and(|i| app.queue.set_current_index(i)) {
                report_current(app, out)?;
            } else {
                writeln!(out, "No entry {n} in the queue.")?;
            }
        }
        AppCommand::Play => {
            if app.queue.play(&mut app.catalog) {
                report_current(app, out)?;
            } else {
                writeln!(out, "Queue is empty.")?;
            }
        }
        AppCommand::Pause => {
            if app.queue.pause(&app.catalog) {
                report_current(app, out)?;
            } else {
                writeln!(out, "Nothing is playing.")?;
            }
        }
        AppCommand::Next => {
            if app.queue.next(&mut app.catalog) {
                report_current(app, out)?;
            } else if app.queue.is_empty() {
                writeln!(out, "Queue is empty.")?;
            } else {
                writeln!(out, "End of queue.")?;
            }
        }
        AppCommand::Previous => {
            if app.queue.previous(&mut app.catalog) {
                report_current(app, out)?;
            } else if app.queue.is_empty() {
                writeln!(out, "Queue is empty.")?;
            } else {
                writeln!(out, "Start of queue, replaying.")?;
                report_current(app, out)?;
            }
        }
        AppCommand::Shuffle => {
            if app.queue.shuffle() {
                writeln!(out, "Queue shuffled.")?;
            } else {
                writeln!(out, "Queue is empty.")?;
            }
        }
        AppCommand::Sort => {
            if app.queue.sort_by_popularity(&app.catalog) {
                writeln!(out, "Queue sorted by popularity.")?;
            } else {
                writeln!(out, "Queue is empty.")?;
            }
        }
        AppCommand::List => {
            if app.queue.is_empty() {
                writeln!(out, "Queue is empty.")?;
            }
            let active = app.queue.current_index();
            for (n, id) in app.queue.items().into_iter().enumerate() {
                if let Some(item) = app.catalog.get(id) {
                    writeln!(
                        out,
                        "{}{}",
                        item_line(n + 1, item, active == Some(n)),
                        liked_mark(app, item)
                    )?;
                }
            }
        }
        AppCommand::Clear => {
            app.queue.clear();
            writeln!(out, "Queue cleared.")?;
        }
        AppCommand::Like => {
            let Some(id) = app.queue.current_item() else {
                writeln!(out, "Nothing to like.")?;
                return Ok(true);
            };
            let Some(email) = app.current_user.as_deref() else {
                writeln!(out, "Log in first.")?;
                return Ok(true);
            };
            let liked = app
                .users
                .find_mut(email)
                .and_then(|profile| profile.toggle_like(&mut app.catalog, id));
            match liked {
                Some(true) => writeln!(out, "Liked.")?,
                Some(false) => writeln!(out, "Like removed.")?,
                None => writeln!(out, "Nothing to like.")?,
            }
        }
        AppCommand::Status => {
            report_current(app, out)?;
            let release = app
                .queue
                .current_item()
                .and_then(|id| app.catalog.get(id))
                .and_then(|item| item.release_title());
            if let Some(release) = release {
                writeln!(out, "Release: {release}")?;
            }
            if let Some(index) = app.queue.current_index() {
                writeln!(
                    out,
                    "Position {} of {}{}",
                    index + 1,
                    app.queue.len(),
                    if app.queue.is_shuffled() { " (shuffled)" } else { "" }
                )?;
            }
            if let Some(email) = &app.current_user {
                writeln!(out, "Logged in as {email}")?;
            }
        }
        AppCommand::Register { email, name } => match app.users.register(&email, &name) {
            Ok(profile) => {
                let email = profile.email().to_string();
                writeln!(out, "Welcome, {}!", profile.name())?;
                app.current_user = Some(email);
            }
            Err(e) => writeln!(out, "Registration failed: {e}")?,
        },
        AppCommand::Login(email) => match app.users.find(&email) {
            Some(profile) => {
                writeln!(out, "Welcome back, {}!", profile.name())?;
                if let Some(index) = profile.saved_queue_index() {
                    writeln!(out, "You were last at queue position {}.", index + 1)?;
                }
                app.current_user = Some(profile.email().to_string());
            }
            None => writeln!(out, "No user registered as {email}.")?,
        },
        AppCommand::PlaylistNew(name) => match app.current_profile_mut() {
            Some(profile) => {
                profile.create_playlist(&name);
                writeln!(out, "Playlist '{name}' ready.")?;
            }
            None => writeln!(out, "Log in first.")?,
        },
        AppCommand::PlaylistAdd(name) => {
            let Some(id) = app.queue.current_item() else {
                writeln!(out, "Nothing is queued.")?;
                return Ok(true);
            };
            let Some(email) = app.current_user.as_deref() else {
                writeln!(out, "Log in first.")?;
                return Ok(true);
            };
            let added = app
                .users
                .find_mut(email)
                .and_then(|profile| profile.playlist_mut(&name))
                .map(|playlist| playlist.add(&app.catalog, id));
            match added {
                Some(true) => writeln!(out, "Added to '{name}'.")?,
                Some(false) => writeln!(out, "Already in '{name}'.")?,
                None => writeln!(out, "No playlist named '{name}'.")?,
            }
        }
        AppCommand::PlaylistRemove(name) => {
            let Some(id) = app.queue.current_item() else {
                writeln!(out, "Nothing is queued.")?;
                return Ok(true);
            };
            let Some(email) = app.current_user.as_deref() else {
                writeln!(out, "Log in first.")?;
                return Ok(true);
            };
            let removed = app
                .users
                .find_mut(email)
                .and_then(|profile| profile.playlist_mut(&name))
                .map(|playlist| playlist.remove(&app.catalog, id));
            match removed {
                Some(true) => writeln!(out, "Removed from '{name}'.")?,
                Some(false) => writeln!(out, "Not in '{name}'.")?,
                None => writeln!(out, "No playlist named '{name}'.")?,
            }
        }
        AppCommand::PlaylistDelete(name) => {
            match app.current_profile_mut().map(|profile| profile.remove_playlist(&name)) {
                Some(true) => writeln!(out, "Playlist '{name}' deleted.")?,
                Some(false) => writeln!(out, "No playlist named '{name}'.")?,
                None => writeln!(out, "Log in first.")?,
            }
        }
        AppCommand::PlaylistPlay(name) => {
            let items = app
                .current_user
                .as_deref()
                .and_then(|email| app.users.find(email))
                .and_then(|profile| profile.playlist(&name))
                .map(|playlist| playlist.items().to_vec());
            match items {
                Some(items) if app.queue.set_queue(&items) => {
                    writeln!(out, "Queued {} items from '{name}'.", items.len())?;
                }
                Some(_) => writeln!(out, "Playlist '{name}' is empty.")?,
                None => writeln!(out, "No playlist named '{name}'.")?,
            }
        }
        AppCommand::PlaylistQueue(name) => {
            let items = app
                .current_user
                .as_deref()
                .and_then(|email| app.users.find(email))
                .and_then(|profile| profile.playlist(&name))
                .map(|playlist| playlist.items().to_vec());
            match items.map(|items| app.queue.add_many(&items)) {
                Some(0) => writeln!(out, "Playlist '{name}' is empty.")?,
                Some(added) => writeln!(out, "Added {added} items from '{name}' to the queue.")?,
                None => writeln!(out, "No playlist named '{name}'.")?,
            }
        }
        AppCommand::Import(dir) => match scan::import_directory(&mut app.catalog, &dir) {
            Ok(count) => writeln!(out, "Imported {count} tracks.")?,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "Import failed");
                writeln!(out, "Import failed: {e:#}")?;
            }
        },
        AppCommand::Save => match app.persist() {
            Ok(()) if app.save_catalog && app.save_users => writeln!(out, "Saved.")?,
            Ok(()) => writeln!(out, "Saved. Stored data that failed to load was left untouched.")?,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "Save failed");
                writeln!(out, "Save failed: {e:#}")?;
            }
        },
        AppCommand::Help => writeln!(out, "{HELP}")?,
        AppCommand::Quit => return Ok(false),
    }

    Ok(true)
}
