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

//! Media library import.
//!
//! This module discovers audio files on the local filesystem and adds one
//! catalog track per tagged file.
//!
//! It utilizes `WalkDir` for directory traversal and `Lofty` for metadata
//! extraction. Artists are resolved through the catalog's own author cache so
//! repeated imports never duplicate an author; releases are cached per import
//! by author and album title.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, bail};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use walkdir::WalkDir;

use crate::model::{AuthorId, ReleaseId, catalog::Catalog, search::normalize};

const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "m4a", "wav"];
const UNKNOWN_ARTIST: &str = "Unknown Artist";

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
}

/// Parses the leading year of a tag date such as `1975` or `1975-11-21`.
fn parse_year(date: &str) -> i32 {
    date.trim().get(..4).and_then(|y| y.parse().ok()).unwrap_or(0)
}

/// Recursively scans `root` for audio files and adds their tracks to `catalog`.
///
/// Files without tags, or whose tags cannot be read, are skipped with a
/// warning. Tracks without an album tag are added as singles.
///
/// # Returns
///
/// The number of tracks added.
///
/// # Errors
///
/// Returns an error if `root` is not a readable directory.
pub(crate) fn import_directory(catalog: &mut Catalog, root: &Path) -> Result<usize> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let mut release_cache: HashMap<(AuthorId, String), ReleaseId> = HashMap::new();
    let mut imported = 0;

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported(e.path()))
    {
        let path = entry.path();

        let tagged_file = match Probe::open(path).and_then(|p| p.read()) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            tracing::warn!(path = %path.display(), "Skipping file without tags");
            continue;
        };

        let artist_name = tag
            .get(&ItemKey::AlbumArtist)
            .and_then(|item| item.value().text())
            .map(str::to_string)
            .or_else(|| tag.artist().map(|a| a.to_string()))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        let track_title = match tag.title() {
            Some(title) => title.to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        };

        let duration_secs =
            u32::try_from(tagged_file.properties().duration().as_secs()).unwrap_or(u32::MAX);

        let author = catalog.get_or_create_author(&artist_name);
        if let Some(genre) = tag.genre().filter(|g| !g.trim().is_empty()) {
            catalog.add_genre(author, genre.trim());
        }

        let release = match tag.album().filter(|a| !a.trim().is_empty()) {
            Some(album_title) => {
                let year = tag
                    .get(&ItemKey::RecordingDate)
                    .and_then(|item| item.value().text())
                    .map_or(0, parse_year);
                let key = (author, normalize(&album_title));
                let id = *release_cache
                    .entry(key)
                    .or_insert_with(|| catalog.create_release(&album_title, author, year));
                Some(id)
            }
            None => None,
        };

        if catalog
            .add_track(&track_title, duration_secs, author, release)
            .is_some()
        {
            imported += 1;
        }
    }

    tracing::info!(root = %root.display(), imported, "Import finished");

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_audio_extensions() {
        assert!(is_supported(Path::new("music/Queen/Bohemian Rhapsody.mp3")));
        assert!(is_supported(Path::new("music/track.FLAC")));
        assert!(!is_supported(Path::new("music/cover.jpg")));
        assert!(!is_supported(Path::new("music/README")));
    }

    #[test]
    fn parses_leading_year() {
        assert_eq!(parse_year("1975"), 1975);
        assert_eq!(parse_year("2013-05-17"), 2013);
        assert_eq!(parse_year("n/a"), 0);
        assert_eq!(parse_year(""), 0);
    }

    #[test]
    fn skips_untagged_and_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not audio").unwrap();
        std::fs::write(dir.path().join("broken.mp3"), "not really audio").unwrap();

        let mut catalog = Catalog::new();
        assert_eq!(import_directory(&mut catalog, dir.path()).unwrap(), 0);
        assert!(catalog.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::new();

        assert!(import_directory(&mut catalog, &dir.path().join("missing")).is_err());
    }
}
