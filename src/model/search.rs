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

//! Exact-term search index.
//!
//! This module maps a normalized term to the items whose title (or, for
//! tracks, author name) equals that term, giving constant time lookups for
//! the common case of searching a full title or artist.

use std::collections::HashMap;

use crate::model::ItemId;

/// Normalizes text for indexing and lookup.
///
/// Only case is folded; whitespace is kept as typed.
pub(crate) fn normalize(text: &str) -> String {
    text.to_lowercase()
}

#[derive(Debug, Default)]
pub(crate) struct SearchIndex {
    terms: HashMap<String, Vec<ItemId>>,
}

impl SearchIndex {
    /// Appends `id` to the entry for `term`, creating the entry if needed.
    ///
    /// Entries only ever grow; inserting the same id twice under one term
    /// records it twice.
    pub(crate) fn insert(&mut self, term: &str, id: ItemId) {
        self.terms.entry(normalize(term)).or_default().push(id);
    }

    /// Looks up an already normalized term.
    pub(crate) fn get(&self, normalized_term: &str) -> Option<&[ItemId]> {
        self.terms.get(normalized_term).map(Vec::as_slice)
    }
}
