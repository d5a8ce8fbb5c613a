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

//! Database row mapping for domain models.
//!
//! Identifiers are stored as their textual UUID form, item kinds as a short
//! tag. [`ItemRow`] is the flat shape of one row of the `items` table.

use rusqlite::{
    Result, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use uuid::Uuid;

use crate::model::{AudioItem, AuthorId, ItemKind, ReleaseId};

fn parse_uuid(value: ValueRef<'_>) -> FromSqlResult<Uuid> {
    Uuid::parse_str(value.as_str()?).map_err(|e| FromSqlError::Other(Box::new(e)))
}

impl ToSql for AuthorId {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for AuthorId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_uuid(value).map(AuthorId::from_uuid)
    }
}

impl ToSql for ReleaseId {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for ReleaseId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_uuid(value).map(ReleaseId::from_uuid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum KindTag {
    Track,
    Episode,
}

impl KindTag {
    pub(super) fn of(item: &AudioItem) -> Self {
        match item.kind() {
            ItemKind::Track(_) => KindTag::Track,
            ItemKind::Episode(_) => KindTag::Episode,
        }
    }
}

impl ToSql for KindTag {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        let val = match self {
            KindTag::Track => "track",
            KindTag::Episode => "episode",
        };
        Ok(ToSqlOutput::from(val))
    }
}

impl FromSql for KindTag {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "track" => Ok(KindTag::Track),
            "episode" => Ok(KindTag::Episode),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// One stored catalog item.
///
/// Track columns are `NULL` for episodes and vice versa.
#[derive(Debug)]
pub(super) struct ItemRow {
    pub(super) position: i64,
    pub(super) kind: KindTag,
    pub(super) title: String,
    pub(super) duration_secs: u32,
    pub(super) play_count: u32,
    pub(super) like_count: u32,
    pub(super) author_id: Option<AuthorId>,
    pub(super) author_name: Option<String>,
    pub(super) release_id: Option<ReleaseId>,
    pub(super) host: Option<String>,
    pub(super) episode_number: Option<u32>,
}

impl ItemRow {
    /// Maps an SQLite row to an [`ItemRow`].
    ///
    /// Designed to be used with [`rusqlite::Statement::query_map`], the column
    /// order matching the `SELECT` in [`super::load_catalog`].
    pub(super) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            position: row.get(0)?,
            kind: row.get(1)?,
            title: row.get(2)?,
            duration_secs: row.get(3)?,
            play_count: row.get(4)?,
            like_count: row.get(5)?,
            author_id: row.get(6)?,
            author_name: row.get(7)?,
            release_id: row.get(8)?,
            host: row.get(9)?,
            episode_number: row.get(10)?,
        })
    }
}
