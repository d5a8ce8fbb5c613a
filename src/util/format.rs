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

use crate::model::AudioItem;

/// Formats a duration in seconds into a human-readable `MM:SS` string.
///
/// Minutes are not wrapped into hours, so long episodes read `60:00` and up.
pub(crate) fn format_time(total_seconds: u32) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// One numbered listing line, e.g.
/// `  2. [Track] Get Lucky (Daft Punk) | Plays: 0 | Likes: 0 [06:09]`.
///
/// `marker` distinguishes the active queue entry.
pub(crate) fn item_line(number: usize, item: &AudioItem, marker: bool) -> String {
    let marker = if marker { '>' } else { ' ' };
    format!(
        "{marker}{number:>3}. {} [{}]",
        item,
        format_time(item.duration_secs())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn item_line_marks_active_entry() {
        let item = AudioItem::episode("Career in IT", 2400, "DevCast", 43);

        assert_eq!(
            item_line(1, &item, true),
            ">  1. [Podcast] Career in IT with DevCast | Plays: 0 | Likes: 0 [40:00]"
        );
        assert!(item_line(12, &item, false).starts_with("  12. "));
    }
}
