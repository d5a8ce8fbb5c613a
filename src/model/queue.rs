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

//! Playback queue management.
//!
//! This module provides state for the playback queue: an ordered list of
//! catalog items, a cursor marking the active item and the transport flags.
//!
//! The queue moves between three states:
//!
//! * **Empty**: nothing queued, no cursor, not playing.
//! * **Ready**: items queued and a valid cursor, but paused or stopped.
//! * **Playing**: items queued, a valid cursor, and playback running.
//!
//! Running off either end of the queue or operating on an empty queue is an
//! ordinary outcome, reported through the `bool` result of each operation.

use rand::{rng, seq::SliceRandom};

use crate::model::{ItemId, catalog::Catalog};

const STATUS_EMPTY: &str = "Queue empty";
const STATUS_PLAYING: &str = "▶ Playing";
const STATUS_PAUSED: &str = "⏸ Paused";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QueueState {
    Empty,
    Ready,
    Playing,
}

#[derive(Debug, Default)]
pub(crate) struct PlaybackQueue {
    items: Vec<ItemId>,
    cursor: Option<usize>,
    playing: bool,
    shuffled: bool,
}

impl PlaybackQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole queue with a copy of `items`.
    ///
    /// An empty slice is rejected and leaves the queue untouched.
    pub(crate) fn set_queue(&mut self, items: &[ItemId]) -> bool {
        if items.is_empty() {
            return false;
        }

        self.items = items.to_vec();
        self.cursor = Some(0);
        self.playing = false;

        tracing::debug!(len = self.items.len(), "Queue replaced");
        true
    }

    /// Plays the item under the cursor, counting a new play every time.
    pub(crate) fn play(&mut self, catalog: &mut Catalog) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let position = self.valid_cursor().unwrap_or(0);
        self.cursor = Some(position);

        let id = self.items[position];
        match catalog.get_mut(id) {
            Some(item) => {
                item.increment_play();
                item.start_playback();
            }
            None => tracing::warn!(?id, "Queued item is not in the catalog"),
        }

        self.playing = true;
        true
    }

    pub(crate) fn pause(&mut self, catalog: &Catalog) -> bool {
        if !self.playing || self.items.is_empty() {
            return false;
        }

        if let Some(item) = self.current_item().and_then(|id| catalog.get(id)) {
            item.pause_playback();
        }

        self.playing = false;
        true
    }

    /// Advances to and plays the next item.
    ///
    /// At the end of the queue playback stops and `false` is returned.
    pub(crate) fn next(&mut self, catalog: &mut Catalog) -> bool {
        if self.items.is_empty() {
            return false;
        }

        match self.valid_cursor() {
            Some(position) if position + 1 < self.items.len() => {
                self.cursor = Some(position + 1);
                self.play(catalog)
            }
            _ => {
                tracing::debug!("End of queue");
                self.playing = false;
                false
            }
        }
    }

    /// Steps back to and plays the previous item.
    ///
    /// At the head of the queue the current item is replayed from the start
    /// and `false` is returned.
    pub(crate) fn previous(&mut self, catalog: &mut Catalog) -> bool {
        if self.items.is_empty() {
            return false;
        }

        match self.valid_cursor() {
            Some(position) if position > 0 => {
                self.cursor = Some(position - 1);
                self.play(catalog)
            }
            _ => {
                self.play(catalog);
                false
            }
        }
    }

    /// Randomizes the queue, keeping the active item active and first.
    pub(crate) fn shuffle(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let mut rng = rng();

        match self.valid_cursor() {
            Some(position) => {
                let pinned = self.items.remove(position);
                self.items.shuffle(&mut rng);
                self.items.insert(0, pinned);
                self.cursor = Some(0);
            }
            None => self.items.shuffle(&mut rng),
        }

        self.shuffled = true;
        true
    }

    /// Sorts the queue by popularity, following the active item to its new
    /// position.
    pub(crate) fn sort_by_popularity(&mut self, catalog: &Catalog) -> bool {
        if self.items.is_empty() {
            return false;
        }

        let active = self.valid_cursor();

        let mut entries: Vec<(usize, ItemId)> = self.items.iter().copied().enumerate().collect();
        entries.sort_by(|(_, a), (_, b)| catalog.popularity_order(*a, *b));

        if let Some(active) = active {
            let position = entries
                .iter()
                .position(|(original, _)| *original == active)
                .unwrap_or(0);
            self.cursor = Some(position);
        }

        self.items = entries.into_iter().map(|(_, id)| id).collect();
        self.shuffled = false;
        true
    }

    pub(crate) fn add_one(&mut self, item: ItemId) -> bool {
        self.items.push(item);
        if self.items.len() == 1 {
            self.cursor = Some(0);
        }
        true
    }

    /// Appends `items`, returning how many were queued.
    pub(crate) fn add_many(&mut self, items: &[ItemId]) -> usize {
        if items.is_empty() {
            return 0;
        }

        let was_empty = self.items.is_empty();
        self.items.extend_from_slice(items);
        if was_empty {
            self.cursor = Some(0);
        }

        items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.playing = false;
    }

    /// Moves the cursor without playing or counting a play.
    pub(crate) fn set_current_index(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    pub(crate) fn current_item(&self) -> Option<ItemId> {
        self.valid_cursor().map(|position| self.items[position])
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// A snapshot of the queued items.
    pub(crate) fn items(&self) -> Vec<ItemId> {
        self.items.clone()
    }

    pub(crate) fn state(&self) -> QueueState {
        if self.items.is_empty() {
            QueueState::Empty
        } else if self.playing {
            QueueState::Playing
        } else {
            QueueState::Ready
        }
    }

    pub(crate) fn status_label(&self) -> &'static str {
        match self.state() {
            QueueState::Empty => STATUS_EMPTY,
            QueueState::Playing => STATUS_PLAYING,
            QueueState::Ready => STATUS_PAUSED,
        }
    }

    fn valid_cursor(&self) -> Option<usize> {
        self.cursor.filter(|&position| position < self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AudioItem;
    use proptest::prelude::*;

    fn catalog_with(count: u32) -> (Catalog, Vec<ItemId>) {
        let mut catalog = Catalog::new();
        let ids = (0..count)
            .map(|n| catalog.add_item(AudioItem::episode(format!("Episode {n}"), 60, "Host", n)))
            .collect();
        (catalog, ids)
    }

    #[test]
    fn new_queue_is_empty() {
        let queue = PlaybackQueue::new();

        assert_eq!(queue.state(), QueueState::Empty);
        assert_eq!(queue.current_item(), None);
        assert_eq!(queue.current_index(), None);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.status_label(), "Queue empty");
    }

    #[test]
    fn set_queue_positions_on_first_item() {
        let (_, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();

        assert!(queue.set_queue(&ids));
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.state(), QueueState::Ready);
        assert!(!queue.is_playing());
    }

    #[test]
    fn set_queue_rejects_empty_input() {
        let (_, ids) = catalog_with(2);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);
        queue.add_one(ids[0]);

        assert!(!queue.set_queue(&[]));
        assert_eq!(queue.items(), vec![ids[0], ids[1], ids[0]]);
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn set_queue_copies_its_input() {
        let (_, mut ids) = catalog_with(2);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);
        ids.clear();

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn play_on_empty_queue_fails() {
        let (mut catalog, _) = catalog_with(1);
        let mut queue = PlaybackQueue::new();

        assert!(!queue.play(&mut catalog));
        assert!(!queue.is_playing());
    }

    #[test]
    fn play_counts_every_invocation() {
        let (mut catalog, ids) = catalog_with(2);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);

        assert!(queue.play(&mut catalog));
        assert!(queue.play(&mut catalog));

        assert_eq!(catalog.get(ids[0]).unwrap().play_count(), 2);
        assert_eq!(queue.state(), QueueState::Playing);
        assert_eq!(queue.status_label(), "▶ Playing");
    }

    #[test]
    fn pause_only_affects_a_playing_queue() {
        let (mut catalog, ids) = catalog_with(2);
        let mut queue = PlaybackQueue::new();

        assert!(!queue.pause(&catalog));

        queue.set_queue(&ids);
        assert!(!queue.pause(&catalog));

        queue.play(&mut catalog);
        assert!(queue.pause(&catalog));
        assert_eq!(queue.state(), QueueState::Ready);
        assert_eq!(queue.status_label(), "⏸ Paused");
        assert!(!queue.pause(&catalog));
    }

    #[test]
    fn next_walks_to_the_end_and_stops() {
        let (mut catalog, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);

        assert!(queue.next(&mut catalog));
        assert_eq!(queue.current_index(), Some(1));
        assert!(queue.next(&mut catalog));
        assert_eq!(queue.current_index(), Some(2));
        assert!(queue.is_playing());

        assert!(!queue.next(&mut catalog));
        assert_eq!(queue.current_index(), Some(2));
        assert!(!queue.is_playing());

        assert_eq!(catalog.get(ids[1]).unwrap().play_count(), 1);
        assert_eq!(catalog.get(ids[2]).unwrap().play_count(), 1);
        assert_eq!(catalog.get(ids[0]).unwrap().play_count(), 0);
    }

    #[test]
    fn previous_at_head_replays_current_item() {
        let (mut catalog, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);

        assert!(!queue.previous(&mut catalog));
        assert_eq!(queue.current_item(), Some(ids[0]));
        assert_eq!(queue.current_index(), Some(0));
        assert!(queue.is_playing());
        assert_eq!(catalog.get(ids[0]).unwrap().play_count(), 1);
    }

    #[test]
    fn previous_steps_back() {
        let (mut catalog, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);
        queue.next(&mut catalog);

        assert!(queue.previous(&mut catalog));
        assert_eq!(queue.current_index(), Some(0));
    }

    #[test]
    fn navigation_on_empty_queue_fails() {
        let (mut catalog, _) = catalog_with(1);
        let mut queue = PlaybackQueue::new();

        assert!(!queue.next(&mut catalog));
        assert!(!queue.previous(&mut catalog));
        assert!(!queue.shuffle());
        assert!(!queue.sort_by_popularity(&catalog));
        assert_eq!(queue.state(), QueueState::Empty);
    }

    #[test]
    fn shuffle_keeps_active_item_at_head() {
        let (mut catalog, ids) = catalog_with(3);

        for _ in 0..20 {
            let mut queue = PlaybackQueue::new();
            queue.set_queue(&ids);
            queue.next(&mut catalog);

            assert!(queue.shuffle());
            assert_eq!(queue.current_index(), Some(0));
            assert_eq!(queue.current_item(), Some(ids[1]));
            assert!(queue.is_shuffled());
        }
    }

    #[test]
    fn sort_moves_popular_items_first_and_follows_cursor() {
        let (mut catalog, ids) = catalog_with(2);
        for _ in 0..5 {
            catalog.get_mut(ids[1]).unwrap().like();
        }

        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);
        queue.shuffle();
        queue.set_current_index(queue.items().iter().position(|&id| id == ids[0]).unwrap());

        assert!(queue.sort_by_popularity(&catalog));
        assert_eq!(queue.items(), vec![ids[1], ids[0]]);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current_item(), Some(ids[0]));
        assert!(!queue.is_shuffled());
    }

    #[test]
    fn sort_tracks_the_active_entry_among_duplicates() {
        let (mut catalog, ids) = catalog_with(2);
        catalog.get_mut(ids[1]).unwrap().like();

        let mut queue = PlaybackQueue::new();
        queue.set_queue(&[ids[0], ids[1], ids[0]]);
        queue.set_current_index(2);

        queue.sort_by_popularity(&catalog);
        assert_eq!(queue.items(), vec![ids[1], ids[0], ids[0]]);
        assert_eq!(queue.current_index(), Some(2));
    }

    #[test]
    fn adding_to_empty_queue_selects_first_item() {
        let (_, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();

        assert!(queue.add_one(ids[2]));
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.state(), QueueState::Ready);

        queue.clear();
        assert_eq!(queue.add_many(&ids), 3);
        assert_eq!(queue.current_index(), Some(0));
        assert!(!queue.is_playing());
    }

    #[test]
    fn adding_keeps_cursor_and_allows_duplicates() {
        let (mut catalog, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);
        queue.next(&mut catalog);

        assert_eq!(queue.add_many(&[ids[1], ids[1]]), 2);
        assert_eq!(queue.add_many(&[]), 0);
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.current_index(), Some(1));
    }

    #[test]
    fn clear_resets_everything() {
        let (mut catalog, ids) = catalog_with(3);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);
        queue.play(&mut catalog);

        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.current_index(), None);
        assert!(!queue.is_playing());
        assert_eq!(queue.state(), QueueState::Empty);
    }

    #[test]
    fn set_current_index_rejects_out_of_range() {
        let (_, ids) = catalog_with(2);
        let mut queue = PlaybackQueue::new();
        queue.set_queue(&ids);

        assert!(!queue.set_current_index(2));
        assert!(queue.set_current_index(1));
        assert_eq!(queue.current_item(), Some(ids[1]));
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation_pinning_the_active_item(
            len in 1u32..30,
            steps in 0usize..30,
        ) {
            let (mut catalog, ids) = catalog_with(len);
            let mut queue = PlaybackQueue::new();
            queue.set_queue(&ids);
            for _ in 0..steps {
                queue.next(&mut catalog);
            }
            let active = queue.current_item();

            prop_assert!(queue.shuffle());
            prop_assert_eq!(queue.current_index(), Some(0));
            prop_assert_eq!(queue.current_item(), active);

            let mut shuffled = queue.items();
            shuffled.sort();
            prop_assert_eq!(shuffled, ids);
        }
    }
}
