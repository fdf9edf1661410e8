//! The canonical chapter list and the editing operations over it.
//!
//! Every `ChapterList` keeps these invariants after each operation:
//! chapters are sorted by start time, the first chapter starts at zero,
//! no two chapters share a start time, and no label is blank. A failed
//! operation leaves the list untouched.

use std::fmt;

use serde::Serialize;

use crate::error::OperationError;
use crate::timecode::Timecode;

/// Identity of a chapter, stable across edits and reorders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChapterId(u64);

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub start: Timecode,
    pub label: String,
}

/// Label given to chapters that arrive without one (`position` is 1-based)
pub fn placeholder_label(position: usize) -> String {
    format!("Chapter {}", position)
}

fn clean_label(label: &str, position: usize) -> String {
    let label = label.trim();
    if label.is_empty() {
        placeholder_label(position)
    } else {
        label.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterList {
    chapters: Vec<Chapter>,
    next_id: u64,
}

impl ChapterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from `(start, label)` pairs, assigning fresh ids in order.
    ///
    /// The result is normalized, so the input does not need to be sorted or
    /// zero-based.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Timecode, S)>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for (start, label) in entries {
            let id = list.allocate_id();
            list.chapters.push(Chapter {
                id,
                start,
                label: label.as_ref().trim().to_string(),
            });
        }
        list.normalize();
        list
    }

    fn allocate_id(&mut self) -> ChapterId {
        self.next_id += 1;
        ChapterId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn as_slice(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chapter> {
        self.chapters.iter()
    }

    pub fn get(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: ChapterId) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == id)
    }

    fn index_of(&self, id: ChapterId) -> Result<usize, OperationError> {
        self.position(id).ok_or(OperationError::NotFound(id))
    }

    fn snapshot(&self, id: ChapterId) -> Result<Chapter, OperationError> {
        self.get(id).cloned().ok_or(OperationError::NotFound(id))
    }

    /// True when every list invariant holds
    pub fn is_canonical(&self) -> bool {
        let zero_based = self
            .chapters
            .first()
            .map_or(true, |first| first.start == Timecode::ZERO);
        let increasing = self.chapters.windows(2).all(|w| w[0].start < w[1].start);
        let labelled = self.chapters.iter().all(|c| !c.label.trim().is_empty());
        zero_based && increasing && labelled
    }

    /// Shift every chapter so the first one starts at zero.
    fn rezero(&mut self) {
        let Some(offset) = self.chapters.first().map(|c| c.start.as_millis()) else {
            return;
        };
        if offset == 0 {
            return;
        }
        let shift = -(offset as i64);
        for chapter in &mut self.chapters {
            chapter.start = chapter.start.shift(shift);
        }
    }

    /// Re-sort, drop duplicate start times (first wins), re-zero, and fill
    /// blank labels. Returns the chapters that were dropped as duplicates.
    pub fn normalize(&mut self) -> Vec<Chapter> {
        self.chapters.sort_by_key(|c| c.start);

        let mut dropped = Vec::new();
        let mut kept: Vec<Chapter> = Vec::with_capacity(self.chapters.len());
        for chapter in self.chapters.drain(..) {
            match kept.last() {
                Some(previous) if previous.start == chapter.start => dropped.push(chapter),
                _ => kept.push(chapter),
            }
        }
        self.chapters = kept;

        self.rezero();
        for (idx, chapter) in self.chapters.iter_mut().enumerate() {
            chapter.label = clean_label(&chapter.label, idx + 1);
        }

        debug_assert!(self.is_canonical());
        dropped
    }

    /// Insert a chapter at `start`, keeping the list sorted.
    pub fn add(&mut self, start: Timecode, label: &str) -> Result<Chapter, OperationError> {
        if self.chapters.iter().any(|c| c.start == start) {
            return Err(OperationError::DuplicateTime(start));
        }

        let id = self.allocate_id();
        let idx = self.chapters.partition_point(|c| c.start < start);
        self.chapters.insert(
            idx,
            Chapter {
                id,
                start,
                label: clean_label(label, idx + 1),
            },
        );
        self.rezero();

        debug_assert!(self.is_canonical());
        self.snapshot(id)
    }

    /// Change a chapter's start time and/or label.
    ///
    /// Moving a chapter re-sorts the list, and re-zeroes it if the first
    /// chapter moved away from zero.
    pub fn edit(
        &mut self,
        id: ChapterId,
        new_start: Option<Timecode>,
        new_label: Option<&str>,
    ) -> Result<Chapter, OperationError> {
        let mut idx = self.index_of(id)?;

        if let Some(start) = new_start {
            if self.chapters.iter().any(|c| c.id != id && c.start == start) {
                return Err(OperationError::DuplicateTime(start));
            }
        }

        if let Some(start) = new_start {
            self.chapters[idx].start = start;
            self.chapters.sort_by_key(|c| c.start);
            self.rezero();
            idx = self.index_of(id)?;
        }
        // Placeholders are numbered by the final slot
        if let Some(label) = new_label {
            self.chapters[idx].label = clean_label(label, idx + 1);
        }

        debug_assert!(self.is_canonical());
        self.snapshot(id)
    }

    /// Delete a chapter. Removing the first one re-zeroes the rest.
    pub fn remove(&mut self, id: ChapterId) -> Result<Chapter, OperationError> {
        let idx = self.index_of(id)?;
        let removed = self.chapters.remove(idx);
        if idx == 0 {
            self.rezero();
        }

        debug_assert!(self.is_canonical());
        Ok(removed)
    }

    /// Move a chapter (identity and label) to slot `to_index`.
    ///
    /// Start times belong to the slots, so the sequence of times is unchanged
    /// and only the labels move.
    pub fn reorder(&mut self, id: ChapterId, to_index: usize) -> Result<(), OperationError> {
        let from = self.index_of(id)?;
        if to_index >= self.chapters.len() {
            return Err(OperationError::IndexOutOfRange {
                index: to_index,
                len: self.chapters.len(),
            });
        }

        let starts: Vec<Timecode> = self.chapters.iter().map(|c| c.start).collect();
        let chapter = self.chapters.remove(from);
        self.chapters.insert(to_index, chapter);
        for (chapter, start) in self.chapters.iter_mut().zip(starts) {
            chapter.start = start;
        }

        debug_assert!(self.is_canonical());
        Ok(())
    }

    /// Fold the following chapter into this one. This chapter keeps its
    /// start and label; the following chapter is removed.
    pub fn merge_with_next(&mut self, id: ChapterId) -> Result<Chapter, OperationError> {
        let idx = self.index_of(id)?;
        if idx + 1 >= self.chapters.len() {
            return Err(OperationError::NothingToMerge(id));
        }
        self.chapters.remove(idx + 1);

        debug_assert!(self.is_canonical());
        self.snapshot(id)
    }
}

impl<'a> IntoIterator for &'a ChapterList {
    type Item = &'a Chapter;
    type IntoIter = std::slice::Iter<'a, Chapter>;

    fn into_iter(self) -> Self::IntoIter {
        self.chapters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Timecode {
        Timecode::from_millis(value)
    }

    fn sample() -> ChapterList {
        ChapterList::from_entries([(ms(0), "Intro"), (ms(5_000), "Body"), (ms(12_000), "Outro")])
    }

    fn starts(list: &ChapterList) -> Vec<u64> {
        list.iter().map(|c| c.start.as_millis()).collect()
    }

    fn labels(list: &ChapterList) -> Vec<&str> {
        list.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_from_entries_normalizes() {
        let list = ChapterList::from_entries([
            (ms(15_000), "C"),
            (ms(2_000), "A"),
            (ms(7_000), "B"),
            (ms(7_000), "B duplicate"),
            (ms(9_000), "  "),
        ]);
        assert_eq!(starts(&list), vec![0, 5_000, 7_000, 13_000]);
        assert_eq!(labels(&list), vec!["A", "B", "Chapter 3", "C"]);
        assert!(list.is_canonical());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut once = ChapterList::from_entries([(ms(3_000), "x"), (ms(1_000), "y"), (ms(3_000), "z")]);
        let dropped = once.normalize();
        assert!(dropped.is_empty());
        let mut twice = once.clone();
        twice.normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_inserts_sorted() {
        let mut list = sample();
        let added = list.add(ms(8_000), "Demo").unwrap();
        assert_eq!(added.start, ms(8_000));
        assert_eq!(labels(&list), vec!["Intro", "Body", "Demo", "Outro"]);
        assert_eq!(list.position(added.id), Some(2));
    }

    #[test]
    fn test_add_duplicate_time_leaves_list_unchanged() {
        let mut list = sample();
        let before = list.clone();
        let err = list.add(ms(5_000), "Again").unwrap_err();
        assert_eq!(err, OperationError::DuplicateTime(ms(5_000)));
        assert_eq!(list, before);
    }

    #[test]
    fn test_add_to_empty_list_starts_at_zero() {
        let mut list = ChapterList::new();
        let added = list.add(ms(4_000), "").unwrap();
        assert_eq!(added.start, Timecode::ZERO);
        assert_eq!(added.label, "Chapter 1");
    }

    #[test]
    fn test_edit_label_and_time() {
        let mut list = sample();
        let body = list.as_slice()[1].id;

        let edited = list.edit(body, None, Some("   ")).unwrap();
        assert_eq!(edited.label, "Chapter 2");

        let edited = list.edit(body, Some(ms(20_000)), Some("Late body")).unwrap();
        assert_eq!(edited.start, ms(20_000));
        assert_eq!(labels(&list), vec!["Intro", "Outro", "Late body"]);
        assert_eq!(list.as_slice()[2].id, body);
    }

    #[test]
    fn test_edit_blank_label_numbered_after_move() {
        let mut list = sample();
        let body = list.as_slice()[1].id;

        let edited = list.edit(body, Some(ms(20_000)), Some("")).unwrap();
        assert_eq!(edited.label, "Chapter 3");
        assert_eq!(labels(&list), vec!["Intro", "Outro", "Chapter 3"]);
    }

    #[test]
    fn test_edit_errors() {
        let mut list = sample();
        let before = list.clone();
        let intro = list.as_slice()[0].id;
        assert_eq!(
            list.edit(intro, Some(ms(12_000)), Some("x")),
            Err(OperationError::DuplicateTime(ms(12_000)))
        );
        assert_eq!(list, before);

        let missing = ChapterId(999);
        assert_eq!(list.edit(missing, None, Some("x")), Err(OperationError::NotFound(missing)));
    }

    #[test]
    fn test_edit_first_chapter_away_from_zero_rezeroes() {
        let mut list = sample();
        let intro = list.as_slice()[0].id;
        list.edit(intro, Some(ms(7_000)), None).unwrap();
        assert_eq!(starts(&list), vec![0, 2_000, 7_000]);
        assert_eq!(labels(&list), vec!["Body", "Intro", "Outro"]);
    }

    #[test]
    fn test_remove_first_rezeroes() {
        let mut list = sample();
        let intro = list.as_slice()[0].id;
        let removed = list.remove(intro).unwrap();
        assert_eq!(removed.label, "Intro");
        assert_eq!(starts(&list), vec![0, 7_000]);

        assert_eq!(list.remove(intro), Err(OperationError::NotFound(intro)));
    }

    #[test]
    fn test_remove_middle_keeps_times() {
        let mut list = sample();
        let body = list.as_slice()[1].id;
        list.remove(body).unwrap();
        assert_eq!(starts(&list), vec![0, 12_000]);
    }

    #[test]
    fn test_reorder_moves_labels_not_times() {
        let mut list = sample();
        let outro = list.as_slice()[2].id;
        list.reorder(outro, 0).unwrap();
        assert_eq!(starts(&list), vec![0, 5_000, 12_000]);
        assert_eq!(labels(&list), vec!["Outro", "Intro", "Body"]);
        assert_eq!(list.get(outro).unwrap().start, Timecode::ZERO);

        assert_eq!(
            list.reorder(outro, 3),
            Err(OperationError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_merge_with_next() {
        let mut list = sample();
        let intro = list.as_slice()[0].id;
        let outro = list.as_slice()[2].id;

        let merged = list.merge_with_next(intro).unwrap();
        assert_eq!(merged.label, "Intro");
        assert_eq!(labels(&list), vec!["Intro", "Outro"]);
        assert_eq!(list.merge_with_next(outro), Err(OperationError::NothingToMerge(outro)));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut list = sample();
        let last = list.as_slice()[2].id;
        list.remove(last).unwrap();
        let added = list.add(ms(30_000), "New").unwrap();
        assert!(added.id > last);
    }
}
