// SPDX-FileCopyrightText: 2026 Tankobon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup data model.
//!
//! An immutable value deserialized from a manga-tracker backup export.
//! Every field is optional in the wire format; timestamps are Unix
//! milliseconds.

use serde::{Deserialize, Serialize};

/// Horizon after which reading history no longer counts as "recent".
const HISTORY_HORIZON_MS: i64 = 16 * 24 * 60 * 60 * 1000;
/// Horizon for judging whether a source is still publishing chapters.
const CHAPTER_HORIZON_MS: i64 = 21 * 24 * 60 * 60 * 1000;

/// Root of a backup snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Backup {
    pub manga: Vec<Manga>,
    pub categories: Vec<Category>,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manga {
    pub source: Option<i64>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Publication status as reported by the source; `2` means completed.
    pub status: Option<i32>,
    pub chapters: Vec<Chapter>,
    pub history: Vec<History>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chapter {
    pub url: Option<String>,
    pub name: Option<String>,
    pub chapter_number: Option<f32>,
    pub read: Option<bool>,
    pub date_fetch: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub name: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Source {
    pub source_id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct History {
    pub url: Option<String>,
    pub last_read: Option<i64>,
}

/// Derived reading state of a tracked manga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingState {
    /// No chapter read yet.
    Unread,
    /// Actively being read, or the source recently published.
    Reading,
    /// Unread chapters piling up with no recent activity.
    Behind,
    /// All chapters read, source still publishing.
    CaughtUp,
    /// All chapters read, source marked the series completed.
    Finished,
}

impl Manga {
    pub fn total_chapters(&self) -> usize {
        self.chapters.len()
    }

    pub fn read_chapters(&self) -> usize {
        self.chapters
            .iter()
            .filter(|c| c.read.unwrap_or(false))
            .count()
    }

    /// Most recent history entry, if any.
    pub fn last_read(&self) -> Option<i64> {
        self.history.iter().filter_map(|h| h.last_read).max()
    }

    /// Classify the reading state relative to `now_ms`.
    ///
    /// Partially-read entries count as `Reading` when either the history
    /// is recent or the newest fetched chapter is recent while the
    /// third-newest already fell behind the horizon and was read (the
    /// source is still publishing faster than the reader catches up).
    pub fn reading_state(&self, now_ms: i64) -> ReadingState {
        let read = self.read_chapters();
        if read == 0 {
            return ReadingState::Unread;
        }

        if read != self.total_chapters() {
            let history_horizon = now_ms - HISTORY_HORIZON_MS;
            if self.last_read().is_some_and(|t| t > history_horizon) {
                return ReadingState::Reading;
            }

            let mut by_fetch: Vec<&Chapter> = self.chapters.iter().collect();
            by_fetch.sort_by_key(|c| std::cmp::Reverse(c.date_fetch.unwrap_or(0)));

            if by_fetch.len() >= 3 {
                let chapter_horizon = now_ms - CHAPTER_HORIZON_MS;
                let (newest, third) = (by_fetch[0], by_fetch[2]);
                if !newest.read.unwrap_or(false)
                    && third.read.unwrap_or(false)
                    && newest.date_fetch.unwrap_or(0) > chapter_horizon
                    && third.date_fetch.unwrap_or(0) <= chapter_horizon
                {
                    return ReadingState::Reading;
                }
            }

            return ReadingState::Behind;
        }

        if self.status == Some(2) {
            ReadingState::Finished
        } else {
            ReadingState::CaughtUp
        }
    }

    /// [`Manga::reading_state`] against the current wall clock.
    pub fn current_reading_state(&self) -> ReadingState {
        self.reading_state(chrono::Utc::now().timestamp_millis())
    }
}
