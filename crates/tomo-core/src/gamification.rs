//! Gamification engine
//!
//! Tracks experience points, level, and the daily-visit streak. Levels are
//! derived from XP against a fixed threshold table but cached on the stats
//! record and only ever advanced forward, one step per grant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// XP for adding a book to the catalog
pub const XP_BOOK_ADDED: u64 = 10;
/// XP for finishing a book (added as completed, or transitioned to it)
pub const XP_BOOK_FINISHED: u64 = 50;
/// XP for adding a vocabulary entry
pub const XP_WORD_ADDED: u64 = 5;
/// XP for the first visit of a calendar day
pub const XP_DAILY_VISIT: u64 = 10;

/// Highest reachable level
pub const MAX_LEVEL: u32 = 6;

/// XP required to hold the given level
///
/// `None` means the level is unreachable: once at [`MAX_LEVEL`], XP keeps
/// accumulating but no further level-ups fire.
pub fn xp_threshold(level: u32) -> Option<u64> {
    match level {
        0 | 1 => Some(0),
        2 => Some(100),
        3 => Some(300),
        4 => Some(600),
        5 => Some(1000),
        6 => Some(2000),
        _ => None,
    }
}

/// Display title for a level
pub fn level_title(level: u32) -> &'static str {
    match level {
        0 | 1 => "Initiate",
        2 => "Novice Reader",
        3 => "Bookworm",
        4 => "Scholar",
        5 => "Master Librarian",
        _ => "Grand Archmage",
    }
}

/// Why XP was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpReason {
    BookAdded,
    BookFinished,
    WordAdded,
    DailyVisit,
}

impl std::fmt::Display for XpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            XpReason::BookAdded => "book added",
            XpReason::BookFinished => "book finished",
            XpReason::WordAdded => "word added",
            XpReason::DailyVisit => "daily visit",
        };
        write!(f, "{}", text)
    }
}

/// Event emitted by the engine for the presentation layer to surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// XP was granted without crossing a level threshold
    XpGained { amount: u64, reason: XpReason },
    /// A level threshold was crossed; suppresses the XP toast for the grant
    LevelUp { level: u32 },
}

/// Sink for gamification events
///
/// The presentation layer subscribes by implementing this; the default is
/// a no-op sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that discards all events
#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Per-namespace gamification state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub xp: u64,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Consecutive calendar days with at least one visit
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_visit: Option<NaiveDate>,
    /// Lifetime counter; not decremented when books are deleted
    #[serde(default)]
    pub books_read: u64,
    /// Lifetime counter; not decremented when words are deleted
    #[serde(default)]
    pub words_learned: u64,
}

fn default_level() -> u32 {
    1
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            streak: 0,
            last_visit: None,
            books_read: 0,
            words_learned: 0,
        }
    }
}

impl UserStats {
    /// Grant XP and advance the level by at most one step
    ///
    /// A single grant advances at most one level even when the new total
    /// crosses two thresholds. Emits either `LevelUp` or `XpGained`, never
    /// both for the same grant.
    pub fn grant_xp(&mut self, amount: u64, reason: XpReason, notifier: &dyn Notifier) {
        self.xp += amount;
        debug!(amount, %reason, xp = self.xp, "xp granted");

        match xp_threshold(self.level + 1) {
            Some(threshold) if self.xp >= threshold => {
                self.level += 1;
                notifier.notify(Notification::LevelUp { level: self.level });
            }
            _ => notifier.notify(Notification::XpGained { amount, reason }),
        }
    }

    /// Run the once-per-session daily streak check
    ///
    /// Same day as the last visit: no-op. Last visit exactly yesterday:
    /// the streak grows. Anything else (a gap, or no prior visit): the
    /// streak restarts at 1. When the date changed, `last_visit` moves to
    /// `today` and the daily-visit XP is granted. Returns whether the date
    /// changed.
    pub fn check_daily_streak(&mut self, today: NaiveDate, notifier: &dyn Notifier) -> bool {
        if self.last_visit == Some(today) {
            return false;
        }

        let continued = match (self.last_visit, today.pred_opt()) {
            (Some(last), Some(yesterday)) => last == yesterday,
            _ => false,
        };
        self.streak = if continued { self.streak + 1 } else { 1 };
        self.last_visit = Some(today);
        self.grant_xp(XP_DAILY_VISIT, XpReason::DailyVisit, notifier);
        true
    }

    /// XP threshold for the next level, or `None` at the ceiling
    pub fn next_threshold(&self) -> Option<u64> {
        xp_threshold(self.level + 1)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// Notifier that records every event, for assertions
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<Notification> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.events.lock().unwrap().push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingNotifier;
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(xp_threshold(1), Some(0));
        assert_eq!(xp_threshold(2), Some(100));
        assert_eq!(xp_threshold(6), Some(2000));
        assert_eq!(xp_threshold(7), None);
    }

    #[test]
    fn test_grant_xp_no_level_up() {
        let mut stats = UserStats::default();
        let notifier = RecordingNotifier::new();

        stats.grant_xp(10, XpReason::BookAdded, &notifier);

        assert_eq!(stats.xp, 10);
        assert_eq!(stats.level, 1);
        assert_eq!(
            notifier.events(),
            vec![Notification::XpGained {
                amount: 10,
                reason: XpReason::BookAdded
            }]
        );
    }

    #[test]
    fn test_grant_xp_level_up_suppresses_xp_toast() {
        let mut stats = UserStats {
            xp: 95,
            ..UserStats::default()
        };
        let notifier = RecordingNotifier::new();

        stats.grant_xp(10, XpReason::BookAdded, &notifier);

        assert_eq!(stats.level, 2);
        assert_eq!(notifier.events(), vec![Notification::LevelUp { level: 2 }]);
    }

    #[test]
    fn test_grant_xp_advances_one_level_per_grant() {
        // 0 -> 350 crosses the thresholds for levels 2 and 3, but a single
        // grant moves one step only.
        let mut stats = UserStats::default();
        let notifier = NoopNotifier;

        stats.grant_xp(350, XpReason::BookFinished, &notifier);
        assert_eq!(stats.level, 2);

        // The next grant catches up.
        stats.grant_xp(5, XpReason::WordAdded, &notifier);
        assert_eq!(stats.level, 3);
    }

    #[test]
    fn test_no_level_up_past_ceiling() {
        let mut stats = UserStats {
            xp: 5000,
            level: MAX_LEVEL,
            ..UserStats::default()
        };
        let notifier = RecordingNotifier::new();

        stats.grant_xp(1000, XpReason::BookFinished, &notifier);

        assert_eq!(stats.level, MAX_LEVEL);
        assert_eq!(stats.xp, 6000);
        assert_eq!(
            notifier.events(),
            vec![Notification::XpGained {
                amount: 1000,
                reason: XpReason::BookFinished
            }]
        );
    }

    #[test]
    fn test_streak_same_day_is_noop() {
        let today = date(2026, 3, 10);
        let mut stats = UserStats {
            streak: 4,
            last_visit: Some(today),
            ..UserStats::default()
        };
        let notifier = RecordingNotifier::new();

        assert!(!stats.check_daily_streak(today, &notifier));
        assert_eq!(stats.streak, 4);
        assert_eq!(stats.xp, 0);
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        let mut stats = UserStats {
            streak: 4,
            last_visit: Some(date(2026, 3, 9)),
            ..UserStats::default()
        };

        assert!(stats.check_daily_streak(date(2026, 3, 10), &NoopNotifier));
        assert_eq!(stats.streak, 5);
        assert_eq!(stats.last_visit, Some(date(2026, 3, 10)));
        assert_eq!(stats.xp, XP_DAILY_VISIT);
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let mut stats = UserStats {
            streak: 9,
            last_visit: Some(date(2026, 3, 7)),
            ..UserStats::default()
        };

        assert!(stats.check_daily_streak(date(2026, 3, 10), &NoopNotifier));
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn test_streak_first_visit() {
        let mut stats = UserStats::default();

        assert!(stats.check_daily_streak(date(2026, 3, 10), &NoopNotifier));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.xp, XP_DAILY_VISIT);
    }

    #[test]
    fn test_streak_crosses_month_boundary() {
        let mut stats = UserStats {
            streak: 2,
            last_visit: Some(date(2026, 2, 28)),
            ..UserStats::default()
        };

        assert!(stats.check_daily_streak(date(2026, 3, 1), &NoopNotifier));
        assert_eq!(stats.streak, 3);
    }

    #[test]
    fn test_level_titles() {
        assert_eq!(level_title(1), "Initiate");
        assert_eq!(level_title(4), "Scholar");
        assert_eq!(level_title(6), "Grand Archmage");
        assert_eq!(level_title(99), "Grand Archmage");
    }

    #[test]
    fn test_stats_serde_camel_case() {
        let stats = UserStats {
            xp: 120,
            level: 2,
            streak: 3,
            last_visit: Some(date(2026, 3, 10)),
            books_read: 1,
            words_learned: 4,
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["booksRead"], 1);
        assert_eq!(json["wordsLearned"], 4);
        assert_eq!(json["lastVisit"], "2026-03-10");

        let parsed: UserStats = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, stats);
    }

    #[test]
    fn test_stats_deserialize_defaults() {
        let parsed: UserStats = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, UserStats::default());
        assert_eq!(parsed.level, 1);
    }
}
