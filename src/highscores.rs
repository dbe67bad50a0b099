//! Fastest clear times for Prime Drop
//!
//! Persisted to LocalStorage, keeps the top 10 (lowest) times.

use serde::{Deserialize, Serialize};

/// Maximum number of clear times to keep
pub const MAX_CLEAR_TIMES: usize = 10;

/// A single clear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearEntry {
    /// Time from start to reaching the target, ms
    pub elapsed_ms: f64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Clear time leaderboard, fastest first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClearTimes {
    pub entries: Vec<ClearEntry>,
}

impl ClearTimes {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "prime_drop_records";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a time makes the board
    pub fn qualifies(&self, elapsed_ms: f64) -> bool {
        if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_CLEAR_TIMES {
            return true;
        }
        self.entries
            .last()
            .map(|e| elapsed_ms < e.elapsed_ms)
            .unwrap_or(true)
    }

    /// Add a clear time; returns the rank achieved (1-indexed)
    pub fn add_time(&mut self, elapsed_ms: f64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(elapsed_ms) {
            return None;
        }

        let entry = ClearEntry {
            elapsed_ms,
            timestamp,
        };

        // Ties keep the older entry ahead
        let pos = self.entries.iter().position(|e| elapsed_ms < e.elapsed_ms);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_CLEAR_TIMES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fastest time so far
    pub fn best(&self) -> Option<f64> {
        self.entries.first().map(|e| e.elapsed_ms)
    }

    /// Load records from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(times) = serde_json::from_str::<ClearTimes>(&json) {
                    log::info!("Loaded {} clear times", times.entries.len());
                    return times;
                }
            }
        }

        log::info!("No clear times found, starting fresh");
        Self::new()
    }

    /// Save records to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Clear times saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {}
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let diff_ms = js_sys::Date::now() - timestamp;
    relative_date(diff_ms).unwrap_or_else(|| {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}

/// Korean relative age for anything under a week old
#[allow(dead_code)]
fn relative_date(diff_ms: f64) -> Option<String> {
    let mins = (diff_ms / 60_000.0).floor().max(0.0) as i64;
    let hours = mins / 60;
    let days = hours / 24;

    Some(match (days, hours, mins) {
        (d, _, _) if d >= 7 => return None,
        (1, _, _) => "어제".to_string(),
        (d, _, _) if d > 1 => format!("{d}일 전"),
        (_, h, _) if h >= 1 => format!("{h}시간 전"),
        (_, _, m) if m >= 1 => format!("{m}분 전"),
        _ => "방금".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fastest_first() {
        let mut times = ClearTimes::new();
        assert_eq!(times.add_time(90_000.0, 1.0), Some(1));
        assert_eq!(times.add_time(60_000.0, 2.0), Some(1));
        assert_eq!(times.add_time(75_000.0, 3.0), Some(2));
        assert_eq!(times.best(), Some(60_000.0));
        let order: Vec<f64> = times.entries.iter().map(|e| e.elapsed_ms).collect();
        assert_eq!(order, vec![60_000.0, 75_000.0, 90_000.0]);
    }

    #[test]
    fn test_full_board_rejects_slow_times() {
        let mut times = ClearTimes::new();
        for i in 0..MAX_CLEAR_TIMES {
            times.add_time(10_000.0 * (i + 1) as f64, 0.0);
        }
        assert!(!times.qualifies(200_000.0));
        assert_eq!(times.add_time(200_000.0, 0.0), None);
        assert_eq!(times.add_time(5_000.0, 0.0), Some(1));
        assert_eq!(times.entries.len(), MAX_CLEAR_TIMES);
        assert_eq!(times.entries.last().unwrap().elapsed_ms, 90_000.0);
    }

    #[test]
    fn test_nonsense_times_never_qualify() {
        let times = ClearTimes::new();
        assert!(!times.qualifies(0.0));
        assert!(!times.qualifies(f64::NAN));
        assert!(times.is_empty());
    }

    #[test]
    fn test_relative_date() {
        assert_eq!(relative_date(10_000.0).as_deref(), Some("방금"));
        assert_eq!(relative_date(5.0 * 60_000.0).as_deref(), Some("5분 전"));
        assert_eq!(relative_date(3.0 * 3_600_000.0).as_deref(), Some("3시간 전"));
        assert_eq!(relative_date(30.0 * 3_600_000.0).as_deref(), Some("어제"));
        assert_eq!(relative_date(3.0 * 86_400_000.0).as_deref(), Some("3일 전"));
        assert_eq!(relative_date(8.0 * 86_400_000.0), None);
    }
}
