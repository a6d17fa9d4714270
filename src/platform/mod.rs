//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keys and swipes mapped to intents)
//! - Storage (LocalStorage on web, files natively)
//! - Wall-clock dates for leaderboard entries

pub mod input;
pub mod storage;

pub use input::{SwipeDetector, intent_for_key};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, Storage, StorageError};

/// Today's date for display next to leaderboard entries
#[cfg(target_arch = "wasm32")]
pub fn today() -> String {
    let date = js_sys::Date::new_0();
    format!(
        "{}/{}/{}",
        date.get_date(),
        date.get_month() + 1,
        date.get_full_year()
    )
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}
