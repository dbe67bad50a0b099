//! Rigged-coin detective game
//!
//! A maker picks a hidden heads probability and a guess budget, publishes it
//! under a six-character code, and detectives flip the coin until they can
//! name the probability.

pub mod app;
pub mod code;
pub mod firestore;
pub mod lobby;
pub mod session;
pub mod store;

pub use app::{CoinApp, View, auto_flip_label, upgrade_hint};
pub use code::GameCode;
pub use firestore::{FirestoreConfig, FirestoreStore};
pub use lobby::{MakerForm, create_game, join_game};
pub use session::{BatchOutcome, Face, Feedback, FlipStats, Session, batch_size, next_milestone};
pub use store::{GameDoc, GameStore, MemoryStore, User};
