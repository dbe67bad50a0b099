//! Remote game documents and the store they live in

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::code::GameCode;
use crate::error::StoreError;

/// What the maker publishes under a game code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDoc {
    /// Heads probability in percent
    pub probability: u8,
    /// Guess budget (0 means "use the default")
    #[serde(default)]
    pub max_guesses: u32,
    /// Creation time, Unix ms
    pub timestamp: u64,
    pub creator_id: String,
}

/// A signed-in store user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: String,
}

/// Document store keyed by game code
#[allow(async_fn_in_trait)]
pub trait GameStore {
    /// Write a new game; fails with `AlreadyExists` rather than overwrite
    async fn create_game(&self, code: &GameCode, doc: &GameDoc) -> Result<(), StoreError>;

    /// Look a game up by code
    async fn fetch_game(&self, code: &GameCode) -> Result<Option<GameDoc>, StoreError>;
}

/// In-process store for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RefCell<HashMap<GameCode, GameDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.borrow().is_empty()
    }
}

impl GameStore for MemoryStore {
    async fn create_game(&self, code: &GameCode, doc: &GameDoc) -> Result<(), StoreError> {
        let mut games = self.games.borrow_mut();
        if games.contains_key(code) {
            return Err(StoreError::AlreadyExists(code.to_string()));
        }
        games.insert(code.clone(), doc.clone());
        Ok(())
    }

    async fn fetch_game(&self, code: &GameCode) -> Result<Option<GameDoc>, StoreError> {
        Ok(self.games.borrow().get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> GameDoc {
        GameDoc {
            probability: 65,
            max_guesses: 7,
            timestamp: 1_700_000_000_000,
            creator_id: "maker".into(),
        }
    }

    #[test]
    fn test_doc_uses_camel_case_fields() {
        let json = serde_json::to_value(doc()).unwrap();
        assert_eq!(json["maxGuesses"], 7);
        assert_eq!(json["creatorId"], "maker");
        assert!(json.get("max_guesses").is_none());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let code = GameCode::parse("ABC123").unwrap();
        pollster::block_on(store.create_game(&code, &doc())).unwrap();
        assert_eq!(store.len(), 1);

        let found = pollster::block_on(store.fetch_game(&code)).unwrap();
        assert_eq!(found, Some(doc()));

        let other = GameCode::parse("ZZZ999").unwrap();
        assert_eq!(pollster::block_on(store.fetch_game(&other)).unwrap(), None);
    }

    #[test]
    fn test_memory_store_refuses_overwrite() {
        let store = MemoryStore::new();
        let code = GameCode::parse("ABC123").unwrap();
        pollster::block_on(store.create_game(&code, &doc())).unwrap();
        let err = pollster::block_on(store.create_game(&code, &doc())).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(c) if c == "ABC123"));
    }
}
