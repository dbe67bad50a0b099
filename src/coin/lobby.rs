//! Creating and joining games through a store

use rand::Rng;

use super::code::{CODE_LEN, GameCode};
use super::session::Session;
use super::store::{GameDoc, GameStore, User};
use crate::error::CoinError;

/// Probability range the maker can pick from
pub const PROBABILITY_MAX: u8 = 100;
/// Guess budget range the maker can pick from
pub const MAX_GUESSES_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// The maker's sliders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MakerForm {
    probability: u8,
    max_guesses: u32,
}

impl Default for MakerForm {
    fn default() -> Self {
        Self {
            probability: 50,
            max_guesses: 5,
        }
    }
}

impl MakerForm {
    pub fn probability(&self) -> u8 {
        self.probability
    }

    pub fn max_guesses(&self) -> u32 {
        self.max_guesses
    }

    pub fn set_probability(&mut self, probability: u32) {
        self.probability = probability.min(PROBABILITY_MAX as u32) as u8;
    }

    pub fn set_max_guesses(&mut self, max_guesses: u32) {
        self.max_guesses =
            max_guesses.clamp(*MAX_GUESSES_RANGE.start(), *MAX_GUESSES_RANGE.end());
    }
}

/// Publish a new game and return its code
pub async fn create_game<S: GameStore, R: Rng>(
    store: &S,
    rng: &mut R,
    form: &MakerForm,
    user: Option<&User>,
    now_ms: u64,
) -> Result<GameCode, CoinError> {
    let user = user.ok_or(CoinError::NotSignedIn)?;
    let code = GameCode::generate(rng);
    let doc = GameDoc {
        probability: form.probability(),
        max_guesses: form.max_guesses(),
        timestamp: now_ms,
        creator_id: user.uid.clone(),
    };

    // A taken code is reported like any other store failure
    store.create_game(&code, &doc).await.map_err(|e| {
        log::error!("Error creating game {}: {}", code, e);
        CoinError::Create(e)
    })?;

    log::info!(
        "Created game {} ({}%, {} guesses)",
        code,
        doc.probability,
        doc.max_guesses
    );
    Ok(code)
}

/// Look up a code typed by a detective and open a fresh session
pub async fn join_game<S: GameStore>(store: &S, input: &str) -> Result<Session, CoinError> {
    if input.trim().chars().count() < CODE_LEN {
        return Err(CoinError::MalformedCode);
    }
    let code = GameCode::parse(input)?;

    let doc = store.fetch_game(&code).await.map_err(|e| {
        log::error!("Error joining game {}: {}", code, e);
        CoinError::Join(e)
    })?;

    match doc {
        Some(doc) => {
            log::info!("Joined game {}", code);
            Ok(Session::new(code, doc.probability, doc.max_guesses))
        }
        None => {
            log::warn!("No game under code {}", code);
            Err(CoinError::UnknownCode(code.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::session::{Face, Feedback};
    use crate::coin::store::MemoryStore;
    use crate::error::StoreError;
    use pollster::block_on;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct BrokenStore;

    impl GameStore for BrokenStore {
        async fn create_game(&self, _: &GameCode, _: &GameDoc) -> Result<(), StoreError> {
            Err(StoreError::Status {
                status: 500,
                message: "boom".into(),
            })
        }

        async fn fetch_game(&self, _: &GameCode) -> Result<Option<GameDoc>, StoreError> {
            Err(StoreError::Unauthenticated)
        }
    }

    fn maker() -> User {
        User {
            uid: "maker-1".into(),
        }
    }

    #[test]
    fn test_form_clamps() {
        let mut form = MakerForm::default();
        assert_eq!((form.probability(), form.max_guesses()), (50, 5));
        form.set_probability(150);
        form.set_max_guesses(0);
        assert_eq!((form.probability(), form.max_guesses()), (100, 1));
        form.set_max_guesses(99);
        assert_eq!(form.max_guesses(), 20);
    }

    #[test]
    fn test_create_then_join() {
        let store = MemoryStore::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut form = MakerForm::default();
        form.set_probability(35);
        form.set_max_guesses(3);

        let code = block_on(create_game(&store, &mut rng, &form, Some(&maker()), 42)).unwrap();
        let stored = block_on(store.fetch_game(&code)).unwrap().unwrap();
        assert_eq!(stored.creator_id, "maker-1");
        assert_eq!(stored.timestamp, 42);

        // Detectives may type lower case
        let mut session =
            block_on(join_game(&store, &code.as_str().to_lowercase())).unwrap();
        assert_eq!(session.code, code);
        assert_eq!(session.max_guesses, 3);
        assert_eq!(session.guesses_used, 0);
        assert_eq!(session.stats.total, 0);
        assert_eq!(session.face, Face::Heads);
        assert_eq!(session.feedback, None);
        assert_eq!(session.submit_guess("35").unwrap(), Feedback::Correct);
    }

    #[test]
    fn test_create_reports_taken_code() {
        let store = MemoryStore::new();
        let mut rng = Pcg32::seed_from_u64(9);
        let taken = GameCode::generate(&mut rng.clone());
        let doc = GameDoc {
            probability: 10,
            max_guesses: 5,
            timestamp: 1,
            creator_id: "someone-else".into(),
        };
        block_on(store.create_game(&taken, &doc)).unwrap();

        let err =
            block_on(create_game(&store, &mut rng, &MakerForm::default(), Some(&maker()), 2))
                .unwrap_err();
        assert!(matches!(err, CoinError::Create(StoreError::AlreadyExists(code)) if code == taken.as_str()));
        assert_eq!(store.len(), 1);
        assert_eq!(block_on(store.fetch_game(&taken)).unwrap().unwrap(), doc);
    }

    #[test]
    fn test_create_requires_user() {
        let store = MemoryStore::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let err = block_on(create_game(&store, &mut rng, &MakerForm::default(), None, 0))
            .unwrap_err();
        assert!(matches!(err, CoinError::NotSignedIn));
        assert!(store.is_empty());
    }

    #[test]
    fn test_join_rejects_short_and_unknown_codes() {
        let store = MemoryStore::new();
        assert!(matches!(
            block_on(join_game(&store, "ABC")),
            Err(CoinError::MalformedCode)
        ));
        assert!(matches!(
            block_on(join_game(&store, "ABC123")),
            Err(CoinError::UnknownCode(code)) if code == "ABC123"
        ));
    }

    #[test]
    fn test_store_failures_are_surfaced() {
        let mut rng = Pcg32::seed_from_u64(5);
        let err = block_on(create_game(
            &BrokenStore,
            &mut rng,
            &MakerForm::default(),
            Some(&maker()),
            0,
        ))
        .unwrap_err();
        assert!(matches!(err, CoinError::Create(StoreError::Status { status: 500, .. })));

        let err = block_on(join_game(&BrokenStore, "ABC123")).unwrap_err();
        assert!(matches!(err, CoinError::Join(_)));
    }
}
