//! Screen flow of the coin game
//!
//! Home -> Maker (pick odds, publish, show code) or Home -> Detective (type
//! code) -> Game. Store calls happen outside; the app only records their
//! results so no borrow is held across an await.

use super::code::{CODE_LEN, GameCode};
use super::lobby::MakerForm;
use super::session::{Feedback, Session, next_milestone};
use super::store::User;
use crate::error::CoinError;

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Maker,
    Detective,
    Game,
}

/// Whole coin game UI state
#[derive(Debug, Clone, Default)]
pub struct CoinApp {
    pub view: View,
    pub form: MakerForm,
    /// Code shown to the maker after publishing
    pub created_code: Option<GameCode>,
    /// What the detective typed
    pub code_input: String,
    /// What the detective typed into the guess box
    pub guess_input: String,
    pub session: Option<Session>,
    /// A store request is in flight
    pub loading: bool,
    pub user: Option<User>,
}

impl CoinApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_maker(&mut self) {
        self.view = View::Maker;
    }

    pub fn open_detective(&mut self) {
        self.view = View::Detective;
    }

    /// "Back" from the maker or detective screens
    pub fn back(&mut self) {
        if matches!(self.view, View::Maker | View::Detective) && self.created_code.is_none() {
            self.view = View::Home;
        }
    }

    pub fn signed_in(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Keep at most six characters, upper-cased
    pub fn set_code_input(&mut self, input: &str) {
        self.code_input = input.chars().take(CODE_LEN).collect::<String>().to_uppercase();
    }

    pub fn can_create(&self) -> bool {
        self.user.is_some() && !self.loading && self.created_code.is_none()
    }

    pub fn can_join(&self) -> bool {
        self.user.is_some() && !self.loading && self.code_input.chars().count() >= CODE_LEN
    }

    /// Mark a request as started; false if one is already running
    pub fn begin_request(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Record the outcome of a create request
    pub fn finish_create(&mut self, result: Result<GameCode, CoinError>) -> Result<(), CoinError> {
        self.loading = false;
        self.created_code = Some(result?);
        Ok(())
    }

    /// Record the outcome of a join request; success opens the game screen
    pub fn finish_join(&mut self, result: Result<Session, CoinError>) -> Result<(), CoinError> {
        self.loading = false;
        self.session = Some(result?);
        self.guess_input.clear();
        self.view = View::Game;
        Ok(())
    }

    /// The guess box changed
    pub fn set_guess_input(&mut self, input: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.is_game_over() {
            return;
        }
        session.edit_guess();
        self.guess_input = input.to_string();
    }

    /// Submit whatever is in the guess box
    pub fn submit_guess(&mut self) -> Result<Feedback, CoinError> {
        let session = self.session.as_mut().ok_or(CoinError::RoundOver)?;
        session.submit_guess(&self.guess_input)
    }

    /// Leave the game or the code screen and start over from Home
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop_auto_flip();
        }
        self.view = View::Home;
        self.created_code = None;
        self.code_input.clear();
        self.guess_input.clear();
        self.session = None;
        self.loading = false;
    }
}

/// `12345` -> `"12,345"`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Text on the auto-flip button
pub fn auto_flip_label(session: &Session) -> String {
    if session.auto.running {
        return "멈추기".to_string();
    }
    match session.current_batch_size() {
        1 => "자동 던지기".to_string(),
        n => format!("자동 {n}회 던지기"),
    }
}

/// Hint under the auto-flip button about the next batch upgrade
pub fn upgrade_hint(session: &Session) -> Option<String> {
    if session.auto.running || session.is_game_over() {
        return None;
    }
    next_milestone(session.stats.total)
        .map(|m| format!("✨ {}회 도달 시 기능 업그레이드!", group_thousands(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in_app() -> CoinApp {
        let mut app = CoinApp::new();
        app.signed_in(User { uid: "u".into() });
        app
    }

    #[test]
    fn test_maker_flow() {
        let mut app = signed_in_app();
        app.open_maker();
        assert!(app.can_create());
        assert!(app.begin_request());
        assert!(!app.begin_request());
        assert!(!app.can_create());

        app.finish_create(Ok(GameCode::parse("ABC123").unwrap())).unwrap();
        assert!(!app.loading);
        assert_eq!(app.created_code.as_ref().unwrap().as_str(), "ABC123");

        // Once a code is showing, only "start over" leaves the screen
        app.back();
        assert_eq!(app.view, View::Maker);
        app.reset();
        assert_eq!(app.view, View::Home);
        assert!(app.created_code.is_none());
    }

    #[test]
    fn test_failed_create_stays_on_form() {
        let mut app = signed_in_app();
        app.open_maker();
        app.begin_request();
        let err = app.finish_create(Err(CoinError::NotSignedIn)).unwrap_err();
        assert!(matches!(err, CoinError::NotSignedIn));
        assert!(!app.loading);
        assert!(app.can_create());
    }

    #[test]
    fn test_detective_flow() {
        let mut app = CoinApp::new();
        app.open_detective();
        app.set_code_input("abc1234567");
        assert_eq!(app.code_input, "ABC123");
        // Not signed in yet
        assert!(!app.can_join());
        app.signed_in(User { uid: "d".into() });
        assert!(app.can_join());

        let session = Session::new(GameCode::parse("ABC123").unwrap(), 10, 2);
        app.finish_join(Ok(session)).unwrap();
        assert_eq!(app.view, View::Game);

        app.set_guess_input("11");
        assert_eq!(app.submit_guess().unwrap(), Feedback::Wrong);
        app.set_guess_input("12");
        assert_eq!(app.session.as_ref().unwrap().feedback, None);
        assert_eq!(app.submit_guess().unwrap(), Feedback::GameOver);

        // Input is locked after the round is lost
        app.set_guess_input("10");
        assert_eq!(app.guess_input, "12");

        app.reset();
        assert_eq!(app.view, View::Home);
        assert!(app.session.is_none());
        assert!(app.code_input.is_empty());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_auto_flip_texts() {
        let mut session = Session::new(GameCode::parse("ABC123").unwrap(), 50, 5);
        assert_eq!(auto_flip_label(&session), "자동 던지기");
        assert_eq!(
            upgrade_hint(&session).as_deref(),
            Some("✨ 100회 도달 시 기능 업그레이드!")
        );

        session.stats.total = 1_500;
        assert_eq!(auto_flip_label(&session), "자동 100회 던지기");
        assert_eq!(
            upgrade_hint(&session).as_deref(),
            Some("✨ 10,000회 도달 시 기능 업그레이드!")
        );

        session.start_auto_flip();
        assert_eq!(auto_flip_label(&session), "멈추기");
        assert_eq!(upgrade_hint(&session), None);
    }

    #[test]
    fn test_failed_join_stays_on_detective() {
        let mut app = signed_in_app();
        app.open_detective();
        app.set_code_input("ZZZZZZ");
        app.begin_request();
        let err = app
            .finish_join(Err(CoinError::UnknownCode("ZZZZZZ".into())))
            .unwrap_err();
        assert!(err.user_message().contains("코드"));
        assert_eq!(app.view, View::Detective);
        assert!(!app.loading);
    }
}
