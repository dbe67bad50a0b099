//! Error types for the coin game and its remote store

use thiserror::Error;

/// Failures talking to the remote game store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed game document: {0}")]
    Malformed(String),

    #[error("game {0} already exists")]
    AlreadyExists(String),

    #[error("not signed in to the store")]
    Unauthenticated,
}

/// Coin game failures surfaced to the player
#[derive(Debug, Error)]
pub enum CoinError {
    #[error("game codes are 6 letters or digits")]
    MalformedCode,

    #[error("no game found for code {0}")]
    UnknownCode(String),

    #[error("a guess must be a whole number from 0 to 100")]
    InvalidGuess,

    #[error("this round is already over")]
    RoundOver,

    #[error("not signed in yet")]
    NotSignedIn,

    #[error("could not create the game: {0}")]
    Create(#[source] StoreError),

    #[error("could not join the game: {0}")]
    Join(#[source] StoreError),
}

impl CoinError {
    /// Alert text shown to the player
    pub fn user_message(&self) -> &'static str {
        match self {
            CoinError::MalformedCode | CoinError::UnknownCode(_) => {
                "유효하지 않은 게임 코드입니다. 코드를 다시 확인해주세요."
            }
            CoinError::InvalidGuess => "0부터 100 사이의 숫자를 입력해주세요.",
            CoinError::RoundOver => "이미 끝난 게임입니다.",
            CoinError::NotSignedIn => "서버 연결 중입니다. 잠시 후 다시 시도해주세요.",
            CoinError::Create(_) => "게임 생성에 실패했습니다. 다시 시도해주세요.",
            CoinError::Join(_) => "게임 접속에 실패했습니다. 인터넷 연결을 확인해주세요.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_keep_their_cause() {
        let err = CoinError::Join(StoreError::Status {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.user_message().contains("접속"));
    }

    #[test]
    fn test_bad_codes_share_one_message() {
        assert_eq!(
            CoinError::MalformedCode.user_message(),
            CoinError::UnknownCode("ABC123".into()).user_message()
        );
    }
}
