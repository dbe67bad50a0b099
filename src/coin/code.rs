//! Six-character game codes

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoinError;

/// Length of every game code
pub const CODE_LEN: usize = 6;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A validated game code: six characters from `[0-9A-Z]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameCode(String);

impl GameCode {
    /// Draw a fresh random code
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let code = (0..CODE_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parse player input: trims and upper-cases before validating
    pub fn parse(input: &str) -> Result<Self, CoinError> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != CODE_LEN || !code.bytes().all(|b| ALPHABET.contains(&b)) {
            return Err(CoinError::MalformedCode);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameCode {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GameCode {
    type Error = CoinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GameCode> for String {
    fn from(code: GameCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_generated_codes_parse_back() {
        let mut rng = Pcg32::seed_from_u64(2024);
        for _ in 0..100 {
            let code = GameCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert_eq!(GameCode::parse(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let code = GameCode::parse("  ab12cd ").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(GameCode::parse("").is_err());
        assert!(GameCode::parse("ABC12").is_err());
        assert!(GameCode::parse("ABC1234").is_err());
        assert!(GameCode::parse("AB-12C").is_err());
        assert!(GameCode::parse("가나다라마바").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let code: GameCode = serde_json::from_str("\"xyz789\"").unwrap();
        assert_eq!(code.to_string(), "XYZ789");
        assert!(serde_json::from_str::<GameCode>("\"nope\"").is_err());
    }
}
