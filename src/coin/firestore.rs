//! Firestore REST backend for game documents
//!
//! Games live at `artifacts/{namespace}/public/data/games/{code}`. Requests
//! go through `reqwest`, which uses `fetch` in the browser. Players sign in
//! anonymously through Identity Toolkit and send the ID token as a bearer.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::code::GameCode;
use super::store::{GameDoc, GameStore, User};
use crate::error::StoreError;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const SIGN_UP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

fn default_namespace() -> String {
    "default-app-id".to_string()
}

/// Connection settings, usually pasted from the Firebase console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreConfig {
    pub api_key: String,
    pub project_id: String,
    /// Top-level `artifacts/` folder games are stored under
    #[serde(default = "default_namespace")]
    pub app_namespace: String,
}

impl FirestoreConfig {
    /// Parse the page's JSON config block
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    /// Collection URL holding every game document
    pub fn games_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/artifacts/{}/public/data/games",
            FIRESTORE_BASE, self.project_id, self.app_namespace
        )
    }

    pub fn game_url(&self, code: &GameCode) -> String {
        format!("{}/{}", self.games_url(), code)
    }
}

/// Encode a game as a Firestore document body
pub fn encode_doc(doc: &GameDoc) -> Value {
    json!({
        "fields": {
            "probability": { "integerValue": doc.probability.to_string() },
            "maxGuesses": { "integerValue": doc.max_guesses.to_string() },
            "timestamp": { "integerValue": doc.timestamp.to_string() },
            "creatorId": { "stringValue": doc.creator_id },
        }
    })
}

fn field_u64(fields: &Map<String, Value>, name: &str) -> Result<Option<u64>, StoreError> {
    let Some(value) = fields.get(name) else {
        return Ok(None);
    };
    if let Some(text) = value.get("integerValue").and_then(Value::as_str) {
        return text
            .parse()
            .map(Some)
            .map_err(|_| StoreError::Malformed(format!("{name} is not an integer: {text}")));
    }
    if let Some(n) = value.get("integerValue").and_then(Value::as_u64) {
        return Ok(Some(n));
    }
    if let Some(n) = value.get("doubleValue").and_then(Value::as_f64) {
        if n >= 0.0 && n.fract() == 0.0 {
            return Ok(Some(n as u64));
        }
    }
    Err(StoreError::Malformed(format!("{name} has an unexpected type")))
}

fn field_string(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields
        .get(name)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

/// Decode a Firestore document body into a game
pub fn decode_doc(body: &Value) -> Result<GameDoc, StoreError> {
    let fields = body
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| StoreError::Malformed("document has no fields".into()))?;

    let probability = field_u64(fields, "probability")?
        .ok_or_else(|| StoreError::Malformed("probability is missing".into()))?;
    let probability = u8::try_from(probability)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| StoreError::Malformed(format!("probability out of range: {probability}")))?;

    let max_guesses = field_u64(fields, "maxGuesses")?.unwrap_or(0);

    Ok(GameDoc {
        probability,
        max_guesses: u32::try_from(max_guesses).unwrap_or(u32::MAX),
        timestamp: field_u64(fields, "timestamp")?.unwrap_or(0),
        creator_id: field_string(fields, "creatorId").unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    local_id: String,
}

/// Firestore's `error.message` from an error body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Turn a non-2xx response into a `StoreError`
fn status_error(status: u16, body: &str) -> StoreError {
    StoreError::Status {
        status,
        message: error_message(body),
    }
}

/// Outcome of a `createDocument` call; an existing code is never overwritten
fn create_outcome(status: u16, body: &str, code: &GameCode) -> Result<(), StoreError> {
    match status {
        200..=299 => Ok(()),
        409 => Err(StoreError::AlreadyExists(code.to_string())),
        _ => Err(status_error(status, body)),
    }
}

/// Outcome of a document `get`; 404 means no such game
fn fetch_outcome(status: u16, body: &str) -> Result<Option<GameDoc>, StoreError> {
    match status {
        200..=299 => {
            let value: Value =
                serde_json::from_str(body).map_err(|e| StoreError::Malformed(e.to_string()))?;
            decode_doc(&value).map(Some)
        }
        404 => Ok(None),
        _ => Err(status_error(status, body)),
    }
}

/// Game store backed by Firestore
#[derive(Debug)]
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirestoreConfig,
    id_token: RefCell<Option<String>>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            id_token: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// Create an anonymous account and keep its token for later requests
    pub async fn sign_in_anonymously(&self) -> Result<User, StoreError> {
        let response = self
            .client
            .post(SIGN_UP_URL)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({ "returnSecureToken": true }))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(status_error(status, &body));
        }

        let body: SignUpResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Malformed(e.to_string()))?;
        *self.id_token.borrow_mut() = Some(body.id_token);
        log::info!("Signed in anonymously as {}", body.local_id);
        Ok(User { uid: body.local_id })
    }

    fn token(&self) -> Result<String, StoreError> {
        self.id_token
            .borrow()
            .clone()
            .ok_or(StoreError::Unauthenticated)
    }
}

impl GameStore for FirestoreStore {
    async fn create_game(&self, code: &GameCode, doc: &GameDoc) -> Result<(), StoreError> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.config.games_url())
            .query(&[
                ("documentId", code.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .bearer_auth(token)
            .json(&encode_doc(doc))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        create_outcome(status, &body, code)
    }

    async fn fetch_game(&self, code: &GameCode) -> Result<Option<GameDoc>, StoreError> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.config.game_url(code))
            .query(&[("key", self.config.api_key.as_str())])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        fetch_outcome(status, &body)
    }
}
