//! Intent classification via a Wit.ai-style NLU service
//!
//! UTF-8 text in, structured classification out: the echoed text, an ordered
//! intent list, and a mapping of entity type to extracted matches.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{Error, Result};

/// Entity key under which the NLU service reports contact/person names
pub const CONTACT_ENTITY_KEY: &str = "wit$contact:contact";

/// API version pin sent with each request
const API_VERSION: &str = "20240304";

/// One classified intent
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    /// Intent name (e.g. "presence_check")
    pub name: String,

    /// Classifier confidence in [0.0, 1.0]
    pub confidence: f32,
}

/// One extracted entity (here, a spoken contact name)
#[derive(Debug, Clone, Deserialize)]
pub struct EntityMatch {
    /// The matched literal as spoken
    pub body: String,

    /// Extractor confidence in [0.0, 1.0]
    pub confidence: f32,
}

/// Structured NLU response for one utterance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationResult {
    /// The text the service classified (echoed back)
    #[serde(default)]
    pub text: String,

    /// Detected intents, best first
    #[serde(default)]
    pub intents: Vec<Intent>,

    /// Extracted entities by entity type
    #[serde(default)]
    pub entities: BTreeMap<String, Vec<EntityMatch>>,
}

impl ClassificationResult {
    /// Contact entities, or an empty slice when none were extracted
    #[must_use]
    pub fn contacts(&self) -> &[EntityMatch] {
        self.entities
            .get(CONTACT_ENTITY_KEY)
            .map_or(&[], Vec::as_slice)
    }
}

/// Submits transcripts to the NLU service
pub struct IntentClassifier {
    client: reqwest::Client,
    url: String,
    access_token: String,
}

impl IntentClassifier {
    /// Create a new classifier
    #[must_use]
    pub fn new(url: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            access_token,
        }
    }

    /// Classify one transcript
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        tracing::debug!(text = %text, "classifying transcript");

        let response = self
            .client
            .get(&self.url)
            .query(&[("v", API_VERSION), ("q", text)])
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "NLU request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "NLU API error");
            return Err(Error::Nlu(format!("NLU API error {status}: {body}")));
        }

        let result: ClassificationResult = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse NLU response");
            e
        })?;

        tracing::debug!(
            intents = result.intents.len(),
            entity_types = result.entities.len(),
            "classification complete"
        );
        Ok(result)
    }
}
