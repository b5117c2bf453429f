//! Shared test utilities

use std::collections::BTreeMap;

use standin::{CONTACT_ENTITY_KEY, ClassificationResult, EntityMatch, Intent, ResponsePlayer};

/// Response player that records category names instead of touching audio hardware
#[derive(Default)]
pub struct RecordingPlayer {
    pub played: Vec<String>,
}

impl ResponsePlayer for RecordingPlayer {
    fn play(&mut self, category: &str) -> standin::Result<()> {
        self.played.push(category.to_string());
        Ok(())
    }
}

/// Build a classification with intents and contact entities
pub fn classification(
    text: &str,
    intents: &[(&str, f32)],
    contacts: &[(&str, f32)],
) -> ClassificationResult {
    let mut entities = BTreeMap::new();
    if !contacts.is_empty() {
        entities.insert(
            CONTACT_ENTITY_KEY.to_string(),
            contacts
                .iter()
                .map(|(body, confidence)| EntityMatch {
                    body: (*body).to_string(),
                    confidence: *confidence,
                })
                .collect(),
        );
    }

    ClassificationResult {
        text: text.to_string(),
        intents: intents
            .iter()
            .map(|(name, confidence)| Intent {
                name: (*name).to_string(),
                confidence: *confidence,
            })
            .collect(),
        entities,
    }
}
