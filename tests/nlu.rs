//! NLU payload parsing tests

use standin::{CONTACT_ENTITY_KEY, ClassificationResult};

#[test]
fn parses_full_payload() {
    let payload = r#"{
        "text": "alex are you there",
        "intents": [
            {"id": "1", "name": "presence_check", "confidence": 0.9578},
            {"id": "2", "name": "question_asked", "confidence": 0.0312}
        ],
        "entities": {
            "wit$contact:contact": [
                {
                    "id": "3",
                    "name": "wit$contact",
                    "role": "contact",
                    "start": 0,
                    "end": 4,
                    "body": "alex",
                    "confidence": 0.9201,
                    "value": "alex",
                    "type": "value"
                }
            ]
        }
    }"#;

    let result: ClassificationResult = serde_json::from_str(payload).unwrap();

    assert_eq!(result.text, "alex are you there");
    assert_eq!(result.intents.len(), 2);
    assert_eq!(result.intents[0].name, "presence_check");
    assert!((result.intents[0].confidence - 0.9578).abs() < 1e-6);

    let contacts = result.contacts();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].body, "alex");
    assert!((contacts[0].confidence - 0.9201).abs() < 1e-6);
}

#[test]
fn missing_fields_default_to_empty() {
    let result: ClassificationResult = serde_json::from_str("{}").unwrap();

    assert!(result.text.is_empty());
    assert!(result.intents.is_empty());
    assert!(result.entities.is_empty());
    assert!(result.contacts().is_empty());
}

#[test]
fn empty_intents_and_entities_parse() {
    let payload = r#"{"text": "mumble", "intents": [], "entities": {}}"#;
    let result: ClassificationResult = serde_json::from_str(payload).unwrap();

    assert_eq!(result.text, "mumble");
    assert!(result.intents.is_empty());
    assert!(result.contacts().is_empty());
}

#[test]
fn contacts_is_empty_for_other_entity_types() {
    let payload = r#"{
        "text": "see you tomorrow",
        "intents": [{"name": "farewell", "confidence": 0.8}],
        "entities": {
            "wit$datetime:datetime": [
                {"body": "tomorrow", "confidence": 0.99}
            ]
        }
    }"#;

    let result: ClassificationResult = serde_json::from_str(payload).unwrap();

    assert_eq!(result.entities.len(), 1);
    assert!(result.contacts().is_empty());
}

#[test]
fn contacts_preserve_order() {
    let payload = format!(
        r#"{{
            "text": "bob and alex",
            "intents": [{{"name": "presence_check", "confidence": 0.95}}],
            "entities": {{
                "{CONTACT_ENTITY_KEY}": [
                    {{"body": "bob", "confidence": 0.91}},
                    {{"body": "alex", "confidence": 0.93}}
                ]
            }}
        }}"#
    );

    let result: ClassificationResult = serde_json::from_str(&payload).unwrap();

    let bodies: Vec<&str> = result.contacts().iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, ["bob", "alex"]);
}
