//! Shapes the model's loosely-typed JSON into the strict result types.
//!
//! Hard requirements (a non-empty translation, at least one dictionary entry)
//! fail with [`TranslateError::Validation`]. Everything else is coerced: a
//! missing or wrong-shaped optional field becomes `None`, a sense without a
//! meaning is dropped, and an entry left without senses is dropped with it.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, TranslateError};
use crate::extract::extract_json_object;
use crate::models::{
    DictionaryEntry, DictionaryResult, DictionarySense, Mode, Outcome, TranslateRequest,
    TranslateResult,
};

type Object = Map<String, Value>;

/// Where a result came from; copied verbatim onto the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub latency_ms: Option<u64>,
}

/// Extracts the first JSON object from `raw` and parses it.
pub fn parse_object(raw: &str) -> Result<Object> {
    let blob = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(blob)
        .map_err(|err| TranslateError::parse(err.to_string(), raw))?;
    match value {
        Value::Object(object) => Ok(object),
        other => Err(TranslateError::parse(
            format!("expected a JSON object, got {}", kind_of(&other)),
            raw,
        )),
    }
}

pub fn coerce(
    request: &TranslateRequest,
    object: &Object,
    provenance: Provenance,
    raw: &str,
) -> Result<Outcome> {
    match request.mode {
        Mode::Translate => coerce_translation(object, provenance, raw).map(Outcome::Translation),
        Mode::Dictionary => {
            coerce_dictionary(&request.text, object, provenance, raw).map(Outcome::Dictionary)
        }
    }
}

pub fn coerce_translation(
    object: &Object,
    provenance: Provenance,
    raw: &str,
) -> Result<TranslateResult> {
    let translation = required_string(object.get("translation"));
    if translation.is_empty() {
        return Err(TranslateError::validation("missing translation", raw));
    }

    Ok(TranslateResult {
        translation,
        alternatives: string_list(object.get("alternatives")),
        notes: optional_string(object.get("notes")),
        detected_source_lang: optional_string(object.get("detected_source_lang")),
        provider: provenance.provider,
        model: provenance.model,
        latency_ms: provenance.latency_ms,
    })
}

/// `term_fallback` is used when the model omits `term` or leaves it empty.
pub fn coerce_dictionary(
    term_fallback: &str,
    object: &Object,
    provenance: Provenance,
    raw: &str,
) -> Result<DictionaryResult> {
    let term = optional_string(object.get("term"))
        .unwrap_or_else(|| term_fallback.trim().to_string());

    let entries_raw = match object.get("entries") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            return Err(TranslateError::validation(
                format!("expected 'entries' to be a list, got {}", kind_of(other)),
                raw,
            ));
        }
    };

    let mut entries = Vec::new();
    let mut dropped_entries = 0usize;
    let mut dropped_senses = 0usize;
    for entry in objects(entries_raw) {
        let candidates = array_or_empty(entry.get("senses"));
        let senses = objects(candidates)
            .filter_map(coerce_sense)
            .collect::<Vec<_>>();
        dropped_senses += candidates.len() - senses.len();
        if senses.is_empty() {
            dropped_entries += 1;
            continue;
        }
        entries.push(DictionaryEntry {
            pos: optional_string(entry.get("pos")),
            senses,
        });
    }
    if dropped_entries > 0 || dropped_senses > 0 {
        debug!(
            "dropped {} senses and {} entries from dictionary output",
            dropped_senses, dropped_entries
        );
    }

    if entries.is_empty() {
        return Err(TranslateError::validation("no entries", raw));
    }

    Ok(DictionaryResult {
        term,
        entries,
        provider: provenance.provider,
        model: provenance.model,
        latency_ms: provenance.latency_ms,
    })
}

fn coerce_sense(sense: &Object) -> Option<DictionarySense> {
    let meaning = required_string(sense.get("meaning"));
    if meaning.is_empty() {
        return None;
    }
    Some(DictionarySense {
        meaning,
        example_source: optional_string(sense.get("example_source")),
        example_target: optional_string(sense.get("example_target")),
        usage_notes: optional_string(sense.get("usage_notes")),
    })
}

/// Trimmed text of a scalar; empty when absent or null.
fn required_string(value: Option<&Value>) -> String {
    value.and_then(scalar_text).unwrap_or_default()
}

/// Trimmed text of a scalar, `None` when absent, null or blank.
fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(scalar_text).filter(|text| !text.is_empty())
}

/// Only an array is accepted; nulls and blank strings inside it are skipped.
fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let Some(Value::Array(items)) = value else {
        return None;
    };
    Some(
        items
            .iter()
            .filter_map(scalar_text)
            .filter(|text| !text.is_empty())
            .collect(),
    )
}

fn array_or_empty(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

fn objects(items: &[Value]) -> impl Iterator<Item = &Object> {
    items.iter().filter_map(Value::as_object)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    fn translate(value: Value) -> Result<TranslateResult> {
        coerce_translation(&object(value), Provenance::default(), "raw")
    }

    fn dictionary(value: Value) -> Result<DictionaryResult> {
        coerce_dictionary("fallback", &object(value), Provenance::default(), "raw")
    }

    #[test]
    fn empty_translation_is_rejected() {
        let err = translate(json!({"translation": ""})).unwrap_err();
        assert!(matches!(err, TranslateError::Validation { .. }));
        assert_eq!(err.raw_response(), Some("raw"));

        assert!(translate(json!({"translation": "   "})).is_err());
        assert!(translate(json!({"translation": null})).is_err());
        assert!(translate(json!({"notes": "only notes"})).is_err());
    }

    #[test]
    fn translation_is_trimmed() {
        let result = translate(json!({"translation": "  hi  "})).unwrap();
        assert_eq!(result.translation, "hi");
        assert_eq!(result.alternatives, None);
        assert_eq!(result.notes, None);
        assert_eq!(result.detected_source_lang, None);
    }

    #[test]
    fn wrong_shaped_alternatives_become_none() {
        let result =
            translate(json!({"translation": "ok", "alternatives": "not a list"})).unwrap();
        assert_eq!(result.alternatives, None);
    }

    #[test]
    fn alternatives_are_coerced_to_strings() {
        let result =
            translate(json!({"translation": "ok", "alternatives": ["a", 2, null, true]}))
                .unwrap();
        assert_eq!(
            result.alternatives,
            Some(vec!["a".to_string(), "2".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn blank_alternatives_are_dropped() {
        let result = translate(json!({
            "translation": "ok",
            "alternatives": ["", "  ", " salut ", "coucou"]
        }))
        .unwrap();
        assert_eq!(
            result.alternatives,
            Some(vec!["salut".to_string(), "coucou".to_string()])
        );
    }

    #[test]
    fn blank_optional_strings_become_none() {
        let result = translate(json!({
            "translation": "ok",
            "notes": "",
            "detected_source_lang": "  EN "
        }))
        .unwrap();
        assert_eq!(result.notes, None);
        assert_eq!(result.detected_source_lang.as_deref(), Some("EN"));
    }

    #[test]
    fn provenance_is_copied() {
        let provenance = Provenance {
            provider: Some("ollama".to_string()),
            model: Some("llama3".to_string()),
            latency_ms: Some(42),
        };
        let result =
            coerce_translation(&object(json!({"translation": "x"})), provenance, "raw").unwrap();
        assert_eq!(result.provider.as_deref(), Some("ollama"));
        assert_eq!(result.model.as_deref(), Some("llama3"));
        assert_eq!(result.latency_ms, Some(42));
    }

    #[test]
    fn empty_entries_are_rejected() {
        let err = dictionary(json!({"entries": []})).unwrap_err();
        assert!(matches!(err, TranslateError::Validation { .. }));
        assert!(dictionary(json!({})).is_err());
    }

    #[test]
    fn entry_without_meaningful_senses_is_dropped() {
        let err = dictionary(json!({
            "entries": [{"pos": "n", "senses": [{"meaning": ""}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, TranslateError::Validation { .. }));
    }

    #[test]
    fn non_list_entries_are_rejected() {
        let err = dictionary(json!({"entries": {"pos": "n"}})).unwrap_err();
        assert!(err.to_string().contains("entries"));
    }

    #[test]
    fn malformed_members_are_skipped() {
        let result = dictionary(json!({
            "term": "  bank ",
            "entries": [
                "garbage",
                {"pos": "", "senses": "none"},
                {"pos": "noun", "senses": [
                    42,
                    {"meaning": "  "},
                    {"meaning": "financial institution", "example_source": "", "usage_notes": "common"}
                ]},
                {"senses": [{"meaning": "edge of a river", "example_target": "rive"}]}
            ]
        }))
        .unwrap();

        assert_eq!(result.term, "bank");
        assert_eq!(result.entries.len(), 2);
        let first = &result.entries[0];
        assert_eq!(first.pos.as_deref(), Some("noun"));
        assert_eq!(first.senses.len(), 1);
        assert_eq!(first.senses[0].meaning, "financial institution");
        assert_eq!(first.senses[0].example_source, None);
        assert_eq!(first.senses[0].usage_notes.as_deref(), Some("common"));
        let second = &result.entries[1];
        assert_eq!(second.pos, None);
        assert_eq!(second.senses[0].example_target.as_deref(), Some("rive"));
    }

    #[test]
    fn term_falls_back_to_request_text() {
        let result = dictionary(json!({
            "term": "",
            "entries": [{"senses": [{"meaning": "m"}]}]
        }))
        .unwrap();
        assert_eq!(result.term, "fallback");
    }

    #[test]
    fn parse_object_rejects_non_objects_and_bad_json() {
        let err = parse_object("{\"translation\": }").unwrap_err();
        assert!(matches!(err, TranslateError::Parse { .. }));
        assert_eq!(err.raw_response(), Some("{\"translation\": }"));

        let err = parse_object("no json here").unwrap_err();
        assert!(matches!(err, TranslateError::Extraction { .. }));
    }

    #[test]
    fn coerce_dispatches_on_mode() {
        let request = TranslateRequest::new("run", "EN", "FR").with_mode(Mode::Dictionary);
        let raw = r#"{"entries": [{"pos": "v", "senses": [{"meaning": "courir"}]}]}"#;
        let object = parse_object(raw).unwrap();
        let outcome = coerce(&request, &object, Provenance::default(), raw).unwrap();
        let Outcome::Dictionary(result) = outcome else {
            panic!("expected dictionary outcome");
        };
        assert_eq!(result.term, "run");
        assert_eq!(result.entries[0].senses[0].meaning, "courir");
    }
}
