//! Request-body validation against declared JSON Schemas.
//!
//! Each distinct schema text is compiled once and the compiled validator is
//! reused for every later request. Validation collects every constraint
//! violation, not just the first, and decoding into the target model is a
//! separate, distinctly-reported step.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use jsonschema::{error::ValidationErrorKind, JSONSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// One machine-readable constraint violation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Violation {
    /// Violation kind, e.g. `missing_field` or `invalid_type`.
    pub code: &'static str,
    /// Offending field path, where applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Validation pipeline failures.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The request carried no body at all; rejected before any schema
    /// evaluation.
    #[error("request body is missing")]
    MissingBody,

    /// The body violated the schema; every violation is listed.
    #[error("request body failed validation ({} violations)", .0.len())]
    Invalid(Vec<Violation>),

    /// The body passed the schema but does not fit the target model.
    #[error("failed to decode request body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The schema text itself does not compile. A programming error, not a
    /// client error.
    #[error("schema compilation failed: {0}")]
    Compile(String),
}

/// Compiled-schema cache keyed by the exact schema definition text.
///
/// Shared across request workers. Hits take the read lock only, so they do
/// not serialize against each other; a miss compiles outside any lock and
/// double-checks under the write lock, so two racing first users converge
/// on a single entry and a third reader never observes a partial one.
#[derive(Default)]
pub struct SchemaCache {
    compiled: RwLock<HashMap<String, Arc<JSONSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `body` against `schema_text`, then decode it into `T`.
    pub fn validate_and_decode<T: DeserializeOwned>(
        &self,
        schema_text: &str,
        body: &[u8],
    ) -> Result<T, SchemaError> {
        if body.is_empty() {
            return Err(SchemaError::MissingBody);
        }

        let schema = self.compiled_schema(schema_text)?;

        let instance: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| SchemaError::Invalid(vec![Violation { code: "invalid_json", field: None }]))?;

        if let Err(errors) = schema.validate(&instance) {
            let violations = errors.flat_map(violations_for).collect();
            return Err(SchemaError::Invalid(violations));
        }

        serde_json::from_value(instance).map_err(SchemaError::Decode)
    }

    /// Number of distinct schemas compiled so far.
    pub fn len(&self) -> usize {
        self.compiled.read().expect("schema cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compiled_schema(&self, schema_text: &str) -> Result<Arc<JSONSchema>, SchemaError> {
        {
            let cache = self.compiled.read().expect("schema cache lock poisoned");
            if let Some(schema) = cache.get(schema_text) {
                return Ok(schema.clone());
            }
        }

        // Compile outside the write lock; compilation is idempotent, so a
        // racing compile of the same text is benign.
        let schema_value: serde_json::Value = serde_json::from_str(schema_text)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;
        let compiled = JSONSchema::compile(&schema_value)
            .map_err(|e| SchemaError::Compile(e.to_string()))?;

        let mut cache = self.compiled.write().expect("schema cache lock poisoned");
        let entry = cache
            .entry(schema_text.to_string())
            .or_insert_with(|| Arc::new(compiled));
        Ok(entry.clone())
    }
}

/// Map one validator error to wire-level violations.
fn violations_for(error: jsonschema::ValidationError<'_>) -> Vec<Violation> {
    match &error.kind {
        ValidationErrorKind::Required { property } => vec![Violation {
            code: "missing_field",
            field: property.as_str().map(str::to_string),
        }],
        ValidationErrorKind::Type { .. } => vec![Violation {
            code: "invalid_type",
            field: field_path(&error),
        }],
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|name| Violation {
                code: "additional_properties",
                field: Some(name.clone()),
            })
            .collect(),
        _ => vec![Violation {
            code: "schema_violation",
            field: field_path(&error),
        }],
    }
}

fn field_path(error: &jsonschema::ValidationError<'_>) -> Option<String> {
    let pointer = error.instance_path.to_string();
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.replace('/', "."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Barrier;

    const VEHICLE_SCHEMA: &str = r#"{
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "year": {"type": "integer"},
            "make": {"type": "string"},
            "model": {"type": "string"}
        },
        "required": ["year", "make", "model"]
    }"#;

    #[derive(Debug, Deserialize, PartialEq)]
    struct VehicleBody {
        year: i64,
        make: String,
        model: String,
    }

    fn violations(err: SchemaError) -> Vec<Violation> {
        match err {
            SchemaError::Invalid(v) => v,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn valid_body_decodes_into_model() {
        let cache = SchemaCache::new();
        let body = br#"{"year": 1989, "make": "BMW", "model": "325i"}"#;

        let decoded: VehicleBody = cache.validate_and_decode(VEHICLE_SCHEMA, body).unwrap();
        assert_eq!(
            decoded,
            VehicleBody {
                year: 1989,
                make: "BMW".to_string(),
                model: "325i".to_string()
            }
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_body_is_rejected_before_validation() {
        let cache = SchemaCache::new();
        let err = cache
            .validate_and_decode::<VehicleBody>(VEHICLE_SCHEMA, b"")
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingBody));
        // Nothing was compiled for the rejected request.
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_field_names_exactly_the_missing_field() {
        let cache = SchemaCache::new();
        let err = cache
            .validate_and_decode::<VehicleBody>(VEHICLE_SCHEMA, br#"{"year": 1989, "make": "BMW"}"#)
            .unwrap_err();

        assert_eq!(
            violations(err),
            vec![Violation {
                code: "missing_field",
                field: Some("model".to_string())
            }]
        );
    }

    #[test]
    fn all_violations_are_collected() {
        let cache = SchemaCache::new();
        let err = cache
            .validate_and_decode::<VehicleBody>(
                VEHICLE_SCHEMA,
                br#"{"year": "not a number", "extra": true}"#,
            )
            .unwrap_err();

        let violations = violations(err);
        assert!(violations.contains(&Violation {
            code: "invalid_type",
            field: Some("year".to_string())
        }));
        assert!(violations.contains(&Violation {
            code: "missing_field",
            field: Some("make".to_string())
        }));
        assert!(violations.contains(&Violation {
            code: "missing_field",
            field: Some("model".to_string())
        }));
        assert!(violations.contains(&Violation {
            code: "additional_properties",
            field: Some("extra".to_string())
        }));
    }

    #[test]
    fn unparsable_json_is_a_violation_not_a_crash() {
        let cache = SchemaCache::new();
        let err = cache
            .validate_and_decode::<VehicleBody>(VEHICLE_SCHEMA, b"{not json")
            .unwrap_err();
        assert_eq!(
            violations(err),
            vec![Violation {
                code: "invalid_json",
                field: None
            }]
        );
    }

    #[test]
    fn decode_failure_is_distinct_from_validation_failure() {
        // Schema-valid but unrepresentable in the model.
        #[derive(Debug, Deserialize)]
        struct Narrow {
            #[allow(dead_code)]
            year: u8,
        }
        const LOOSE: &str = r#"{"type": "object", "properties": {"year": {"type": "integer"}}}"#;

        let cache = SchemaCache::new();
        let err = cache
            .validate_and_decode::<Narrow>(LOOSE, br#"{"year": 99999}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::Decode(_)));
    }

    #[test]
    fn compilation_is_cached_and_idempotent() {
        let cache = SchemaCache::new();
        let body = br#"{"year": 1989, "make": "BMW", "model": "325i"}"#;

        let first: VehicleBody = cache.validate_and_decode(VEHICLE_SCHEMA, body).unwrap();
        let second: VehicleBody = cache.validate_and_decode(VEHICLE_SCHEMA, body).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        // A byte-different text is a distinct entry.
        let spaced = VEHICLE_SCHEMA.replace("  ", " ");
        let _: VehicleBody = cache.validate_and_decode(&spaced, body).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_first_use_converges_on_one_entry() {
        let cache = Arc::new(SchemaCache::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    let body = format!(r#"{{"year": {i}, "make": "M", "model": "X"}}"#);
                    cache
                        .validate_and_decode::<VehicleBody>(VEHICLE_SCHEMA, body.as_bytes())
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn bad_schema_text_is_a_compile_error() {
        let cache = SchemaCache::new();
        let err = cache
            .validate_and_decode::<VehicleBody>("{ not a schema", b"{}")
            .unwrap_err();
        assert!(matches!(err, SchemaError::Compile(_)));
    }
}
