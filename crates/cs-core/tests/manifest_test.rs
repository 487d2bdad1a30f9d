use cs_core::manifest::{Manifest, ManifestError};
use serde_json::json;

#[test]
fn minimal_manifest_gets_defaults() {
    let manifest = Manifest::decode(json!({ "name": "daemon-pricing" })).unwrap();
    assert_eq!(manifest.name, "daemon-pricing");
    assert_eq!(manifest.description, "");
    assert!(manifest.commands.is_empty());
    assert!(manifest.listeners.is_empty());
    assert!(manifest.configuration.is_empty());
}

#[test]
fn full_manifest_keeps_every_section() {
    let manifest = Manifest::decode(json!({
        "name": "command-start-stop",
        "description": "Assign or un-assign yourself from an issue.",
        "commands": {
            "start": {
                "description": "Assign yourself to the issue.",
                "ubiquity:example": "/start"
            }
        },
        "ubiquity:listeners": ["issue_comment.created"],
        "configuration": {
            "type": "object",
            "properties": { "maxConcurrentTasks": { "type": "number", "default": 2 } }
        }
    }))
    .unwrap();

    assert_eq!(manifest.commands["start"].example, "/start");
    assert_eq!(manifest.listeners, vec!["issue_comment.created".to_string()]);
    assert_eq!(manifest.configuration["type"], "object");
}

#[test]
fn missing_or_empty_name_is_rejected() {
    assert_eq!(
        Manifest::decode(json!({ "description": "x" })),
        Err(ManifestError::MissingName)
    );
    assert_eq!(
        Manifest::decode(json!({ "name": "" })),
        Err(ManifestError::MissingName)
    );
    assert_eq!(
        Manifest::decode(json!({ "name": 7 })),
        Err(ManifestError::MissingName)
    );
}

#[test]
fn non_object_is_rejected() {
    assert_eq!(Manifest::decode(json!([1, 2])), Err(ManifestError::NotAnObject));
    assert_eq!(Manifest::decode(json!(null)), Err(ManifestError::NotAnObject));
}

#[test]
fn wrongly_typed_section_is_malformed() {
    let err = Manifest::decode(json!({ "name": "x", "ubiquity:listeners": "nope" })).unwrap_err();
    assert!(matches!(err, ManifestError::Malformed(_)));
}

#[test]
fn serialized_manifest_decodes_to_itself() {
    let manifest = Manifest::decode(json!({
        "name": "text-conversation-rewards",
        "ubiquity:listeners": ["issues.closed"]
    }))
    .unwrap();
    let value = serde_json::to_value(&manifest).unwrap();
    assert_eq!(Manifest::decode(value).unwrap(), manifest);
}

#[test]
fn from_json_str_rejects_garbage() {
    assert!(matches!(
        Manifest::from_json_str("{ not json"),
        Err(ManifestError::Malformed(_))
    ));
}
