//! JSON bodies exchanged with the room service.

use super::{RoomBinding, SyncError, SyncResult};
use crate::elements::Element;
use serde::{Deserialize, Serialize};

/// Body of `GET /create-room`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: String,
    pub key: String,
}

/// Body of `GET /get-room`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDocument {
    pub elements: Vec<Element>,
}

/// Body of `POST /save-room`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub room_id: String,
    pub key: String,
    pub elements: Vec<Element>,
    /// Display name of the participant who made the change.
    pub user: String,
}

impl SavePayload {
    pub fn new(binding: &RoomBinding, elements: &[Element], user: &str) -> Self {
        Self {
            room_id: binding.room_id.clone(),
            key: binding.key.clone(),
            elements: elements.to_vec(),
            user: user.to_string(),
        }
    }
}

/// Parse a create-room response into a binding.
pub fn parse_room_created(body: &str) -> SyncResult<RoomBinding> {
    let created: RoomCreated = serde_json::from_str(body)
        .map_err(|e| SyncError::InvariantViolation(format!("create-room body: {e}")))?;
    if created.room_id.is_empty() || created.key.is_empty() {
        return Err(SyncError::InvariantViolation(
            "create-room returned an empty room id or key".to_string(),
        ));
    }
    Ok(RoomBinding::new(created.room_id, created.key))
}

/// Parse a get-room response, validating every element.
///
/// A body without `elements`, or with any malformed element, is rejected as a
/// whole so local state is never replaced with a partial document.
pub fn parse_room_document(body: &str) -> SyncResult<Vec<Element>> {
    let document: RoomDocument = serde_json::from_str(body)
        .map_err(|e| SyncError::InvariantViolation(format!("get-room body: {e}")))?;
    for (index, element) in document.elements.iter().enumerate() {
        element
            .validate()
            .map_err(|e| SyncError::InvariantViolation(format!("element {index}: {e}")))?;
    }
    Ok(document.elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ACCENT_COLOR, ToolKind};
    use kurbo::Point;

    #[test]
    fn test_parse_room_created() {
        let binding = parse_room_created(r#"{"roomId":"abc","key":"xyz"}"#).unwrap();
        assert_eq!(binding, RoomBinding::new("abc", "xyz"));
    }

    #[test]
    fn test_parse_room_created_rejects_missing_key() {
        assert!(matches!(
            parse_room_created(r#"{"roomId":"abc"}"#),
            Err(SyncError::InvariantViolation(_))
        ));
        assert!(matches!(
            parse_room_created(r#"{"roomId":"","key":"k"}"#),
            Err(SyncError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_parse_room_document() {
        let body = r##"{"elements":[{"type":"line","x":0,"y":0,"width":5,"height":5,"color":"#00ff00"}]}"##;
        let elements = parse_room_document(body).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].tool(), ToolKind::Line);
    }

    #[test]
    fn test_missing_elements_is_invariant_violation() {
        assert!(matches!(
            parse_room_document(r#"{"room":"abc"}"#),
            Err(SyncError::InvariantViolation(_))
        ));
        assert!(matches!(
            parse_room_document("not json"),
            Err(SyncError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_empty_stroke_rejects_document() {
        let body = r#"{"elements":[{"type":"pen","points":[]}]}"#;
        assert!(matches!(
            parse_room_document(body),
            Err(SyncError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_non_positive_font_size_rejects_document() {
        let body = r##"{"elements":[{"type":"text","x":0,"y":0,"text":"hi","fontSize":0,"color":"#00ff00"}]}"##;
        assert!(matches!(
            parse_room_document(body),
            Err(SyncError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_save_payload_shape() {
        let binding = RoomBinding::new("abc", "xyz");
        let el = Element::from_samples(ToolKind::Pen, &[Point::new(1.0, 2.0)], ACCENT_COLOR).unwrap();
        let payload = SavePayload::new(&binding, &[el], "ada");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["roomId"], "abc");
        assert_eq!(value["key"], "xyz");
        assert_eq!(value["user"], "ada");
        assert_eq!(value["elements"][0]["type"], "pen");
        assert_eq!(value["elements"][0]["points"][0]["x"], 1.0);
    }
}
