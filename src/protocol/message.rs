//! A2A message types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in the A2A protocol
///
/// Messages are one conversational turn. Each message has a role (user or agent)
/// and one or more parts (text, file, or data).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,

    /// Message content parts (at least one required)
    pub parts: Vec<Part>,

    /// Optional metadata for the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

impl Message {
    /// Create a new message with text content
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create an agent message with text content
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Role::Agent, text)
    }

    /// Add a metadata field to the message
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    /// Add a message part
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Concatenated text of every text part, in order
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// File parts carried by this message
    pub fn files(&self) -> Vec<FilePart> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::File { file } => Some(file.clone()),
                _ => None,
            })
            .collect()
    }

    /// Structured data parts carried by this message
    pub fn data(&self) -> Vec<Value> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Data { data } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message from a user
    User,

    /// Message from an AI agent
    Agent,
}

/// File content carried inline by a file part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilePart {
    /// MIME type of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Name of the file
    pub file_name: String,

    /// Raw file content, base64 on the wire
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// A part of a message
///
/// Parts are tagged by `type`; an unknown tag fails deserialization instead of
/// being dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Part {
    /// Text content
    Text {
        /// The text content
        text: String,
    },

    /// Inline file
    File {
        /// File content
        file: FilePart,
    },

    /// Structured data
    Data {
        /// The structured data
        data: Value,
    },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a file part from raw bytes
    pub fn file(
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        mime_type: Option<String>,
    ) -> Self {
        Self::File {
            file: FilePart {
                mime_type,
                file_name: file_name.into(),
                data: data.into(),
            },
        }
    }

    /// Create a data part
    pub fn data(data: Value) -> Self {
        Self::Data { data }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.parts.len(), 1);

        match &msg.parts[0] {
            Part::Text { text } => assert_eq!(text, "Hello, agent!"),
            _ => panic!("Expected text part"),
        }
    }

    #[test]
    fn test_message_part_extraction() {
        let msg = Message::user("read ")
            .with_part(Part::file("notes.txt", b"abc".to_vec(), None))
            .with_part(Part::text("this"))
            .with_part(Part::data(json!({"rows": 3})));

        assert_eq!(msg.text(), "read this");
        assert_eq!(msg.files().len(), 1);
        assert_eq!(msg.files()[0].file_name, "notes.txt");
        assert_eq!(msg.data(), vec![json!({"rows": 3})]);
    }

    #[test]
    fn test_part_tagging() {
        let json = serde_json::to_value(Part::text("hi")).unwrap();
        assert_eq!(json, json!({"type": "text", "text": "hi"}));

        let json = serde_json::to_value(Part::file(
            "a.bin",
            vec![0u8, 1, 2],
            Some("application/octet-stream".into()),
        ))
        .unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["file"]["file_name"], "a.bin");
        assert_eq!(json["file"]["data"], "AAEC");
    }

    #[test]
    fn test_unknown_part_tag_rejected() {
        let raw = json!({"role": "user", "parts": [{"type": "video", "url": "x"}]});
        assert!(serde_json::from_value::<Message>(raw).is_err());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let raw = json!({"type": "file", "file": {"file_name": "a", "data": "!!not base64!!"}});
        assert!(serde_json::from_value::<Part>(raw).is_err());
    }
}
