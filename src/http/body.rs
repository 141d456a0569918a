//! Error-body parsing for non-2xx backend responses.

// crates.io
use serde_json::{Map, Value};
// self
use crate::_prelude::*;

/// Shape of a rejected response body, as far as message extraction is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorBody {
	/// JSON object with a `detail` message and/or field-level messages.
	Structured {
		/// Value of the `detail` key, flattened to one string.
		detail: Option<String>,
		/// Remaining keys mapped to their flattened messages.
		fields: BTreeMap<String, Vec<String>>,
	},
	/// Bare string body (JSON string, JSON array of messages, or plain text).
	Text(String),
	/// Empty, malformed, or message-less body.
	Empty,
}
impl ErrorBody {
	/// Parses raw response bytes.
	///
	/// Bodies that look like JSON but fail to parse are treated as [`ErrorBody::Empty`];
	/// any other non-empty UTF-8 text is kept verbatim.
	pub fn parse(body: &[u8]) -> Self {
		let Ok(text) = std::str::from_utf8(body) else {
			return Self::Empty;
		};
		let trimmed = text.trim();

		if trimmed.is_empty() {
			return Self::Empty;
		}

		match serde_json::from_str::<Value>(trimmed) {
			Ok(Value::Object(map)) => Self::from_object(map),
			Ok(value @ (Value::String(_) | Value::Array(_))) => {
				let mut messages = Vec::new();

				collect_messages(&value, &mut messages);

				if messages.is_empty() { Self::Empty } else { Self::Text(messages.join(" ")) }
			},
			Ok(_) => Self::Empty,
			Err(_) if trimmed.starts_with(['{', '[', '"']) => Self::Empty,
			Err(_) => Self::Text(trimmed.to_owned()),
		}
	}

	/// Resolves the human-readable message, falling back to `default_message`.
	pub fn message(&self, default_message: &str) -> String {
		match self {
			Self::Structured { detail, fields } =>
				Self::structured_message(detail.as_deref(), fields)
					.unwrap_or_else(|| default_message.to_owned()),
			Self::Text(text) => text.clone(),
			Self::Empty => default_message.to_owned(),
		}
	}

	pub(crate) fn structured_message(
		detail: Option<&str>,
		fields: &BTreeMap<String, Vec<String>>,
	) -> Option<String> {
		if let Some(detail) = detail {
			return Some(detail.to_owned());
		}

		let joined = fields.values().flatten().map(String::as_str).collect::<Vec<_>>().join(" ");

		if joined.is_empty() { None } else { Some(joined) }
	}

	fn from_object(map: Map<String, Value>) -> Self {
		let mut detail = None;
		let mut fields = BTreeMap::new();

		for (key, value) in map {
			let mut messages = Vec::new();

			collect_messages(&value, &mut messages);

			if messages.is_empty() {
				continue;
			}
			if key == "detail" {
				detail = Some(messages.join(" "));
			} else {
				fields.insert(key, messages);
			}
		}

		if detail.is_none() && fields.is_empty() {
			Self::Empty
		} else {
			Self::Structured { detail, fields }
		}
	}
}

/// Extracts a single message from a rejected response body.
///
/// Order: the `detail` field, then every value of an object body joined with spaces, then the
/// raw string body, then `default_message`.
pub fn extract_message(body: &[u8], default_message: &str) -> String {
	ErrorBody::parse(body).message(default_message)
}

fn collect_messages(value: &Value, out: &mut Vec<String>) {
	match value {
		Value::Null => {},
		Value::String(text) =>
			if !text.trim().is_empty() {
				out.push(text.clone());
			},
		Value::Array(items) => items.iter().for_each(|item| collect_messages(item, out)),
		Value::Object(map) => map.values().for_each(|item| collect_messages(item, out)),
		other => out.push(other.to_string()),
	}
}
