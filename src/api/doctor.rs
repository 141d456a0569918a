//! Doctor records.

// self
use crate::{_prelude::*, api::Resource};

/// Doctor as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
	/// Backend identifier (UUID).
	pub id: String,
	/// Full name.
	pub name: String,
	/// Specialty; blank when unset.
	#[serde(default)]
	pub specialty: String,
	/// Contact phone number.
	#[serde(default)]
	pub phone_number: Option<String>,
	/// Contact email.
	#[serde(default)]
	pub email: Option<String>,
}
impl Resource for Doctor {
	type Form = DoctorForm;

	const LABEL: &'static str = "doctors";
	const PATH: &'static str = "doctors/";
}

/// Create payload for [`Doctor`]; unset optional fields are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DoctorForm {
	/// Full name.
	pub name: String,
	/// Specialty.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub specialty: Option<String>,
	/// Contact phone number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	/// Contact email.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}
impl DoctorForm {
	/// Creates a form carrying only the name.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), ..Default::default() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn blank_optional_fields_decode() {
		let doctor: Doctor = serde_json::from_str(
			r#"{"id":"d-1","name":"Nguyen","specialty":"Cardiology","phone_number":"","email":null}"#,
		)
		.expect("Doctor payload should decode.");

		assert_eq!(doctor.specialty, "Cardiology");
		assert_eq!(doctor.phone_number.as_deref(), Some(""));
		assert!(doctor.email.is_none());
	}

	#[test]
	fn form_omits_unset_fields() {
		let json =
			serde_json::to_value(DoctorForm::new("Hoang")).expect("Doctor form should serialize.");

		assert_eq!(json, serde_json::json!({ "name": "Hoang" }));
	}
}
