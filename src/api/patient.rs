//! Patient records.

// self
use crate::{_prelude::*, api::Resource};

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// Patient as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
	/// Backend identifier (UUID).
	pub id: String,
	/// Full name.
	pub name: String,
	/// Date of birth, when recorded.
	#[serde(default, with = "calendar_date::option")]
	pub date_of_birth: Option<Date>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl Resource for Patient {
	type Form = PatientForm;

	const LABEL: &'static str = "patients";
	const PATH: &'static str = "patients/";
}

/// Create payload for [`Patient`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientForm {
	/// Full name.
	pub name: String,
	/// Optional date of birth, sent as `YYYY-MM-DD` or `null`.
	#[serde(with = "calendar_date::option")]
	pub date_of_birth: Option<Date>,
}
impl PatientForm {
	/// Creates a form with no date of birth.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), date_of_birth: None }
	}

	/// Sets the date of birth.
	pub fn born_on(mut self, date: Date) -> Self {
		self.date_of_birth = Some(date);

		self
	}
}
