//! Appointments between a patient and a doctor.

// self
use crate::{_prelude::*, api::Resource};

/// Appointment lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
	/// Booked and upcoming.
	#[default]
	Scheduled,
	/// Took place.
	Completed,
	/// Called off.
	Cancelled,
}

/// Appointment as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
	/// Backend identifier (UUID).
	pub id: String,
	/// Patient identifier.
	pub patient: String,
	/// Patient name (read-only on the backend).
	#[serde(default)]
	pub patient_name: Option<String>,
	/// Doctor identifier.
	pub doctor: String,
	/// Doctor name (read-only on the backend).
	#[serde(default)]
	pub doctor_name: Option<String>,
	/// Scheduled instant.
	#[serde(with = "time::serde::rfc3339")]
	pub appointment_time: OffsetDateTime,
	/// Reason for the visit.
	#[serde(default)]
	pub reason: String,
	/// Lifecycle state.
	#[serde(default)]
	pub status: AppointmentStatus,
	/// Staff notes.
	#[serde(default)]
	pub notes: String,
	/// Creation instant.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub created_at: Option<OffsetDateTime>,
}
impl Resource for Appointment {
	type Form = AppointmentForm;

	const LABEL: &'static str = "appointments";
	const PATH: &'static str = "appointments/";
}

/// Create payload for [`Appointment`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppointmentForm {
	/// Patient identifier.
	pub patient: String,
	/// Doctor identifier.
	pub doctor: String,
	/// Scheduled instant.
	#[serde(with = "time::serde::rfc3339")]
	pub appointment_time: OffsetDateTime,
	/// Reason for the visit.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
	/// Initial state; the backend defaults to [`AppointmentStatus::Scheduled`].
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<AppointmentStatus>,
	/// Staff notes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}
impl AppointmentForm {
	/// Creates a form for the given patient, doctor, and instant.
	pub fn new(
		patient: impl Into<String>,
		doctor: impl Into<String>,
		appointment_time: OffsetDateTime,
	) -> Self {
		Self {
			patient: patient.into(),
			doctor: doctor.into(),
			appointment_time,
			reason: None,
			status: None,
			notes: None,
		}
	}

	/// Sets the visit reason.
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());

		self
	}

	/// Sets the staff notes.
	pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
		self.notes = Some(notes.into());

		self
	}

	/// Sets the initial state.
	pub fn with_status(mut self, status: AppointmentStatus) -> Self {
		self.status = Some(status);

		self
	}
}
