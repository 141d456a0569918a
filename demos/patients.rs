//! Logs in against a running backend, lists patients and doctors, and books an appointment.
//!
//! Configure with `HOSPITAL_API` (defaults to `http://localhost:8000/api/`), `HOSPITAL_USER`,
//! and `HOSPITAL_PASSWORD`. The session is persisted to `HOSPITAL_SESSION` (defaults to
//! `session.json`), so a second run reuses the stored tokens and refreshes them on demand.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::eyre};
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use hospital_gateway::{
	api::AppointmentForm,
	backend::BackendDescriptor,
	error::Error,
	gateway::Gateway,
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base_url = env::var("HOSPITAL_API").unwrap_or_else(|_| "http://localhost:8000/api/".into());
	let session = env::var("HOSPITAL_SESSION").unwrap_or_else(|_| "session.json".into());
	let descriptor = BackendDescriptor::builder(Url::parse(&base_url)?).build()?;
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(session)?);
	let gateway = Gateway::new(store, descriptor);

	if !gateway.is_authenticated().await? {
		let username = env::var("HOSPITAL_USER")?;
		let password = env::var("HOSPITAL_PASSWORD")?;

		gateway.login(&username, &password).await?;
	}

	let patients = match gateway.patients().list().await {
		Ok(patients) => patients,
		Err(err @ Error::AuthExpired { .. }) => {
			return Err(eyre!("{err} Log in again with HOSPITAL_USER/HOSPITAL_PASSWORD."));
		},
		Err(err) => return Err(err.into()),
	};
	let doctors = gateway.doctors().list().await?;

	println!("{} patients, {} doctors", patients.len(), doctors.len());

	for patient in &patients {
		println!("- {} ({})", patient.name, patient.id);
	}

	let (Some(patient), Some(doctor)) = (patients.first(), doctors.first()) else {
		return Ok(());
	};
	let form = AppointmentForm::new(
		&patient.id,
		&doctor.id,
		OffsetDateTime::now_utc() + Duration::days(1),
	)
	.with_reason("Follow-up");
	let appointment = gateway.appointments().create(&form).await?;

	println!(
		"Booked {} with {} at {} ({:?})",
		appointment.patient_name.as_deref().unwrap_or(&patient.name),
		appointment.doctor_name.as_deref().unwrap_or(&doctor.name),
		appointment.appointment_time,
		appointment.status
	);

	Ok(())
}
