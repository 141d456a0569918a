//! Typed clients for the backend's REST collections.
//!
//! Every call goes through [`Gateway::send`], so resource requests share the bearer handling
//! and single-flight refresh of the gateway they were created from.

pub mod appointment;
pub mod doctor;
pub mod patient;

pub use appointment::*;
pub use doctor::*;
pub use patient::*;

// std
use std::marker::PhantomData;
// self
use crate::{
	_prelude::*,
	gateway::Gateway,
	http::{ApiRequest, GatewayHttpClient},
};

/// A REST collection exposed by the backend.
pub trait Resource
where
	Self: DeserializeOwned + Send,
{
	/// Collection path relative to the backend base URL, with a trailing slash.
	const PATH: &'static str;
	/// Plural label used in fallback error messages.
	const LABEL: &'static str;

	/// Payload accepted by the create endpoint.
	type Form: Serialize + Sync;
}

/// List/get/create/delete client for one [`Resource`].
pub struct Resources<'g, C, R>
where
	C: ?Sized + GatewayHttpClient,
	R: Resource,
{
	gateway: &'g Gateway<C>,
	_resource: PhantomData<fn() -> R>,
}
impl<'g, C, R> Resources<'g, C, R>
where
	C: ?Sized + GatewayHttpClient,
	R: Resource,
{
	/// Binds a resource client to `gateway`.
	pub fn new(gateway: &'g Gateway<C>) -> Self {
		Self { gateway, _resource: PhantomData }
	}

	/// Fetches the whole collection.
	pub async fn list(&self) -> Result<Vec<R>> {
		let request = ApiRequest::get(R::PATH)
			.with_error_message(format!("Failed to load {}.", R::LABEL));

		self.gateway.send_json(request).await
	}

	/// Fetches one item by identifier.
	pub async fn get(&self, id: &str) -> Result<R> {
		let request = ApiRequest::get(item_path::<R>(id))
			.with_error_message(format!("Failed to load {}.", R::LABEL));

		self.gateway.send_json(request).await
	}

	/// Creates an item and returns the backend's representation of it.
	pub async fn create(&self, form: &R::Form) -> Result<R> {
		let request = ApiRequest::post(R::PATH)
			.with_json(form)?
			.with_error_message(format!("Failed to create {}.", R::LABEL));

		self.gateway.send_json(request).await
	}

	/// Deletes one item by identifier.
	pub async fn delete(&self, id: &str) -> Result<()> {
		let request = ApiRequest::delete(item_path::<R>(id))
			.with_error_message(format!("Failed to delete {}.", R::LABEL));

		self.gateway.send(request).await.map(|_| ())
	}
}

impl<C> Gateway<C>
where
	C: ?Sized + GatewayHttpClient,
{
	/// Returns a client for any [`Resource`].
	pub fn resource<R>(&self) -> Resources<'_, C, R>
	where
		R: Resource,
	{
		Resources::new(self)
	}

	/// Patients collection.
	pub fn patients(&self) -> Resources<'_, C, Patient> {
		self.resource()
	}

	/// Doctors collection.
	pub fn doctors(&self) -> Resources<'_, C, Doctor> {
		self.resource()
	}

	/// Appointments collection.
	pub fn appointments(&self) -> Resources<'_, C, Appointment> {
		self.resource()
	}
}

fn item_path<R>(id: &str) -> String
where
	R: Resource,
{
	format!("{}{}/", R::PATH, id.trim_matches('/'))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn item_paths_nest_under_collection() {
		assert_eq!(item_path::<Patient>("p-1"), "patients/p-1/");
		assert_eq!(item_path::<Appointment>("/a-9/"), "appointments/a-9/");
	}
}
