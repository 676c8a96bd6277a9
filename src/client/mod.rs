//! Registration submission flow.
//!
//! The UI collects name, email, password, and confirmation, then hands the
//! whole attempt to [`RegistrationClient::submit`]: validate, derive the
//! credential, and POST the result to the service. Validation failures stop
//! the attempt before any derivation or network work. The raw password is
//! consumed by the derivation step and never appears in the request payload.

pub mod form;
pub mod submit;

pub use form::{RegistrationForm, ValidationErrors};
pub use submit::{NoopObserver, RegistrationClient, SubmitError, SubmitObserver};
