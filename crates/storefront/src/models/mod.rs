//! Client-side models that are not part of the store API's wire format.

pub mod session;

pub use session::CurrentUser;
