//! Account sign-in and profile details, passed through to Supabase.

pub mod client;
pub mod controller;
pub mod error;
pub mod profile;

#[cfg(feature = "desktop")]
pub(crate) mod commands;

pub use client::{AuthBackend, AuthSession, AuthUser, SignUpOutcome, SupabaseClient};
pub use controller::{AuthController, AuthSnapshot};
pub use error::{AuthError, ProfileError};
pub use profile::{Profile, ProfileForm};
