pub mod capabilities;
pub mod client;
pub mod error;
pub mod model;

pub use capabilities::{Authenticatable, CredentialVerifier, PermissionHolder};
pub use error::UserProfilesError;
pub use model::{FlagsPatch, PasswordHash, UserProfile};
