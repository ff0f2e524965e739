mod store;

pub use store::Credential;
pub use store::CredentialStore;
