//! essif Identity Layer
//!
//! - DID parsing and EBSI DID generation
//! - DID document construction
//! - The trust-list collaborator trait, with an in-process implementation
//! - The provisioning workflow over an essif wallet

pub mod did;
pub mod document;
pub mod error;
pub mod provisioning;
pub mod trust_list;

pub use did::Did;
pub use document::build_document;
pub use error::IdentityError;
pub use provisioning::Provisioner;
pub use trust_list::{LocalTrustList, RegistrationRequest, TrustList};
