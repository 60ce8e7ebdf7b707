pub mod claims;
pub(crate) mod extractors;

pub use claims::{IdentityClaims, IdentityKeys};
pub use extractors::{Identity, MaybeIdentity};
