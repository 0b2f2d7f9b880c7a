mod hubspot;
mod traits;

pub use hubspot::HubSpotProvider;
pub use traits::{OAuthProvider, ProviderError, TokenSet};
