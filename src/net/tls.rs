//! Process-wide TLS setup for outbound clients.
//!
//! The gateway only speaks TLS as a client (https targets and the
//! Kubernetes API). Both `ring` and `aws-lc-rs` end up compiled into the
//! binary, so rustls cannot pick a provider by itself and one must be
//! installed before any client config is built.

use std::sync::Once;

static INSTALL: Once = Once::new();

/// Install the `ring` crypto provider as the process default.
///
/// Safe to call from every client constructor; only the first call acts,
/// and a provider installed elsewhere beforehand is left in place.
pub fn install_crypto_provider() {
    INSTALL.call_once(|| {
        if rustls::crypto::CryptoProvider::get_default().is_some() {
            return;
        }
        if rustls::crypto::ring::default_provider().install_default().is_err() {
            tracing::debug!("Crypto provider was installed concurrently");
        }
    });
}
