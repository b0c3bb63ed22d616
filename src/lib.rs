pub mod analysis;
pub mod config;
pub mod continent;
pub mod dataset;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod scoring;

/// Install the ring crypto provider for rustls (required for rustls 0.23+).
///
/// Safe to call more than once; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
