use log::warn;
use rumqttc::tokio_rustls::rustls::{ClientConfig, RootCertStore};
use snafu::ResultExt;

use super::models::{CertificatesSnafu, ChannelError};

/// TLS configuration trusting the operating system's root certificates.
pub fn system_tls_config() -> Result<ClientConfig, ChannelError> {
    let mut roots = RootCertStore::empty();
    for certificate in rustls_native_certs::load_native_certs().context(CertificatesSnafu)? {
        if let Err(e) = roots.add(certificate) {
            warn!("Skipping unusable system certificate: {}", e);
        }
    }

    Ok(ClientConfig::builder().with_root_certificates(roots).with_no_client_auth())
}
