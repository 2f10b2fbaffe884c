// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! TLS configuration with the certificate validation relaxations some venues
//! require.

use std::sync::Arc;

use rustls::{
    ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
    client::{
        WebPkiServerVerifier,
        danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier},
    },
    pki_types::{CertificateDer, ServerName, UnixTime},
};
use serde::{Deserialize, Serialize};
use tokio_rustls::TlsConnector;

/// TLS options for the outbound FIX connection.
///
/// The relaxations exist because several venue endpoints present expired
/// certificates or incomplete chains; they loosen validation in the narrowest
/// way that still connects. `accept_all` disables validation entirely and
/// should only ever be used against test endpoints.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TlsOptions {
    /// Whether to wrap the TCP connection in TLS at all.
    pub enabled: bool,
    /// Accept a certificate whose validity period has lapsed.
    pub allow_expired: bool,
    /// Accept a chain that does not reach a known root.
    pub allow_partial_chain: bool,
    /// Validate against this name instead of the endpoint host.
    pub server_name_override: Option<String>,
    /// Accept any certificate error.
    pub accept_all: bool,
}

impl TlsOptions {
    /// Returns `true` if any relaxation requires a custom verifier.
    #[must_use]
    pub const fn is_relaxed(&self) -> bool {
        self.accept_all || self.allow_expired || self.allow_partial_chain
    }
}

/// Builds a [`TlsConnector`] honoring the given options.
///
/// # Errors
///
/// Returns an error if the verifier cannot be constructed from the root store.
pub fn create_tls_connector(options: &TlsOptions) -> anyhow::Result<TlsConnector> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let mut config = ClientConfig::builder()
        .with_root_certificates(roots.clone())
        .with_no_client_auth();

    if options.is_relaxed() {
        let inner = WebPkiServerVerifier::builder(Arc::new(roots))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build certificate verifier: {e}"))?;
        let verifier = RelaxedCertVerifier {
            inner,
            allow_expired: options.allow_expired,
            allow_partial_chain: options.allow_partial_chain,
            accept_all: options.accept_all,
        };
        config
            .dangerous()
            .set_certificate_verifier(Arc::new(verifier));
    }

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Resolves the name certificates are validated against.
///
/// # Errors
///
/// Returns an error if neither the override nor the host parses as a valid
/// server name.
pub fn server_name(options: &TlsOptions, host: &str) -> anyhow::Result<ServerName<'static>> {
    let name = options
        .server_name_override
        .clone()
        .unwrap_or_else(|| host.to_string());
    ServerName::try_from(name).map_err(|e| anyhow::anyhow!("Invalid TLS server name: {e}"))
}

/// A verifier delegating to webpki but forgiving the configured errors.
#[derive(Debug)]
struct RelaxedCertVerifier {
    inner: Arc<WebPkiServerVerifier>,
    allow_expired: bool,
    allow_partial_chain: bool,
    accept_all: bool,
}

impl ServerCertVerifier for RelaxedCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        if self.accept_all {
            return Ok(ServerCertVerified::assertion());
        }

        match self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            Ok(verified) => Ok(verified),
            Err(rustls::Error::InvalidCertificate(rustls::CertificateError::Expired))
                if self.allow_expired =>
            {
                tracing::warn!("Accepting expired server certificate");
                Ok(ServerCertVerified::assertion())
            }
            Err(rustls::Error::InvalidCertificate(rustls::CertificateError::UnknownIssuer))
                if self.allow_partial_chain =>
            {
                tracing::warn!("Accepting server certificate with partial chain");
                Ok(ServerCertVerified::assertion())
            }
            Err(e) => Err(e),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        if self.accept_all {
            return Ok(HandshakeSignatureValid::assertion());
        }
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        if self.accept_all {
            return Ok(HandshakeSignatureValid::assertion());
        }
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_strict_options_skip_custom_verifier() {
        let options = TlsOptions {
            enabled: true,
            ..Default::default()
        };
        assert!(!options.is_relaxed());
        assert!(create_tls_connector(&options).is_ok());
    }

    #[rstest]
    fn test_relaxed_options_build() {
        let options = TlsOptions {
            enabled: true,
            allow_expired: true,
            allow_partial_chain: true,
            ..Default::default()
        };
        assert!(options.is_relaxed());
        assert!(create_tls_connector(&options).is_ok());
    }

    #[rstest]
    fn test_server_name_override() {
        let options = TlsOptions {
            server_name_override: Some("fix.example.com".to_string()),
            ..Default::default()
        };
        let name = server_name(&options, "10.0.0.1").unwrap();
        assert!(matches!(name, ServerName::DnsName(_)));
    }
}
