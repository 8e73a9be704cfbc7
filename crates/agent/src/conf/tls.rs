//! TLS: rustls ServerConfig building for mTLS.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use rustls::ServerConfig;

use super::model::AgentConfig;

fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>, Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(format!("no certificate found in {}", path).into());
    }
    Ok(certs)
}

impl AgentConfig {
    /// Build a rustls ServerConfig that requires client certificates
    /// signed by the configured CA.
    pub fn build_rustls_config(&self) -> Result<Arc<ServerConfig>, Box<dyn std::error::Error>> {
        let certs = load_certs(&self.tls_cert_path)?;

        let mut key_reader = BufReader::new(File::open(&self.tls_key_path)?);
        let key = rustls_pemfile::private_key(&mut key_reader)?.ok_or("No private key found in file")?;

        let mut root_store = rustls::RootCertStore::empty();
        for cert in load_certs(&self.tls_ca_path)? {
            root_store.add(cert)?;
        }
        let client_verifier = rustls::server::WebPkiClientVerifier::builder(Arc::new(root_store)).build()?;

        let mut config = ServerConfig::builder()
            .with_client_cert_verifier(client_verifier)
            .with_single_cert(certs, key)?;

        // gRPC runs over HTTP/2
        config.alpn_protocols = vec![b"h2".to_vec()];

        Ok(Arc::new(config))
    }
}
