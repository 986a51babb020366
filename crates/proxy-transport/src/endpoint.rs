//! Broker address parsing.
//!
//! Users give the broker address in whatever form is handy:
//!
//! ```text
//! broker.local            → http://broker.local:80/
//! broker.local:8080       → http://broker.local:8080/
//! https://example.com/pc  → https://example.com:443/pc
//! ```
//!
//! [`BrokerEndpoint`] normalises that once and derives every URL the peers
//! need: `GET <base>/pair`, `ws(s)://<base>/relay/<code>?role=<role>` and the
//! connect link shown next to the pair code.

use proxy_core::{PairingCode, PeerRole};
use thiserror::Error;
use url::Url;

/// Reasons a broker address cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("invalid broker URL {input:?}: {reason}")]
    Invalid { input: String, reason: String },

    #[error("unsupported broker URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),

    #[error("broker URL {0:?} has no host")]
    MissingHost(String),
}

/// A parsed broker base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    base: Url,
}

impl BrokerEndpoint {
    /// Parses a broker address.
    ///
    /// A missing scheme defaults to `http`.  Query and fragment are dropped;
    /// a trailing slash on the path is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] for unparseable input, schemes other than
    /// `http`/`https`, or a missing host.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use proxy_transport::BrokerEndpoint;
    ///
    /// let ep = BrokerEndpoint::parse("broker.local:8080").unwrap();
    /// assert_eq!(ep.protocol(), "http");
    /// assert_eq!(ep.host(), "broker.local");
    /// assert_eq!(ep.port(), 8080);
    /// assert_eq!(ep.pair_url().as_str(), "http://broker.local:8080/pair");
    /// ```
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let trimmed = input.trim();
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let mut base = Url::parse(&with_scheme).map_err(|e| EndpointError::Invalid {
            input: input.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(base.scheme().to_string()));
        }
        if base.host_str().map_or(true, str::is_empty) {
            return Err(EndpointError::MissingHost(input.to_string()));
        }

        let path = base.path().trim_end_matches('/').to_string();
        base.set_path(&path);
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    /// `"http"` or `"https"`.
    pub fn protocol(&self) -> &str {
        self.base.scheme()
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    /// The explicit port, or 80/443 by scheme.
    pub fn port(&self) -> u16 {
        self.base
            .port_or_known_default()
            .unwrap_or(if self.protocol() == "https" { 443 } else { 80 })
    }

    /// Base path without a trailing slash; empty for the root.
    pub fn path(&self) -> &str {
        self.base.path().trim_end_matches('/')
    }

    /// `GET` target that issues a new pairing code.
    pub fn pair_url(&self) -> Url {
        self.with_path("/pair")
    }

    /// WebSocket URL joining the relay slot for `code` as `role`.
    pub fn relay_url(&self, code: &PairingCode, role: PeerRole) -> Url {
        let mut url = self.with_path(&format!("/relay/{code}"));
        let ws_scheme = if self.protocol() == "https" { "wss" } else { "ws" };
        // Cannot fail: both schemes are special.
        let _ = url.set_scheme(ws_scheme);
        url.query_pairs_mut().append_pair("role", role.as_str());
        url
    }

    /// Link shown next to the pair code, where a controller can be opened.
    pub fn connect_url(&self) -> String {
        let mut url = self.with_path("/");
        url.set_fragment(Some("/connect"));
        url.to_string()
    }

    fn with_path(&self, suffix: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{}", self.path(), suffix);
        url.set_path(&joined);
        url
    }
}

impl std::fmt::Display for BrokerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}{}", self.protocol(), self.host(), self.port(), self.path())
    }
}
