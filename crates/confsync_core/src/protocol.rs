//! Wire messages exchanged with a remote platform.
//!
//! Requests and responses are CBOR encoded. Each request is posted to its
//! own endpoint; the response body is always a [`PlatformResponse`].

use crate::error::{CodecError, CodecResult, PlatformError};
use crate::model::{PlatformConfiguration, TenantConfiguration, TenantId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// Endpoint prefix shared by every platform request.
pub const ENDPOINT_PREFIX: &str = "/platform/";

/// A password on the wire. Never printed; wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct WirePassword(Zeroizing<String>);

impl WirePassword {
    /// Wraps a password.
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    /// Returns the password.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Serialize for WirePassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for WirePassword {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl fmt::Debug for WirePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A request to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformRequest {
    /// Open a session with administrator credentials.
    Login {
        /// Administrator user name.
        username: String,
        /// Administrator password.
        password: WirePassword,
    },
    /// Close a session.
    Logout {
        /// Session id.
        session: u64,
    },
    /// Fetch platform-wide configuration.
    PlatformConfiguration {
        /// Session id.
        session: u64,
    },
    /// Fetch every tenant's configuration.
    TenantConfigurations {
        /// Session id.
        session: u64,
    },
    /// Fetch one file of one tenant.
    TenantConfigurationFile {
        /// Session id.
        session: u64,
        /// Tenant.
        tenant_id: TenantId,
        /// File name.
        file_name: String,
    },
    /// Replace one file of one tenant.
    UpdateTenantConfigurationFile {
        /// Session id.
        session: u64,
        /// Tenant.
        tenant_id: TenantId,
        /// File name.
        file_name: String,
        /// New content.
        content: Vec<u8>,
    },
}

impl PlatformRequest {
    /// Returns the endpoint path the request is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            PlatformRequest::Login { .. } => "/platform/login",
            PlatformRequest::Logout { .. } => "/platform/logout",
            PlatformRequest::PlatformConfiguration { .. } => "/platform/configuration",
            PlatformRequest::TenantConfigurations { .. } => "/platform/tenants/configuration",
            PlatformRequest::TenantConfigurationFile { .. } => "/platform/tenants/file",
            PlatformRequest::UpdateTenantConfigurationFile { .. } => {
                "/platform/tenants/file/update"
            }
        }
    }

    /// Encodes to CBOR.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        encode(self)
    }

    /// Decodes from CBOR.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        decode(bytes)
    }
}

/// A response from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformResponse {
    /// A session was opened.
    Session {
        /// Session id.
        session: u64,
    },
    /// The request succeeded and returns nothing.
    Done,
    /// Platform-wide configuration.
    PlatformConfiguration(PlatformConfiguration),
    /// Every tenant's configuration.
    TenantConfigurations(TenantConfiguration),
    /// Content of one file.
    File {
        /// File content.
        content: Vec<u8>,
    },
    /// The request failed.
    Failed(PlatformError),
}

impl PlatformResponse {
    /// Encodes to CBOR.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        encode(self)
    }

    /// Decodes from CBOR.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        decode(bytes)
    }
}

impl<T> From<Result<T, PlatformError>> for PlatformResponse
where
    T: Into<PlatformResponse>,
{
    fn from(result: Result<T, PlatformError>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(error) => PlatformResponse::Failed(error),
        }
    }
}

impl From<()> for PlatformResponse {
    fn from(_: ()) -> Self {
        PlatformResponse::Done
    }
}

impl From<PlatformConfiguration> for PlatformResponse {
    fn from(configuration: PlatformConfiguration) -> Self {
        PlatformResponse::PlatformConfiguration(configuration)
    }
}

impl From<TenantConfiguration> for PlatformResponse {
    fn from(configuration: TenantConfiguration) -> Self {
        PlatformResponse::TenantConfigurations(configuration)
    }
}

impl From<Vec<u8>> for PlatformResponse {
    fn from(content: Vec<u8>) -> Self {
        PlatformResponse::File { content }
    }
}

fn encode<T: Serialize>(value: &T) -> CodecResult<Vec<u8>> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(value, &mut bytes).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    ciborium::de::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn endpoints_share_prefix() {
        let requests = [
            PlatformRequest::Login {
                username: "admin".into(),
                password: WirePassword::new("secret"),
            },
            PlatformRequest::Logout { session: 1 },
            PlatformRequest::TenantConfigurations { session: 1 },
            PlatformRequest::UpdateTenantConfigurationFile {
                session: 1,
                tenant_id: TenantId::new(7),
                file_name: "settings.xml".into(),
                content: b"<a/>".to_vec(),
            },
        ];
        for request in &requests {
            assert!(request.endpoint().starts_with(ENDPOINT_PREFIX));
        }
    }

    #[test]
    fn tenant_map_survives_encoding() {
        let mut tenants = BTreeMap::new();
        tenants.insert(
            TenantId::new(1),
            [("a.json".to_string(), b"{}".to_vec())].into_iter().collect(),
        );
        let response = PlatformResponse::TenantConfigurations(TenantConfiguration::new(tenants));

        let decoded = PlatformResponse::decode(&response.encode().unwrap()).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn failures_keep_their_kind() {
        let response = PlatformResponse::Failed(PlatformError::UnknownFile {
            tenant_id: TenantId::new(3),
            file_name: "missing.json".into(),
        });
        let decoded = PlatformResponse::decode(&response.encode().unwrap()).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn result_into_response() {
        let ok: Result<Vec<u8>, PlatformError> = Ok(b"x".to_vec());
        assert_eq!(
            PlatformResponse::from(ok),
            PlatformResponse::File {
                content: b"x".to_vec()
            }
        );

        let err: Result<(), PlatformError> = Err(PlatformError::InvalidCredentials);
        assert_eq!(
            PlatformResponse::from(err),
            PlatformResponse::Failed(PlatformError::InvalidCredentials)
        );
    }

    #[test]
    fn password_is_not_printed() {
        let request = PlatformRequest::Login {
            username: "admin".into(),
            password: WirePassword::new("secret"),
        };
        assert!(!format!("{:?}", request).contains("secret"));
    }

    #[test]
    fn login_request_carries_password() {
        let request = PlatformRequest::Login {
            username: "admin".into(),
            password: WirePassword::new("secret"),
        };
        match PlatformRequest::decode(&request.encode().unwrap()).unwrap() {
            PlatformRequest::Login { password, .. } => assert_eq!(password.expose(), "secret"),
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(matches!(
            PlatformRequest::decode(&[0xff, 0x00, 0x13]),
            Err(CodecError::Decode(_))
        ));
    }
}
