//! Remote platform access over HTTP.
//!
//! [`HttpPlatform`] implements the platform traits by posting CBOR encoded
//! [`PlatformRequest`]s. The HTTP client itself is abstracted via a trait so
//! any client library (or a loopback for tests) can carry the requests.

use crate::error::{PlatformError, PlatformResult};
use crate::model::{ConfigurationUpdate, PlatformConfiguration, TenantConfiguration, TenantId};
use crate::platform::{PlatformApi, PlatformLogin, PlatformSession};
use crate::protocol::{PlatformRequest, PlatformResponse, WirePassword, ENDPOINT_PREFIX};
use parking_lot::RwLock;
use std::sync::Arc;

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport. Deadlines and
/// cancellation are the client's concern.
pub trait HttpClient: Send + Sync {
    /// Sends a POST request and returns the response body.
    fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, String>;

    /// Checks if the client is healthy.
    fn is_healthy(&self) -> bool;
}

/// A platform reached over HTTP.
pub struct HttpPlatform<C: HttpClient> {
    /// Base URL of the platform (e.g., "https://admin.example.com").
    base_url: String,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpPlatform<C> {
    /// Creates a remote platform.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the last transport error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn send(&self, request: &PlatformRequest) -> PlatformResult<PlatformResponse> {
        if !self.client.is_healthy() {
            return Err(PlatformError::Unavailable("HTTP client is not healthy".into()));
        }

        let body = request
            .encode()
            .map_err(|e| PlatformError::Protocol(e.to_string()))?;

        let url = format!("{}{}", self.base_url, request.endpoint());
        let response_body = self.client.post(&url, body).map_err(|e| {
            *self.last_error.write() = Some(e.clone());
            PlatformError::Unavailable(e)
        })?;
        *self.last_error.write() = None;

        match PlatformResponse::decode(&response_body)
            .map_err(|e| PlatformError::Protocol(e.to_string()))?
        {
            PlatformResponse::Failed(error) => Err(error),
            response => Ok(response),
        }
    }
}

fn unexpected(request: &PlatformRequest, response: PlatformResponse) -> PlatformError {
    PlatformError::Protocol(format!(
        "unexpected response to {}: {:?}",
        request.endpoint(),
        response
    ))
}

impl<C: HttpClient> PlatformLogin for HttpPlatform<C> {
    fn login(&self, username: &str, password: &str) -> PlatformResult<PlatformSession> {
        let request = PlatformRequest::Login {
            username: username.to_string(),
            password: WirePassword::new(password),
        };
        match self.send(&request)? {
            PlatformResponse::Session { session } => Ok(PlatformSession::new(session)),
            other => Err(unexpected(&request, other)),
        }
    }

    fn logout(&self, session: &PlatformSession) -> PlatformResult<()> {
        let request = PlatformRequest::Logout {
            session: session.id(),
        };
        match self.send(&request)? {
            PlatformResponse::Done => Ok(()),
            other => Err(unexpected(&request, other)),
        }
    }
}

impl<C: HttpClient> PlatformApi for HttpPlatform<C> {
    fn platform_configuration(
        &self,
        session: &PlatformSession,
    ) -> PlatformResult<PlatformConfiguration> {
        let request = PlatformRequest::PlatformConfiguration {
            session: session.id(),
        };
        match self.send(&request)? {
            PlatformResponse::PlatformConfiguration(configuration) => Ok(configuration),
            other => Err(unexpected(&request, other)),
        }
    }

    fn tenant_configurations(
        &self,
        session: &PlatformSession,
    ) -> PlatformResult<TenantConfiguration> {
        let request = PlatformRequest::TenantConfigurations {
            session: session.id(),
        };
        match self.send(&request)? {
            PlatformResponse::TenantConfigurations(configuration) => Ok(configuration),
            other => Err(unexpected(&request, other)),
        }
    }

    fn tenant_configuration_file(
        &self,
        session: &PlatformSession,
        tenant_id: TenantId,
        file_name: &str,
    ) -> PlatformResult<Vec<u8>> {
        let request = PlatformRequest::TenantConfigurationFile {
            session: session.id(),
            tenant_id,
            file_name: file_name.to_string(),
        };
        match self.send(&request)? {
            PlatformResponse::File { content } => Ok(content),
            other => Err(unexpected(&request, other)),
        }
    }

    fn update_tenant_configuration_file(
        &self,
        session: &PlatformSession,
        update: &ConfigurationUpdate,
    ) -> PlatformResult<()> {
        let request = PlatformRequest::UpdateTenantConfigurationFile {
            session: session.id(),
            tenant_id: update.tenant_id,
            file_name: update.file_name.clone(),
            content: update.content.clone(),
        };
        match self.send(&request)? {
            PlatformResponse::Done => Ok(()),
            other => Err(unexpected(&request, other)),
        }
    }
}

/// Trait for servers that can handle loopback requests.
pub trait LoopbackServer {
    /// Handles a POST request and returns the response body.
    fn handle_post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, String>;
}

impl<S: LoopbackServer + ?Sized> LoopbackServer for Arc<S> {
    fn handle_post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, String> {
        (**self).handle_post(path, body)
    }
}

/// A loopback HTTP client that routes requests directly to an in-process server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a new loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, String> {
        // Endpoints hold the prefix once, at their start; the base URL may hold it too.
        let path = url.rfind(ENDPOINT_PREFIX).map(|i| &url[i..]).unwrap_or(url);
        self.server.handle_post(path, &body)
    }

    fn is_healthy(&self) -> bool {
        true
    }
}
