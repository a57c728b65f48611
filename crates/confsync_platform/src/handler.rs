//! Request dispatch for remote clients.

use crate::platform::AdminPlatform;
use confsync_core::{
    ConfigurationUpdate, LoopbackServer, PlatformApi, PlatformError, PlatformLogin,
    PlatformRequest, PlatformResponse, PlatformSession,
};
use tracing::debug;

impl AdminPlatform {
    /// Handles a decoded request.
    pub fn handle_request(&self, request: PlatformRequest) -> PlatformResponse {
        debug!(endpoint = request.endpoint(), "handling platform request");
        match request {
            PlatformRequest::Login { username, password } => self
                .login(&username, password.expose())
                .map(|session| PlatformResponse::Session {
                    session: session.id(),
                })
                .unwrap_or_else(PlatformResponse::Failed),
            PlatformRequest::Logout { session } => {
                self.logout(&PlatformSession::new(session)).into()
            }
            PlatformRequest::PlatformConfiguration { session } => self
                .platform_configuration(&PlatformSession::new(session))
                .into(),
            PlatformRequest::TenantConfigurations { session } => self
                .tenant_configurations(&PlatformSession::new(session))
                .into(),
            PlatformRequest::TenantConfigurationFile {
                session,
                tenant_id,
                file_name,
            } => self
                .tenant_configuration_file(&PlatformSession::new(session), tenant_id, &file_name)
                .into(),
            PlatformRequest::UpdateTenantConfigurationFile {
                session,
                tenant_id,
                file_name,
                content,
            } => {
                let update = ConfigurationUpdate::new(tenant_id, file_name, content);
                self.update_tenant_configuration_file(&PlatformSession::new(session), &update)
                    .into()
            }
        }
    }
}

impl LoopbackServer for AdminPlatform {
    fn handle_post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, String> {
        let request = PlatformRequest::decode(body).map_err(|e| e.to_string())?;

        let response = if request.endpoint() == path {
            self.handle_request(request)
        } else {
            PlatformResponse::Failed(PlatformError::Protocol(format!(
                "{} posted to {}",
                request.endpoint(),
                path
            )))
        };

        response.encode().map_err(|e| e.to_string())
    }
}
