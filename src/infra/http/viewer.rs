use axum::{extract::FromRequestParts, http::request::Parts};

use crate::application::error::AppError;
use crate::domain::types::Viewer;

use super::HttpState;

/// Header carrying the username asserted by the upstream authentication proxy.
pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// The caller's identity; requests without the header are anonymous.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

impl FromRequestParts<HttpState> for CurrentViewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        let asserted = parts
            .headers
            .get(REMOTE_USER_HEADER)
            .and_then(|value| value.to_str().ok());

        let viewer = state.identity.resolve_viewer(asserted).await?;
        Ok(Self(viewer))
    }
}
