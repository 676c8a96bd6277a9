use axum::response::IntoResponse;

use crate::APP_USER_AGENT;

// axum handler for the index route
pub async fn root() -> impl IntoResponse {
    APP_USER_AGENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn root_returns_app_identity() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
