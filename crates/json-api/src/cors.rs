//! Cross-origin request handling

use salvo::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Cors, CorsHandler},
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue},
    },
};
use tracing::warn;

use crate::movies::update::EXPECTED_VERSION_HEADER;

/// Build the CORS hoop for `origins`, or `None` when no origin is trusted.
///
/// Wildcards and values that are not valid header values are skipped.
pub(crate) fn trusted_origins(origins: &[&str]) -> Option<CorsHandler> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| **origin != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_invalid) => {
                warn!(origin, "ignoring invalid trusted origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return None;
    }

    Some(
        Cors::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(AllowMethods::list([
                Method::OPTIONS,
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ]))
            .allow_headers(AllowHeaders::list([
                AUTHORIZATION,
                CONTENT_TYPE,
                HeaderName::from_static(EXPECTED_VERSION_HEADER),
            ]))
            .into_handler(),
    )
}

#[cfg(test)]
mod tests {
    use salvo::{http::header::ACCESS_CONTROL_ALLOW_ORIGIN, prelude::*, test::TestClient};
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn ok(res: &mut Response) {
        res.render("ok");
    }

    #[test]
    fn no_origins_means_no_hoop() {
        assert!(trusted_origins(&[]).is_none(), "nothing to allow");
        assert!(trusted_origins(&["*"]).is_none(), "wildcards are never trusted");
    }

    #[tokio::test]
    async fn preflight_from_trusted_origin_is_allowed() -> TestResult {
        let cors = trusted_origins(&["https://trusted.example"]).ok_or("expected a cors hoop")?;

        let service = Service::new(Router::with_path("v1/movies").post(ok)).hoop(cors);

        let res = TestClient::options("http://example.com/v1/movies")
            .add_header("origin", "https://trusted.example", true)
            .add_header("access-control-request-method", "POST", true)
            .send(&service)
            .await;

        assert_eq!(
            res.headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("https://trusted.example")
        );

        Ok(())
    }

    #[tokio::test]
    async fn untrusted_origin_gets_no_allow_header() -> TestResult {
        let cors = trusted_origins(&["https://trusted.example"]).ok_or("expected a cors hoop")?;

        let service = Service::new(Router::with_path("v1/movies").get(ok)).hoop(cors);

        let res = TestClient::get("http://example.com/v1/movies")
            .add_header("origin", "https://elsewhere.example", true)
            .send(&service)
            .await;

        assert!(
            res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none(),
            "untrusted origins are not echoed"
        );

        Ok(())
    }
}
