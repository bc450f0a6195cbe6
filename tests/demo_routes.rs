use actix_csp_demo::demo::{
    self, pages, policies::count_script_integrity, DemoPolicies, ServerSettings,
};
use actix_csp_demo::{CspPolicy, HashAlgorithm, HashGenerator};
use actix_web::{dev::ServiceResponse, http::StatusCode, test, App};

const CSP: &str = "content-security-policy";

async fn get(policies: DemoPolicies, uri: &str) -> ServiceResponse {
    let app = test::init_service(App::new().configure(demo::configure(policies))).await;
    let req = test::TestRequest::get().uri(uri).to_request();
    test::call_service(&app, req).await
}

async fn get_default(uri: &str) -> ServiceResponse {
    get(DemoPolicies::build(None).unwrap(), uri).await
}

fn csp_header(resp: &ServiceResponse) -> String {
    resp.headers()
        .get(CSP)
        .expect("missing CSP header")
        .to_str()
        .unwrap()
        .to_owned()
}

async fn body_text(resp: ServiceResponse) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn nonce_in_header(header: &str) -> &str {
    let start = header.find("'nonce-").expect("no nonce in header") + "'nonce-".len();
    let len = header[start..].find('\'').unwrap();
    &header[start..start + len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_index_has_no_policy() {
        let resp = get_default("/").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CSP).is_none());
        assert_eq!(body_text(resp).await, pages::WELCOME);
    }

    #[actix_web::test]
    async fn test_basics() {
        let resp = get_default("/basics").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(csp_header(&resp), "script-src 'self'");
        assert!(body_text(resp).await.contains("Philippe<script>"));
    }

    #[actix_web::test]
    async fn test_hashes_allow_the_inline_count_script() {
        let resp = get_default("/hashes").await;

        let expected = HashGenerator::generate(
            HashAlgorithm::Sha256,
            pages::COUNT_INLINE_SCRIPT.as_bytes(),
        );
        assert_eq!(
            csp_header(&resp),
            format!("script-src 'self' 'sha256-{}'", expected)
        );
        assert!(body_text(resp)
            .await
            .contains(&format!("<script>{}</script>", pages::COUNT_INLINE_SCRIPT)));
    }

    #[actix_web::test]
    async fn test_remote_hashes_match_integrity_attribute() {
        let resp = get_default("/remotehashes").await;

        let integrity = count_script_integrity();
        assert_eq!(csp_header(&resp), format!("script-src '{}'", integrity));
        assert!(body_text(resp)
            .await
            .contains(&format!("integrity=\"{}\"", integrity)));
    }

    #[actix_web::test]
    async fn test_inline_hashes() {
        let resp = get_default("/inlinehashes").await;

        let handler =
            HashGenerator::generate(HashAlgorithm::Sha256, pages::COUNT_HANDLER.as_bytes());
        assert_eq!(
            csp_header(&resp),
            format!(
                "script-src-elem 'self'; script-src-attr 'unsafe-hashes' 'sha256-{}'",
                handler
            )
        );
    }

    #[actix_web::test]
    async fn test_nonce_page_uses_header_nonce() {
        let resp = get_default("/nonces").await;

        let header = csp_header(&resp);
        let nonce = nonce_in_header(&header).to_owned();
        assert_eq!(header, format!("script-src 'nonce-{}'", nonce));
        assert_eq!(nonce.len(), 24);
        assert!(body_text(resp)
            .await
            .contains(&format!("<script nonce=\"{}\">", nonce)));
    }

    #[actix_web::test]
    async fn test_nonces_differ_between_requests() {
        let app = test::init_service(
            App::new().configure(demo::configure(DemoPolicies::build(None).unwrap())),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/nonces").to_request())
            .await;
        let second =
            test::call_service(&app, test::TestRequest::get().uri("/nonces").to_request()).await;

        assert_ne!(csp_header(&first), csp_header(&second));
    }

    #[actix_web::test]
    async fn test_universal_policy() {
        let resp = get_default("/universal-csp").await;

        let header = csp_header(&resp);
        let nonce = nonce_in_header(&header).to_owned();
        assert_eq!(
            header,
            format!(
                "script-src 'nonce-{}' 'strict-dynamic' 'unsafe-inline' http: https: 'unsafe-eval'; object-src 'none'; base-uri 'self'",
                nonce
            )
        );

        let body = body_text(resp).await;
        assert_eq!(
            body.matches(&format!("nonce=\"{}\"", nonce)).count(),
            body.matches("<script").count()
        );
    }

    #[actix_web::test]
    async fn test_strict_dynamic() {
        let resp = get_default("/strict-dynamic").await;

        let header = csp_header(&resp);
        let nonce = nonce_in_header(&header).to_owned();
        assert_eq!(
            header,
            format!("script-src 'nonce-{}' 'strict-dynamic'", nonce)
        );
        assert!(body_text(resp)
            .await
            .contains(&format!("<script nonce=\"{}\" async src=", nonce)));
    }

    #[actix_web::test]
    async fn test_twitter_step_zero_has_no_policy() {
        let resp = get_default("/twitter-step0").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(CSP).is_none());
    }

    #[actix_web::test]
    async fn test_twitter_steps_grow() {
        let policies = DemoPolicies::build(None).unwrap();
        let app = test::init_service(App::new().configure(demo::configure(policies))).await;

        let mut previous = String::new();
        for step in 1..=5 {
            let req = test::TestRequest::get()
                .uri(&format!("/twitter-step{}", step))
                .to_request();
            let resp = test::call_service(&app, req).await;
            let header = csp_header(&resp);

            assert!(header.starts_with("script-src 'self'"));
            assert!(header.starts_with(&previous), "step {} dropped a source", step);
            assert!(header.len() > previous.len());
            previous = header;
        }

        assert!(previous.ends_with("https://cdn.syndication.twimg.com"));
    }

    #[actix_web::test]
    async fn test_count_script() {
        let resp = get_default("/js/count.js").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, pages::COUNT_JS);
    }

    #[actix_web::test]
    async fn test_unknown_script() {
        let resp = get_default("/js/other.js").await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_custom_route_only_with_policy() {
        let resp = get_default("/custom").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let custom = CspPolicy::from_json(
            r#"{"directives": {"script-src": [{"nonce": true}], "object-src": ["'none'"]}}"#,
        )
        .unwrap();
        let resp = get(DemoPolicies::build(Some(custom)).unwrap(), "/custom").await;

        let header = csp_header(&resp);
        let nonce = nonce_in_header(&header).to_owned();
        assert_eq!(
            header,
            format!("script-src 'nonce-{}'; object-src 'none'", nonce)
        );
        assert!(body_text(resp)
            .await
            .contains(&format!("nonce=\"{}\"", nonce)));
    }

    #[actix_web::test]
    async fn test_default_settings() {
        let settings = ServerSettings::default();

        assert_eq!(settings.addr, "127.0.0.1:3000");
        assert!(settings.load_custom_policy().unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_settings_load_custom_policy() {
        let path = std::env::temp_dir().join(format!("csp-demo-custom-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"directives": {"script-src": ["'self'"]}}"#).unwrap();
        let settings = ServerSettings {
            custom_policy: Some(path.clone()),
            ..ServerSettings::default()
        };

        let policy = settings.load_custom_policy();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            policy.unwrap().unwrap().serialize(None).unwrap(),
            "script-src 'self'"
        );
    }
}
