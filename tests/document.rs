use actix_csp_demo::core::{CspPolicy, PolicyDocument, Source};
use actix_csp_demo::CspError;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_document_with_placeholder() {
        let policy = CspPolicy::from_json(
            r#"{
                "directives": {
                    "script-src": [{"nonce": true}, "'strict-dynamic'", "https:"],
                    "object-src": ["'none'"]
                }
            }"#,
        )
        .unwrap();

        assert!(policy.requires_nonce());
        assert!(!policy.is_report_only());
        assert_eq!(
            policy.serialize(Some("abc123")).unwrap(),
            "script-src 'nonce-abc123' 'strict-dynamic' https:; object-src 'none'"
        );
    }

    #[test]
    fn test_document_keeps_directive_order() {
        let policy = CspPolicy::from_json(
            r#"{"directives": {"base-uri": ["'self'"], "default-src": ["'none'"], "img-src": ["data:", "https://images.example.com"]}}"#,
        )
        .unwrap();

        assert_eq!(
            policy.serialize(None).unwrap(),
            "base-uri 'self'; default-src 'none'; img-src data: https://images.example.com"
        );
    }

    #[test]
    fn test_document_report_only() {
        let policy = CspPolicy::from_json(
            r#"{"directives": {"default-src": ["'self'"]}, "report_only": true}"#,
        )
        .unwrap();

        assert!(policy.is_report_only());
        assert_eq!(
            policy.header_name().as_str(),
            "content-security-policy-report-only"
        );
    }

    #[test]
    fn test_document_hash_token() {
        let hash = "sha256-RFWPLDbv2BY+rCkDzsE+0fr8ylGr2R2faWMhq4lfEQc=";
        let document = PolicyDocument::from_json(&format!(
            r#"{{"directives": {{"script-src": ["'{}'"]}}}}"#,
            hash
        ))
        .unwrap();

        let policy = document.into_policy().unwrap();

        assert!(policy.contains_hash());
        assert_eq!(
            policy.serialize(None).unwrap(),
            format!("script-src '{}'", hash)
        );
    }

    #[test]
    fn test_document_placeholder_source() {
        let document =
            PolicyDocument::from_json(r#"{"directives": {"style-src": [{"nonce": true}]}}"#)
                .unwrap();

        let tokens = document.directives.get("style-src").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].to_source().unwrap(), Source::Nonce);
    }

    #[test_case(r#"{"directives": {"script-src": [{"nonce": false}]}}"# ; "disabled placeholder")]
    #[test_case(r#"{"directives": {"script-src": ["'nonce-abc123'"]}}"# ; "literal nonce")]
    #[test_case(r#"{"directives": {"script-src": ["'self'", 'x']}}"# ; "not json")]
    #[test_case(r#"{"directives": {"script-src": [42]}}"# ; "number token")]
    #[test_case(r#"{"directives": {}, "mode": "strict"}"# ; "unknown field")]
    #[test_case(r#"{"directives": {"script-src": [{"nonce": true, "length": 8}]}}"# ; "extra placeholder field")]
    #[test_case(r#"{"directives": {"script-source": ["'self'"]}}"# ; "unknown directive")]
    #[test_case(r#"{"directives": {"script-src": ["'none'", "'self'"]}}"# ; "none with others")]
    #[test_case(r#"{"directives": {"script-src": [{"nonce": true}], "style-src": [{"nonce": true}]}}"# ; "two placeholders")]
    #[test_case(r#"{"directives": {"script-src": ["'sha256-short'"]}}"# ; "bad hash")]
    #[test_case(r#"{"directives": {"script-src": [{"nonce": true}], "object-src": ["'none'"], "script-src": ["'self'"]}}"# ; "repeated directive")]
    fn test_rejected_documents(json: &str) {
        let err = CspPolicy::from_json(json).unwrap_err();

        assert!(err.is_configuration(), "unexpected error kind: {:?}", err);
    }

    #[test]
    fn test_repeated_directive_is_not_collapsed() {
        let json = r#"{
            "directives": {
                "script-src": [{"nonce": true}],
                "object-src": ["'none'"],
                "script-src": ["'self'"]
            }
        }"#;

        let document = PolicyDocument::from_json(json).unwrap();
        assert_eq!(document.directives.len(), 3);
        assert_eq!(
            document.directives.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            ["script-src", "object-src", "script-src"]
        );

        let err = document.into_policy().unwrap_err();
        assert!(
            matches!(&err, CspError::DuplicateDirective(name) if name == "script-src"),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn test_missing_directives_field() {
        let err = PolicyDocument::from_json(r#"{"report_only": true}"#).unwrap_err();

        assert!(matches!(err, CspError::JsonError(_)));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!(
            "csp-policy-document-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"directives": {"script-src": [{"nonce": true}], "object-src": ["'none'"]}}"#,
        )
        .unwrap();

        let policy = PolicyDocument::from_path(&path)
            .and_then(PolicyDocument::into_policy)
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            policy.serialize(Some("xyz")).unwrap(),
            "script-src 'nonce-xyz'; object-src 'none'"
        );
    }

    #[test]
    fn test_from_missing_path() {
        let err = PolicyDocument::from_path("/nonexistent/csp-policy.json").unwrap_err();

        assert!(matches!(err, CspError::IoError(_)));
        assert!(!err.is_configuration());
    }
}
