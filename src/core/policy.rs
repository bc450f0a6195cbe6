use crate::constants::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_NONCE_LENGTH, HEADER_CSP, HEADER_CSP_REPORT_ONLY,
    REPORT_TO, REPORT_URI, SEMICOLON_SPACE, UPGRADE_INSECURE_REQUESTS,
};
use crate::core::directives::{
    BaseUri, ConnectSrc, DefaultSrc, Directive, DirectiveSpec, FontSrc, FormAction,
    FrameAncestors, FrameSrc, ImgSrc, ObjectSrc, ScriptSrc, ScriptSrcAttr, ScriptSrcElem,
    StyleSrc, StyleSrcAttr, StyleSrcElem, WorkerSrc,
};
use crate::core::source::Source;
use crate::error::CspError;
use actix_web::http::header::{HeaderName, HeaderValue};
use bytes::BytesMut;
use indexmap::IndexMap;
use std::borrow::Cow;

/// An ordered, validated set of directives.
///
/// Policies are only produced by [`CspPolicyBuilder::build`] (or a policy
/// document) and never change afterwards, so one instance can be shared by
/// every request. Directives render in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CspPolicy {
    directives: IndexMap<Cow<'static, str>, Directive>,
    report_only: bool,
    static_header: Option<HeaderValue>,
}

impl CspPolicy {
    /// An empty policy; renders as an empty header value.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        if self.report_only {
            HeaderName::from_static(HEADER_CSP_REPORT_ONLY)
        } else {
            HeaderName::from_static(HEADER_CSP)
        }
    }

    /// Whether rendering this policy needs a per-request nonce.
    #[inline]
    pub fn requires_nonce(&self) -> bool {
        self.directives.values().any(Directive::contains_nonce)
    }

    #[inline]
    pub fn contains_hash(&self) -> bool {
        self.directives.values().any(Directive::contains_hash)
    }

    #[inline]
    pub fn get_directive(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    #[inline]
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    #[inline]
    pub fn is_report_only(&self) -> bool {
        self.report_only
    }

    /// Rough header length for a nonce of the default size.
    pub fn estimated_size(&self) -> usize {
        let nonce_len = (DEFAULT_NONCE_LENGTH + 2) / 3 * 4;
        self.directives
            .values()
            .map(|d| d.estimated_size(nonce_len))
            .sum::<usize>()
            + self.directives.len().saturating_sub(1) * SEMICOLON_SPACE.len()
    }

    /// Renders the header value as a string.
    ///
    /// `nonce` is required when the policy holds the placeholder and ignored
    /// otherwise.
    pub fn serialize(&self, nonce: Option<&str>) -> Result<String, CspError> {
        let bytes = self.render(nonce)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| CspError::HeaderError(format!("policy is not UTF-8: {}", e)))
    }

    /// Renders the header value, reusing the value computed at build time
    /// when the policy has no placeholder.
    pub fn header_value(&self, nonce: Option<&str>) -> Result<HeaderValue, CspError> {
        if let Some(value) = &self.static_header {
            return Ok(value.clone());
        }

        let bytes = self.render(nonce)?;
        HeaderValue::from_maybe_shared(bytes.freeze())
            .map_err(|e| CspError::HeaderError(format!("invalid header value: {}", e)))
    }

    fn render(&self, nonce: Option<&str>) -> Result<BytesMut, CspError> {
        let nonce = if self.requires_nonce() {
            let nonce = nonce.ok_or(CspError::MissingNonce)?;
            check_nonce(nonce)?;
            Some(nonce)
        } else {
            None
        };

        let nonce_len = nonce.map_or(0, str::len);
        let capacity = self
            .directives
            .values()
            .map(|d| d.estimated_size(nonce_len) + SEMICOLON_SPACE.len())
            .sum::<usize>()
            .max(DEFAULT_BUFFER_CAPACITY);
        let mut buffer = BytesMut::with_capacity(capacity);

        let mut first = true;
        for directive in self.directives.values() {
            if !first {
                buffer.extend_from_slice(SEMICOLON_SPACE);
            }
            directive.write_to_buffer(&mut buffer, nonce)?;
            first = false;
        }

        Ok(buffer)
    }

    pub fn validate(&self) -> Result<(), CspError> {
        let mut placeholder_seen = false;

        for directive in self.directives.values() {
            directive.validate()?;

            let count = directive.nonce_placeholder_count();
            if count > 1 || (count == 1 && placeholder_seen) {
                return Err(CspError::DuplicateNoncePlaceholder(
                    directive.name().to_string(),
                ));
            }
            placeholder_seen |= count == 1;
        }

        Ok(())
    }
}

/// A nonce must stay a single base64 token so it cannot break out of its
/// source expression.
fn check_nonce(nonce: &str) -> Result<(), CspError> {
    let valid = !nonce.is_empty()
        && nonce
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'-' | b'_' | b'='));

    if valid {
        Ok(())
    } else {
        Err(CspError::HeaderError(format!(
            "nonce '{}' is not a base64 value",
            nonce.escape_debug()
        )))
    }
}

#[derive(Debug, Default)]
pub struct CspPolicyBuilder {
    policy: CspPolicy,
    duplicate: Option<String>,
}

impl CspPolicyBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directive<D: DirectiveSpec>(self, directive_builder: D) -> Self {
        self.with_directive(directive_builder.build())
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        let name = directive.name().to_owned();
        if self.policy.directives.contains_key(name.as_str()) {
            self.duplicate.get_or_insert(name);
        } else {
            self.policy.directives.insert(Cow::Owned(name), directive);
        }
        self
    }

    /// Adds a directive by name, for names without a dedicated method.
    pub fn directive(
        self,
        name: impl Into<Cow<'static, str>>,
        sources: impl IntoIterator<Item = Source>,
    ) -> Self {
        let mut directive = Directive::new(name);
        directive.add_sources(sources);
        self.with_directive(directive)
    }

    pub fn default_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(DefaultSrc::new().add_sources(sources))
    }

    pub fn script_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(ScriptSrc::new().add_sources(sources))
    }

    pub fn script_src_elem(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(ScriptSrcElem::new().add_sources(sources))
    }

    pub fn script_src_attr(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(ScriptSrcAttr::new().add_sources(sources))
    }

    pub fn style_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(StyleSrc::new().add_sources(sources))
    }

    pub fn style_src_elem(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(StyleSrcElem::new().add_sources(sources))
    }

    pub fn style_src_attr(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(StyleSrcAttr::new().add_sources(sources))
    }

    pub fn img_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(ImgSrc::new().add_sources(sources))
    }

    pub fn connect_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(ConnectSrc::new().add_sources(sources))
    }

    pub fn font_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(FontSrc::new().add_sources(sources))
    }

    pub fn object_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(ObjectSrc::new().add_sources(sources))
    }

    pub fn frame_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(FrameSrc::new().add_sources(sources))
    }

    pub fn worker_src(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(WorkerSrc::new().add_sources(sources))
    }

    pub fn frame_ancestors(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(FrameAncestors::new().add_sources(sources))
    }

    pub fn base_uri(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(BaseUri::new().add_sources(sources))
    }

    pub fn form_action(self, sources: impl IntoIterator<Item = Source>) -> Self {
        self.add_directive(FormAction::new().add_sources(sources))
    }

    pub fn upgrade_insecure_requests(self) -> Self {
        self.with_directive(Directive::new(UPGRADE_INSECURE_REQUESTS))
    }

    pub fn report_uri(self, uri: impl Into<Cow<'static, str>>) -> Self {
        self.directive(REPORT_URI, [Source::Host(uri.into())])
    }

    pub fn report_to(self, endpoint: impl Into<Cow<'static, str>>) -> Self {
        self.directive(REPORT_TO, [Source::Host(endpoint.into())])
    }

    #[inline]
    pub fn report_only(mut self, enabled: bool) -> Self {
        self.policy.report_only = enabled;
        self
    }

    /// Validates and freezes the policy.
    ///
    /// Fails on unknown directive names, malformed tokens, repeated
    /// directives or more than one nonce placeholder.
    pub fn build(self) -> Result<CspPolicy, CspError> {
        if let Some(name) = self.duplicate {
            return Err(CspError::DuplicateDirective(name));
        }

        let mut policy = self.policy;
        policy.validate()?;

        if policy.requires_nonce() {
            log::debug!(
                "built nonce policy: {}",
                policy.directives().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            );
        } else {
            let value = policy.header_value(None)?;
            log::debug!("built static policy: {:?}", value);
            policy.static_header = Some(value);
        }

        Ok(policy)
    }
}
