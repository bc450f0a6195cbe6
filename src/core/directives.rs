use crate::constants::{self, KNOWN_DIRECTIVES};
use crate::core::source::Source;
use crate::error::CspError;
use bytes::BytesMut;
use smallvec::SmallVec;
use std::{borrow::Cow, fmt};

/// A named directive and its source list, kept in the order supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Directive {
    name: Cow<'static, str>,
    sources: SmallVec<[Source; 4]>,
}

impl Directive {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            sources: SmallVec::new(),
        }
    }

    #[inline]
    pub fn add_source(&mut self, source: Source) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn add_sources<I>(&mut self, sources: I) -> &mut Self
    where
        I: IntoIterator<Item = Source>,
    {
        self.sources.extend(sources);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    #[inline]
    pub fn contains_nonce(&self) -> bool {
        self.sources.iter().any(Source::is_nonce_placeholder)
    }

    #[inline]
    pub fn nonce_placeholder_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| s.is_nonce_placeholder())
            .count()
    }

    #[inline]
    pub fn contains_hash(&self) -> bool {
        self.sources.iter().any(|s| s.hash_value().is_some())
    }

    pub fn validate(&self) -> Result<(), CspError> {
        if !KNOWN_DIRECTIVES.contains(&self.name.as_ref()) {
            return Err(CspError::InvalidDirectiveName(self.name.to_string()));
        }

        if self.sources.len() > 1 && self.sources.iter().any(Source::is_none) {
            return Err(CspError::InvalidDirectiveValue(format!(
                "Directive '{}' contains 'none' with other sources",
                self.name
            )));
        }

        for source in &self.sources {
            source.validate().map_err(|e| match e {
                CspError::InvalidDirectiveValue(msg) => {
                    CspError::InvalidDirectiveValue(format!("{}: {}", self.name, msg))
                }
                other => other,
            })?;
        }

        Ok(())
    }

    #[inline]
    pub fn estimated_size(&self, nonce_len: usize) -> usize {
        self.name.len()
            + self
                .sources
                .iter()
                .map(|s| 1 + s.estimated_size(nonce_len))
                .sum::<usize>()
    }

    /// Writes `<name> <source1> ... <sourceN>` into `buffer`.
    ///
    /// A directive with no sources renders as its bare name.
    pub(crate) fn write_to_buffer(
        &self,
        buffer: &mut BytesMut,
        nonce: Option<&str>,
    ) -> Result<(), CspError> {
        buffer.extend_from_slice(self.name.as_bytes());

        for source in &self.sources {
            buffer.extend_from_slice(b" ");
            source.write_to_buffer(buffer, nonce)?;
        }

        Ok(())
    }

    /// Renders this directive on its own.
    pub fn serialize(&self, nonce: Option<&str>) -> Result<String, CspError> {
        let mut buffer = BytesMut::with_capacity(self.estimated_size(nonce.map_or(0, str::len)));
        self.write_to_buffer(&mut buffer, nonce)?;
        String::from_utf8(buffer.to_vec())
            .map_err(|e| CspError::HeaderError(format!("directive is not UTF-8: {}", e)))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for source in &self.sources {
            write!(f, " {}", source)?;
        }
        Ok(())
    }
}

pub trait DirectiveSpec: Sized {
    const NAME: &'static str;

    fn add_source(mut self, source: Source) -> Self {
        self.inner_mut().add_source(source);
        self
    }

    fn add_sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = Source>,
    {
        self.inner_mut().add_sources(sources);
        self
    }

    fn inner_mut(&mut self) -> &mut Directive;

    fn build(self) -> Directive;
}

macro_rules! define_directive {
    ($name:ident, $directive_name:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            directive: Directive,
        }

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self {
                    directive: Directive::new($directive_name),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl DirectiveSpec for $name {
            const NAME: &'static str = $directive_name;

            #[inline]
            fn inner_mut(&mut self) -> &mut Directive {
                &mut self.directive
            }

            #[inline]
            fn build(self) -> Directive {
                self.directive
            }
        }
    };
}

define_directive!(DefaultSrc, constants::DEFAULT_SRC);
define_directive!(ScriptSrc, constants::SCRIPT_SRC);
define_directive!(StyleSrc, constants::STYLE_SRC);
define_directive!(ImgSrc, constants::IMG_SRC);
define_directive!(ConnectSrc, constants::CONNECT_SRC);
define_directive!(FontSrc, constants::FONT_SRC);
define_directive!(ObjectSrc, constants::OBJECT_SRC);
define_directive!(MediaSrc, constants::MEDIA_SRC);
define_directive!(FrameSrc, constants::FRAME_SRC);
define_directive!(WorkerSrc, constants::WORKER_SRC);
define_directive!(ManifestSrc, constants::MANIFEST_SRC);
define_directive!(ChildSrc, constants::CHILD_SRC);
define_directive!(FrameAncestors, constants::FRAME_ANCESTORS);
define_directive!(BaseUri, constants::BASE_URI);
define_directive!(FormAction, constants::FORM_ACTION);
define_directive!(ScriptSrcElem, constants::SCRIPT_SRC_ELEM);
define_directive!(ScriptSrcAttr, constants::SCRIPT_SRC_ATTR);
define_directive!(StyleSrcElem, constants::STYLE_SRC_ELEM);
define_directive!(StyleSrcAttr, constants::STYLE_SRC_ATTR);
