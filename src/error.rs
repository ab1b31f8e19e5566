//! Structured errors for the untagging pipeline.
//!
//! Callers of [`crate::Untagger::attributed_string`] never see these: every
//! failure there degrades to the original, unstyled input. They surface
//! through the `try_*`/`parse` entry points and through `log` diagnostics.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// Stage of the pipeline an error originated in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorPhase {
    /// Bytes could not be decoded as text.
    Encoding,
    /// The XML tokenizer rejected the wrapped document.
    Parse,
    /// Tokens were well-formed but violated tag structure or limits.
    Validation,
    /// Parsing reported success without producing a result.
    Result,
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorPhase::Encoding => "encoding",
            ErrorPhase::Parse => "parse",
            ErrorPhase::Validation => "validation",
            ErrorPhase::Result => "result",
        };
        f.write_str(name)
    }
}

/// Typed actual-vs-limit context for limit violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorLimitContext {
    /// Which limit tripped (`max_depth`, `max_elements`, `max_input_bytes`).
    pub kind: &'static str,
    /// Observed value.
    pub actual: usize,
    /// Configured limit.
    pub limit: usize,
}

impl ErrorLimitContext {
    pub(crate) fn new(kind: &'static str, actual: usize, limit: usize) -> Self {
        Self {
            kind,
            actual,
            limit,
        }
    }
}

/// Optional context attached to an [`UntagError`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UntagErrorContext {
    /// Tag name involved in the failure, if any.
    pub tag: Option<Box<str>>,
    /// Tag name that was expected instead (mismatched end tags).
    pub expected_tag: Option<Box<str>>,
    /// Tokenizer/read offset in bytes, relative to the caller's input.
    pub token_offset: Option<usize>,
    /// Short description of where in the pipeline the failure happened.
    pub source: Option<Box<str>>,
}

/// Structured error for untagging operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UntagError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional typed actual-vs-limit context.
    pub limit: Option<Box<ErrorLimitContext>>,
    /// Optional additional context.
    pub context: Option<Box<UntagErrorContext>>,
}

impl UntagError {
    pub(crate) fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            limit: None,
            context: None,
        }
    }

    pub(crate) fn parse(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorPhase::Parse, code, message)
    }

    pub(crate) fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorPhase::Validation, code, message)
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorPhase::Encoding, "DECODE_ERROR", message)
    }

    pub(crate) fn missing_result(message: impl Into<String>) -> Self {
        Self::new(ErrorPhase::Result, "MISSING_RESULT", message)
    }

    pub(crate) fn with_limit(mut self, kind: &'static str, actual: usize, limit: usize) -> Self {
        self.limit = Some(Box::new(ErrorLimitContext::new(kind, actual, limit)));
        self
    }

    pub(crate) fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.context_mut().tag = Some(tag.into().into_boxed_str());
        self
    }

    pub(crate) fn with_expected_tag(mut self, tag: impl Into<String>) -> Self {
        self.context_mut().expected_tag = Some(tag.into().into_boxed_str());
        self
    }

    pub(crate) fn with_token_offset(mut self, token_offset: usize) -> Self {
        self.context_mut().token_offset = Some(token_offset);
        self
    }

    pub(crate) fn with_source(mut self, source: impl Into<String>) -> Self {
        self.context_mut().source = Some(source.into().into_boxed_str());
        self
    }

    /// Rebase the token offset from the wrapped document onto the caller's input.
    pub(crate) fn shift_token_offset(mut self, wrapper_prefix_len: usize) -> Self {
        if let Some(ctx) = self.context.as_deref_mut() {
            ctx.token_offset = ctx
                .token_offset
                .map(|offset| offset.saturating_sub(wrapper_prefix_len));
        }
        self
    }

    /// Tokenizer offset of the failure, if the error carries one.
    pub fn token_offset(&self) -> Option<usize> {
        self.context.as_deref().and_then(|ctx| ctx.token_offset)
    }

    fn context_mut(&mut self) -> &mut UntagErrorContext {
        self.context
            .get_or_insert_with(|| Box::new(UntagErrorContext::default()))
    }
}

impl fmt::Display for UntagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(limit) = self.limit.as_deref() {
            write!(
                f,
                " [limit_kind={} actual={} limit={}]",
                limit.kind, limit.actual, limit.limit
            )?;
        }
        if let Some(ctx) = &self.context {
            if let Some(tag) = ctx.tag.as_deref() {
                write!(f, " [tag={}]", tag)?;
            }
            if let Some(expected) = ctx.expected_tag.as_deref() {
                write!(f, " [expected_tag={}]", expected)?;
            }
            if let Some(source) = ctx.source.as_deref() {
                write!(f, " [source={}]", source)?;
            }
            if let Some(token_offset) = ctx.token_offset {
                write!(f, " [token_offset={}]", token_offset)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for UntagError {}
