//! The request-shaping values extensions may rewrite.
//!
//! A fresh context is derived from `VoteConfig` before every pipeline run and
//! converted back into `RequestParams` afterwards.

use crate::config::VoteConfig;
use crate::extension::{Context, ContextValue, Headers};

pub const BASE_URL: &str = "base_url";
pub const COUNT_URL: &str = "count_url";
pub const HEADERS: &str = "headers";
pub const METHOD: &str = "method";
pub const DATA: &str = "data";
pub const COOKIES: &str = "cookies";

const COOKIE_HEADER: &str = "Cookie";

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("context is missing `{0}`")]
    Missing(&'static str),
    #[error("context value `{key}` must be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

/// Seeds the context from configuration. The configured `Cookie` header
/// moves into `cookies` so extensions can edit it as a plain string.
pub fn initial(config: &VoteConfig) -> Context {
    let mut headers = config.headers.clone();
    let cookies = headers.remove(COOKIE_HEADER).unwrap_or_default();

    let mut ctx = Context::new();
    ctx.insert(BASE_URL.into(), config.base_url_template.clone().into());
    ctx.insert(COUNT_URL.into(), config.count_url.clone().into());
    ctx.insert(HEADERS.into(), headers.into());
    ctx.insert(METHOD.into(), config.request_method.clone().into());
    ctx.insert(DATA.into(), config.request_data.clone().into());
    ctx.insert(COOKIES.into(), cookies.into());
    ctx
}

/// Request parameters after extensions ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub base_url: String,
    pub count_url: String,
    pub headers: Headers,
    pub method: String,
    pub data: Option<String>,
}

impl RequestParams {
    /// A non-empty `cookies` value becomes the `Cookie` header.
    pub fn from_context(ctx: &Context) -> Result<Self, ContextError> {
        let mut headers = match ctx.get(HEADERS) {
            None | Some(ContextValue::Null) => Headers::new(),
            Some(ContextValue::Headers(h)) => h.clone(),
            Some(_) => {
                return Err(ContextError::WrongType {
                    key: HEADERS,
                    expected: "a header mapping",
                })
            }
        };
        if let Some(cookies) = optional_text(ctx, COOKIES)? {
            if !cookies.is_empty() {
                headers.insert(COOKIE_HEADER.to_string(), cookies);
            }
        }
        Ok(Self {
            base_url: text(ctx, BASE_URL)?,
            count_url: text(ctx, COUNT_URL)?,
            headers,
            method: text(ctx, METHOD)?.trim().to_ascii_uppercase(),
            data: optional_text(ctx, DATA)?,
        })
    }
}

fn text(ctx: &Context, key: &'static str) -> Result<String, ContextError> {
    optional_text(ctx, key)?.ok_or(ContextError::Missing(key))
}

fn optional_text(ctx: &Context, key: &'static str) -> Result<Option<String>, ContextError> {
    match ctx.get(key) {
        None | Some(ContextValue::Null) => Ok(None),
        Some(ContextValue::Text(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ContextError::WrongType {
            key,
            expected: "text",
        }),
    }
}
