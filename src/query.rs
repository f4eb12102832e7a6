use std::sync::Arc;

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use url::form_urlencoded;

use crate::host::UrlBar;

pub const PARAM_TOKEN: &str = "token";
pub const PARAM_LAT: &str = "lat";
pub const PARAM_LON: &str = "lon";
pub const PARAM_ZOOM: &str = "z";

/// Typed parser for a single query parameter.
pub trait ParamValue: Sized {
    fn parse_param(raw: &str) -> Option<Self>;
    fn to_param(&self) -> String;
}

macro_rules! numeric_param {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn parse_param(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }

                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_param!(u8, u16, u32, u64, i32, i64);

impl ParamValue for f64 {
    fn parse_param(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn to_param(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for bool {
    fn parse_param(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" | "true" | "TRUE" | "True" => Some(true),
            "0" | "false" | "FALSE" | "False" => Some(false),
            _ => None,
        }
    }

    fn to_param(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for String {
    fn parse_param(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_param(&self) -> String {
        self.clone()
    }
}

/// Ordered query pairs, equivalent to a `URLSearchParams`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(search: &str) -> Self {
        let query = search.strip_prefix('?').unwrap_or(search);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the first occurrence in place and drops any later ones, or
    /// appends when absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == name) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = 0;
                self.pairs.retain(|(k, _)| {
                    if k != name {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encoded form without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// The page query string, kept in sync with the URL bar.
pub struct QueryParamStore {
    url_bar: Arc<dyn UrlBar>,
    params: RwLock<QueryParams>,
}

impl QueryParamStore {
    pub fn new(url_bar: Arc<dyn UrlBar>) -> Self {
        let params = QueryParams::parse(&url_bar.search());
        Self {
            url_bar,
            params: RwLock::new(params),
        }
    }

    /// Re-reads the query string from the URL bar.
    pub fn reset(&self) {
        *self.params.write() = QueryParams::parse(&self.url_bar.search());
    }

    pub fn get<T: ParamValue>(&self, name: &str, default: T) -> T {
        self.params
            .read()
            .get(name)
            .and_then(T::parse_param)
            .unwrap_or(default)
    }

    pub fn raw(&self, name: &str) -> Option<String> {
        self.params.read().get(name).map(str::to_string)
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.raw(PARAM_TOKEN)
            .filter(|value| !value.is_empty())
            .map(SessionToken::new)
    }

    pub fn snapshot(&self) -> QueryParams {
        self.params.read().clone()
    }

    pub fn set<I, K, V>(&self, updates: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        // held across the merge and the URL write so concurrent updates stack
        let mut params = self.params.write();
        let mut merged = params.clone();
        for (key, value) in updates {
            merged.set(key.as_ref(), value);
        }
        self.url_bar
            .replace_search(&format!("?{}", merged.to_query_string()));
        *params = QueryParams::parse(&self.url_bar.search());
    }

    pub fn url_bar(&self) -> &Arc<dyn UrlBar> {
        &self.url_bar
    }
}

/// Opaque session token handed out by the token exchange redirect.
#[derive(Debug)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SessionToken {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}
