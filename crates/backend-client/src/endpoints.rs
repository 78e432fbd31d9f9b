//! URL construction for the auth, REST and storage services.

use pp_types::BackendConfig;
use url::Url;

use crate::error::{ClientError, ClientResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// A filtered request against one REST table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    table: String,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            params: Vec::new(),
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.params.push((column.into(), format!("eq.{}", value.as_ref())));
        self
    }

    pub fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<String> = values.into_iter().map(|v| quote_list_value(v.as_ref())).collect();
        self.params.push((column.into(), format!("in.({})", list.join(","))));
        self
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.params.push(("order".into(), format!("{column}.{}", order.as_str())));
        self
    }

    pub fn on_conflict(mut self, column: &str) -> Self {
        self.params.push(("on_conflict".into(), column.into()));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Values containing list syntax are double-quoted.
fn quote_list_value(value: &str) -> String {
    if value.contains([',', '(', ')', '"', '\\', ' ']) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(config: &BackendConfig) -> ClientResult<Self> {
        let base = Url::parse(&format!("{}/", config.url.trim_end_matches('/')))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.url.clone()));
        }
        Ok(Self { base })
    }

    fn at(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn auth(&self, endpoint: &str) -> Url {
        self.at(&["auth", "v1", endpoint])
    }

    pub fn token(&self, grant_type: &str) -> Url {
        let mut url = self.auth("token");
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        url
    }

    pub fn otp(&self, redirect_to: Option<&str>) -> Url {
        let mut url = self.auth("otp");
        if let Some(redirect) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }
        url
    }

    pub fn rest(&self, query: &Query) -> Url {
        let mut url = self.at(&["rest", "v1", query.table_name()]);
        if !query.params().is_empty() {
            url.query_pairs_mut().extend_pairs(query.params());
        }
        url
    }

    /// Upload target. `path` may contain `/` separated folders.
    pub fn object(&self, bucket: &str, path: &str) -> Url {
        let mut segments = vec!["storage", "v1", "object", bucket];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.at(&segments)
    }

    pub fn public_object(&self, bucket: &str, path: &str) -> String {
        let mut segments = vec!["storage", "v1", "object", "public", bucket];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.at(&segments).to_string()
    }
}
