//! Query-string parameters.
//!
//! Parsed by hand from the raw query so that repeated `where` entries are all kept.

use proplayer_core::{
    error::{ProplayerError, ProplayerResult},
    query::ListQuery,
};
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub filters: Vec<String>,
}

impl RequestParams {
    /// Reads the parameters from a raw query string. For single-valued
    /// parameters the first occurrence wins; empty values count as absent.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let value = value.into_owned();
            let slot = match key.as_ref() {
                "where" => {
                    params.filters.push(value);
                    continue;
                }
                "access_token" => &mut params.access_token,
                "user_id" => &mut params.user_id,
                "limit" => &mut params.limit,
                "sort" => &mut params.sort,
                "start" => &mut params.start,
                "end" => &mut params.end,
                _ => continue,
            };

            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
            }
        }

        params
    }

    /// Builds the list query.
    ///
    /// # Errors
    ///
    /// Returns [`ProplayerError::Query`] if `limit` is not a non-negative integer or a
    /// `where` entry is not exactly `key=value`.
    pub fn list_query(&self) -> ProplayerResult<ListQuery> {
        let mut builder = ListQuery::builder();

        if let Some(limit) = &self.limit {
            let limit = limit
                .parse::<usize>()
                .map_err(|e| ProplayerError::Query(format!("invalid limit `{limit}`: {e}")))?;
            // zero means no limit
            if limit > 0 {
                builder = builder.limit(limit);
            }
        }
        if let Some(sort) = &self.sort {
            builder = builder.sort(sort.clone());
        }
        if let Some(start) = &self.start {
            builder = builder.start(start.clone());
        }
        if let Some(end) = &self.end {
            builder = builder.end(end.clone());
        }

        for filter in &self.filters {
            let mut parts = filter.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(field), Some(value), None) => builder = builder.filter(field, value),
                _ => {
                    return Err(ProplayerError::Query(format!(
                        "invalid filter `{filter}`, expected key=value"
                    )));
                }
            }
        }

        Ok(builder.build())
    }
}
