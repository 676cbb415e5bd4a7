//! Resource addresses: `/{kind}` for a collection, `/{kind}/{id}` for one entity.

use percent_encoding::percent_decode_str;
use proplayer_core::error::{ProplayerError, ProplayerResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourcePath {
    Collection { kind: String },
    Entity { kind: String, id: i64 },
}

impl ResourcePath {
    /// Parses a request path.
    ///
    /// Segments are percent-decoded after splitting, so an encoded `/` stays part of
    /// the kind. An id of `0` addresses the collection; no backend ever allocates it.
    ///
    /// # Errors
    ///
    /// Returns [`ProplayerError::Path`] for `/`, an empty kind, more than two segments,
    /// an id that is not a base-10 `i64`, or a segment that does not decode to UTF-8.
    pub fn parse(path: &str) -> ProplayerResult<Self> {
        let rest = match path.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => return Err(ProplayerError::Path(format!("invalid path `{path}`"))),
        };

        let mut segments = rest.split('/');
        let kind = decode_segment(segments.next().unwrap_or_default())?;
        let id = segments.next().map(decode_segment).transpose()?;

        if segments.next().is_some() {
            return Err(ProplayerError::Path(format!("too many segments in `{path}`")));
        }
        if kind.is_empty() {
            return Err(ProplayerError::Path(format!("empty kind in `{path}`")));
        }

        let Some(id) = id else {
            return Ok(ResourcePath::Collection { kind });
        };

        match id.parse::<i64>() {
            Ok(0) => Ok(ResourcePath::Collection { kind }),
            Ok(id) => Ok(ResourcePath::Entity { kind, id }),
            Err(e) => Err(ProplayerError::Path(format!("invalid id `{id}`: {e}"))),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            ResourcePath::Collection { kind } | ResourcePath::Entity { kind, .. } => kind,
        }
    }
}

fn decode_segment(segment: &str) -> ProplayerResult<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ProplayerError::Path(format!("invalid encoding in `{segment}`: {e}")))
}
