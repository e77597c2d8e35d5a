//! Pagination cursors
//!
//! A cursor names the last record of the previous page by its sort key and
//! id, plus the signature of the request that produced it. It is encoded as
//! URL-safe base64 of a small JSON body, so it does not depend on any store
//! client's native snapshot handle.
//!
//! A cursor is only valid for a request with the same signature; changing
//! the term, locale, equality filters, range or sort changes the signature.
//!
//! JSON has no NaN or infinity, so a non-finite float sort key travels as
//! its text form in a separate `float` field next to a null `sort_value`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use recdex_core::{Document, OrderBy, RecdexError, RecdexResult, RecordId, StartAfter, Value};

/// Fingerprint of a request's term, locale, filters and sort
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(String);

impl Signature {
    /// SHA-256 of `bytes`, truncated to 128 bits, hex encoded
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let hex = digest[..16]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        Signature(hex)
    }

    /// Hex form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Continuation token for `load_more`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Signature of the request the cursor belongs to
    pub signature: Signature,
    /// Sort key of the last record returned by the store
    pub sort_value: Value,
    /// Id of that record
    pub id: RecordId,
}

/// Token body
#[derive(Serialize, Deserialize)]
struct CursorBody {
    signature: Signature,
    sort_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    float: Option<String>,
    id: RecordId,
}

impl Cursor {
    /// Cursor positioned after `doc` under `order_by`
    pub fn after(doc: &Document, order_by: &OrderBy, signature: Signature) -> Self {
        Cursor {
            signature,
            sort_value: order_by.sort_value(doc),
            id: doc.id.clone(),
        }
    }

    /// Store-level resume position
    pub fn start_after(&self) -> StartAfter {
        StartAfter {
            sort_value: self.sort_value.clone(),
            id: self.id.clone(),
        }
    }

    /// Fail with `CursorMismatch` unless the cursor belongs to `signature`
    pub fn ensure_matches(&self, signature: &Signature) -> RecdexResult<()> {
        if &self.signature != signature {
            return Err(RecdexError::CursorMismatch {
                cursor: self.signature.to_string(),
                query: signature.to_string(),
            });
        }
        Ok(())
    }

    /// Opaque token form
    pub fn encode(&self) -> RecdexResult<String> {
        let (sort_value, float) = match &self.sort_value {
            Value::Float(f) if !f.is_finite() => (Value::Null, Some(f.to_string())),
            other => (other.clone(), None),
        };
        let body = serde_json::to_vec(&CursorBody {
            signature: self.signature.clone(),
            sort_value,
            float,
            id: self.id.clone(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(body))
    }

    /// Parse a token produced by [`encode`](Self::encode)
    pub fn decode(token: &str) -> RecdexResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| RecdexError::invalid_cursor(format!("not base64: {}", e)))?;
        let body: CursorBody = serde_json::from_slice(&bytes)
            .map_err(|e| RecdexError::invalid_cursor(format!("malformed body: {}", e)))?;
        let sort_value = match body.float {
            Some(text) => text
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| RecdexError::invalid_cursor(format!("bad float {:?}: {}", text, e)))?,
            None => body.sort_value,
        };
        Ok(Cursor {
            signature: body.signature,
            sort_value,
            id: body.id,
        })
    }
}
