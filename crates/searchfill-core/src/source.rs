use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::field::FetchRequest;

/// Transport that answers suggestion queries with a parsed JSON body.
///
/// Implementations map any non-success outcome (connection failure,
/// error status, unparseable body) to an error; the field decides what an
/// error means for its suggestions.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value>;
}
