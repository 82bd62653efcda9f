//! Text search resolution.
//!
//! A text search predicate cannot be evaluated by the storage engine. It is
//! sent to the search engine as a pattern query, and the matched values are
//! turned back into plain equality filters on the same property.

use fulltext_repository::SearchAdapter;
use fulltext_shared::{QueryResult, Value};
use tracing::{debug, error, instrument, warn};

use crate::errors::RewriteError;
use crate::expression::{Expression, TextSearchExpression};

/// Attempts per text search when not configured.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Configuration for text search resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriterConfig {
    /// Attempts per search, including the first. 0 is treated as 1.
    pub retry_count: u32,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }
}

impl RewriterConfig {
    pub fn with_retry_count(retry_count: u32) -> Self {
        Self { retry_count }
    }

    fn attempts(&self) -> u32 {
        self.retry_count.max(1)
    }
}

fn expect_text_search(expr: &Expression) -> Result<&TextSearchExpression, RewriteError> {
    expr.as_text_search()
        .ok_or_else(|| RewriteError::NotTextSearch(expr.to_string()))
}

/// Run the pattern query of a text search predicate against `index`.
///
/// Retries immediately on any failure, up to the configured number of
/// attempts, and returns the last failure once they are used up.
pub async fn text_search(
    expr: &Expression,
    index: &str,
    adapter: &SearchAdapter,
    config: &RewriterConfig,
) -> Result<QueryResult, RewriteError> {
    let ts = expect_text_search(expr)?;
    search_with_retry(ts, index, adapter, config).await
}

#[instrument(skip(ts, adapter, config), fields(kind = %ts.kind))]
async fn search_with_retry(
    ts: &TextSearchExpression,
    index: &str,
    adapter: &SearchAdapter,
    config: &RewriterConfig,
) -> Result<QueryResult, RewriteError> {
    let attempts = config.attempts();
    let mut attempt = 1;
    loop {
        match adapter.pattern_query(ts.kind, index, &ts.arg.val).await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < attempts => {
                warn!(
                    attempt = attempt,
                    attempts = attempts,
                    error = %e,
                    "Text search failed, retrying"
                );
                attempt += 1;
            }
            Err(e) => {
                error!(attempts = attempts, error = %e, "Text search failed");
                return Err(e.into());
            }
        }
    }
}

/// Replace a text search predicate with equalities on the matched values.
///
/// # Returns
///
/// * `Ok(None)` - Nothing matched; the predicate is always false
/// * `Ok(Some(expr))` - `p == v` for one match, `(p == v1) OR (p == v2) ...` otherwise
/// * `Err(RewriteError)` - Not a text search predicate, or the search failed
pub async fn rewrite_text_search_filter(
    expr: &Expression,
    is_edge: bool,
    index: &str,
    adapter: &SearchAdapter,
    config: &RewriterConfig,
) -> Result<Option<Expression>, RewriteError> {
    let ts = expect_text_search(expr)?;
    let result = search_with_retry(ts, index, adapter, config).await?;
    if result.is_empty() {
        debug!(index = %index, "Text search matched nothing");
        return Ok(None);
    }

    let prop = if is_edge {
        Expression::edge_prop(&ts.arg.from, &ts.arg.prop)
    } else {
        Expression::tag_prop(&ts.arg.from, &ts.arg.prop)
    };

    let mut equalities: Vec<Expression> = result
        .items
        .into_iter()
        .map(|item| Expression::eq(prop.clone(), Expression::Constant(Value::String(item.text))))
        .collect();

    debug!(index = %index, matches = equalities.len(), "Rewrote text search");
    if equalities.len() == 1 {
        return Ok(equalities.pop());
    }
    Ok(Some(Expression::or(equalities)))
}
