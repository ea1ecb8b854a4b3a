//! Sequential cursor pagination over a delta source.

use crate::error::{EngineError, Result};
use async_trait::async_trait;
use sheetlog_types::{Delta, DeltaPage};
use std::collections::VecDeque;

/// A paged source of delta history.
///
/// The real implementation is the HTTP client; tests supply an in-memory
/// source. `cursor` of `None` requests the first page.
#[async_trait]
pub trait DeltaSource {
    async fn delta_page(&self, cursor: Option<&str>) -> Result<DeltaPage>;
}

/// Pull-based iterator over all deltas of a sheet, in page order.
///
/// Pages are fetched strictly sequentially: the next page is requested
/// only after every delta of the current page has been handed to the
/// consumer. The aggregation rules downstream rely on that ordering, so
/// there is deliberately no prefetch. A pager is one-shot; it cannot be
/// restarted after exhaustion.
pub struct DeltaPager<'a, S: DeltaSource> {
    source: &'a S,
    cursor: Option<String>,
    buffered: VecDeque<Delta>,
    exhausted: bool,
}

impl<'a, S: DeltaSource> DeltaPager<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            cursor: None,
            buffered: VecDeque::new(),
            exhausted: false,
        }
    }

    /// The next delta, or `None` once the final page is drained.
    ///
    /// A source error aborts the stream and leaves the pager exhausted.
    pub async fn next_delta(&mut self) -> Result<Option<Delta>> {
        loop {
            if let Some(delta) = self.buffered.pop_front() {
                return Ok(Some(delta));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = match self.source.delta_page(self.cursor.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            };
            tracing::debug!(deltas = page.results.len(), "fetched delta page");

            self.buffered.extend(page.results);
            match page.next_page_token {
                Some(next) => self.cursor = Some(next),
                None => self.exhausted = true,
            }
            // An empty non-terminal page loops straight into the next fetch.
        }
    }
}
