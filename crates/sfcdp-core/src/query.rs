// ── Paginated query execution ──
//
// A query is a sequence of `POST /api/v1/query` calls with a fixed page
// size and an offset that advances by that size, until the server marks
// a page `done`. Pages are yielded as they arrive so callers can render
// incrementally; a failed page ends the stream after the pages before it.

use std::pin::pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::Value;
use sfcdp_api::{DataCloudClient, QueryRequest};
use tracing::{debug, info};

use crate::columns::{OrderedColumn, ordered_columns};
use crate::error::CoreError;

/// Rows requested per page.
pub const QUERY_PAGE_SIZE: u64 = 50_000;

/// One page of results with its columns already ordered.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPage {
    /// Zero-based page number.
    pub index: usize,
    /// Offset this page was requested at.
    pub offset: u64,
    pub columns: Vec<OrderedColumn>,
    pub rows: Vec<Value>,
    pub done: bool,
}

/// Drives the pagination loop for a single SQL statement.
pub struct QueryRunner<'a> {
    client: &'a DataCloudClient,
    sql: String,
}

impl<'a> QueryRunner<'a> {
    pub fn new(client: &'a DataCloudClient, sql: impl Into<String>) -> Self {
        Self {
            client,
            sql: sql.into(),
        }
    }

    /// Lazily fetch pages in order.
    ///
    /// Page `n` is requested at offset `n * QUERY_PAGE_SIZE`. Nothing is
    /// fetched until the stream is polled, and no request is issued after
    /// a page reports `done` or an error is yielded.
    pub fn into_stream(self) -> impl Stream<Item = Result<QueryPage, CoreError>> + 'a {
        let Self { client, sql } = self;
        try_stream! {
            let mut offset = 0_u64;
            let mut index = 0_usize;
            loop {
                let request = QueryRequest {
                    sql: sql.clone(),
                    limit: QUERY_PAGE_SIZE,
                    offset,
                };
                debug!(index, offset, "fetching query page");
                let response = client.query_page(&request).await.map_err(CoreError::from)?;

                let page = QueryPage {
                    index,
                    offset,
                    columns: ordered_columns(&response.metadata),
                    rows: response.data,
                    done: response.done,
                };
                debug!(index, rows = page.rows.len(), done = page.done, "received query page");
                let done = page.done;
                yield page;

                if done {
                    break;
                }
                offset += QUERY_PAGE_SIZE;
                index += 1;
            }
        }
    }
}

/// All pages of a query folded together.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    /// Columns of the first page that declared any.
    pub columns: Vec<OrderedColumn>,
    pub rows: Vec<Value>,
    pub pages: usize,
    pub done: bool,
}

impl QueryResult {
    pub fn push(&mut self, page: QueryPage) {
        if self.columns.is_empty() {
            self.columns = page.columns;
        }
        self.rows.extend(page.rows);
        self.pages += 1;
        self.done = page.done;
    }

    /// Drain a page stream. The first error aborts collection.
    pub async fn collect<S>(stream: S) -> Result<Self, CoreError>
    where
        S: Stream<Item = Result<QueryPage, CoreError>>,
    {
        let mut stream = pin!(stream);
        let mut result = Self::default();
        while let Some(page) = stream.next().await {
            result.push(page?);
        }
        info!(pages = result.pages, rows = result.rows.len(), "query complete");
        Ok(result)
    }
}
