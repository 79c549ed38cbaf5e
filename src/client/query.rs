// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chainable PostgREST query builders.
//!
//! Each builder is a plain value; nothing is sent until `execute()` is
//! awaited. Supported surface:
//! - `select(columns)` with `eq` filters (AND-ed) and `order`
//! - `insert(data)` returning the raw body, all rows, or a single row
//! - `update(data)` which must be narrowed by at least one `eq`

use super::error::{ClientError, ClientResult};
use super::NestboxClient;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

/// Sort direction for [`SelectBuilder::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderOptions {
    pub ascending: bool,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self { ascending: true }
    }
}

impl OrderOptions {
    pub fn ascending() -> Self {
        Self { ascending: true }
    }

    pub fn descending() -> Self {
        Self { ascending: false }
    }
}

/// Query-string state shared by the builders.
#[derive(Debug, Clone, Default)]
struct QueryParams {
    select: Option<String>,
    filters: Vec<(String, String)>,
    orders: Vec<String>,
}

impl QueryParams {
    fn push_eq(&mut self, column: &str, value: impl Display) {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
    }

    fn push_order(&mut self, column: &str, options: OrderOptions) {
        let direction = if options.ascending { "asc" } else { "desc" };
        self.orders.push(format!("{}.{}", column, direction));
    }

    /// `select=…`, then filters in call order, then order terms.
    fn to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.filters.len() + self.orders.len());

        if let Some(columns) = &self.select {
            parts.push(format!("select={}", urlencoding::encode(columns)));
        }
        for (column, value) in &self.filters {
            parts.push(format!(
                "{}={}",
                urlencoding::encode(column),
                urlencoding::encode(value)
            ));
        }
        for order in &self.orders {
            parts.push(format!("order={}", urlencoding::encode(order)));
        }

        parts.join("&")
    }
}

fn decode_rows<T: DeserializeOwned>(body: Value) -> ClientResult<Vec<T>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(body).map_err(ClientError::decode),
        // A single object comes back for some RPC-style responses
        other => Ok(vec![serde_json::from_value(other).map_err(ClientError::decode)?]),
    }
}

fn to_body<T: Serialize + ?Sized>(data: &T) -> ClientResult<Value> {
    serde_json::to_value(data).map_err(ClientError::decode)
}

/// Entry point returned by [`NestboxClient::from`].
#[derive(Clone)]
pub struct QueryBuilder {
    client: NestboxClient,
    table: String,
}

impl QueryBuilder {
    pub(crate) fn new(client: NestboxClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }

    /// Start a read of `columns` (use `"*"` for all columns).
    pub fn select(self, columns: &str) -> SelectBuilder {
        SelectBuilder {
            client: self.client,
            table: self.table,
            params: QueryParams {
                select: Some(columns.to_string()),
                ..Default::default()
            },
        }
    }

    /// Start an insert of one row or an array of rows.
    pub fn insert<T: Serialize + ?Sized>(self, data: &T) -> InsertBuilder {
        InsertBuilder {
            client: self.client,
            table: self.table,
            body: to_body(data),
        }
    }

    /// Start a partial update. Must be narrowed with `eq` before executing.
    pub fn update<T: Serialize + ?Sized>(self, data: &T) -> UpdateBuilder {
        UpdateBuilder {
            client: self.client,
            table: self.table,
            body: to_body(data),
        }
    }
}

// ─── Select ──────────────────────────────────────────────────

/// GET request under construction.
#[derive(Clone)]
pub struct SelectBuilder {
    client: NestboxClient,
    table: String,
    params: QueryParams,
}

impl SelectBuilder {
    /// Keep rows where `column` equals `value`. Repeated calls AND together.
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push_eq(column, value);
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, options: OrderOptions) -> Self {
        self.params.push_order(column, options);
        self
    }

    /// Encoded query string this builder will send.
    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Perform the GET and decode every row.
    pub async fn execute<T: DeserializeOwned>(self) -> ClientResult<Vec<T>> {
        let body = self
            .client
            .send_rest(Method::GET, &self.table, &self.query_string(), None, false)
            .await?;
        decode_rows(body)
    }
}

// ─── Insert ──────────────────────────────────────────────────

/// POST request under construction.
pub struct InsertBuilder {
    client: NestboxClient,
    table: String,
    body: ClientResult<Value>,
}

impl InsertBuilder {
    /// Ask for the inserted rows back.
    pub fn select(self) -> InsertSelectBuilder {
        InsertSelectBuilder { insert: self }
    }

    /// Perform the POST and return the raw decoded body.
    pub async fn execute(self) -> ClientResult<Value> {
        self.send("").await
    }

    async fn send(self, query: &str) -> ClientResult<Value> {
        let body = self.body?;
        self.client
            .send_rest(Method::POST, &self.table, query, Some(&body), true)
            .await
    }
}

/// Insert that returns the inserted rows.
pub struct InsertSelectBuilder {
    insert: InsertBuilder,
}

impl InsertSelectBuilder {
    /// Expect exactly one row back.
    pub fn single(self) -> InsertSingleBuilder {
        InsertSingleBuilder { insert: self.insert }
    }

    pub async fn execute<T: DeserializeOwned>(self) -> ClientResult<Vec<T>> {
        let body = self.insert.send("select=%2A").await?;
        decode_rows(body)
    }
}

/// Insert that returns the first inserted row.
pub struct InsertSingleBuilder {
    insert: InsertBuilder,
}

impl InsertSingleBuilder {
    pub async fn execute<T: DeserializeOwned>(self) -> ClientResult<T> {
        let body = self.insert.send("select=%2A").await?;
        decode_rows(body)?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::decode("expected a single row, got none"))
    }
}

// ─── Update ──────────────────────────────────────────────────

/// PATCH request without a filter yet. Only `eq` is available.
pub struct UpdateBuilder {
    client: NestboxClient,
    table: String,
    body: ClientResult<Value>,
}

impl UpdateBuilder {
    pub fn eq(self, column: &str, value: impl Display) -> FilteredUpdateBuilder {
        let mut params = QueryParams::default();
        params.push_eq(column, value);
        FilteredUpdateBuilder {
            client: self.client,
            table: self.table,
            body: self.body,
            params,
        }
    }
}

/// PATCH request narrowed by one or more `eq` filters.
pub struct FilteredUpdateBuilder {
    client: NestboxClient,
    table: String,
    body: ClientResult<Value>,
    params: QueryParams,
}

impl FilteredUpdateBuilder {
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push_eq(column, value);
        self
    }

    /// Ask for the updated rows back.
    pub fn select(mut self) -> UpdateSelectBuilder {
        self.params.select = Some("*".to_string());
        UpdateSelectBuilder { update: self }
    }

    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }

    /// Perform the PATCH and return the raw decoded body.
    pub async fn execute(self) -> ClientResult<Value> {
        self.send(false).await
    }

    async fn send(self, representation: bool) -> ClientResult<Value> {
        let query = self.query_string();
        let body = self.body?;
        self.client
            .send_rest(
                Method::PATCH,
                &self.table,
                &query,
                Some(&body),
                representation,
            )
            .await
    }
}

/// Update that returns the updated rows.
pub struct UpdateSelectBuilder {
    update: FilteredUpdateBuilder,
}

impl UpdateSelectBuilder {
    pub async fn execute<T: DeserializeOwned>(self) -> ClientResult<Vec<T>> {
        let body = self.update.send(true).await?;
        decode_rows(body)
    }
}
