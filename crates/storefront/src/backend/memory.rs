//! In-memory backend for tests.
//!
//! Evaluates the same [`Query`] structures as the REST backend against plain
//! JSON rows, implements the three remote procedures the application calls,
//! and doubles as an [`AuthApi`]. Every call is recorded so tests can assert
//! on how many remote round trips an operation made.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use techspec_core::UserId;

use super::auth::{AuthApi, AuthError, AuthSession, AuthUser, OtpType, SignUpOutcome};
use super::query::{Direction, Filter, Query};
use super::{Backend, BackendError};

/// Kind of recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Select,
    Insert,
    Update,
    Upsert,
    Rpc,
    Auth,
}

/// One recorded call: the operation and its table, procedure or auth action.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: Op,
    pub target: String,
    pub payload: Value,
}

type DelayFn = Arc<dyn Fn(&Query) -> Option<Duration> + Send + Sync>;

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    unique: Vec<(String, String)>,
    calls: Vec<Call>,
    failing_rpcs: HashSet<String>,
    failing_tables: HashSet<String>,
    reject_json_filters: bool,
    select_delay: Option<DelayFn>,
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, UserId>,
    otps: HashMap<String, String>,
    recoveries: Vec<(String, String)>,
}

struct Account {
    password: String,
    user: AuthUser,
}

/// Shared in-memory store. Clones (and access-token handles) share state.
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Empty store with unique slugs on `products`, `categories` and `shops`.
    #[must_use]
    pub fn new() -> Self {
        let state = State {
            unique: vec![
                ("products".into(), "slug".into()),
                ("categories".into(), "slug".into()),
                ("shops".into(), "slug".into()),
            ],
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append rows to a table as-is (no defaults, no call recorded).
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.state()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Current rows of a table.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Number of calls of `op` against `target`.
    #[must_use]
    pub fn count(&self, op: Op, target: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.op == op && c.target == target)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Make every call of the procedure fail with a server error.
    pub fn fail_rpc(&self, function: &str) {
        self.state().failing_rpcs.insert(function.to_string());
    }

    /// Make every row operation on the table fail with a server error.
    pub fn fail_table(&self, table: &str) {
        self.state().failing_tables.insert(table.to_string());
    }

    /// Refuse selects that filter inside JSON columns, the way a backend
    /// without JSON operators on that column would.
    pub fn reject_json_filters(&self) {
        self.state().reject_json_filters = true;
    }

    /// Delay selects by the duration the function returns for each query.
    pub fn set_select_delay<F>(&self, delay: F)
    where
        F: Fn(&Query) -> Option<Duration> + Send + Sync + 'static,
    {
        self.state().select_delay = Some(Arc::new(delay));
    }

    /// Register an account and return its user and a live access token.
    pub fn create_user(&self, email: &str, password: &str, full_name: &str) -> (AuthUser, SecretString) {
        let mut state = self.state();
        let user = register(&mut state, email, password, full_name);
        let token = open_session(&mut state, &user);
        (user, SecretString::from(token))
    }

    /// Make `token_hash` verifiable for the account with `email`.
    pub fn issue_otp(&self, token_hash: &str, email: &str) {
        self.state()
            .otps
            .insert(token_hash.to_string(), email.to_string());
    }

    /// `(email, redirect_to)` of every recovery email requested.
    #[must_use]
    pub fn recoveries(&self) -> Vec<(String, String)> {
        self.state().recoveries.clone()
    }

    fn record(&self, op: Op, target: &str, payload: Value) {
        self.state().calls.push(Call {
            op,
            target: target.to_string(),
            payload,
        });
    }
}

fn server_error(what: &str) -> BackendError {
    BackendError::Api {
        status: 500,
        message: format!("{what} failed"),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.record(Op::Select, query.table_name(), Value::Null);

        let delay = self
            .state()
            .select_delay
            .clone()
            .and_then(|delay| delay(query));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        if state.failing_tables.contains(query.table_name()) {
            return Err(server_error(query.table_name()));
        }
        if state.reject_json_filters && query.filters().iter().any(Filter::uses_json_path) {
            return Err(BackendError::Rejected {
                status: 400,
                code: Some("42883".into()),
                message: "operator does not exist: jsonb ~~* unknown".into(),
            });
        }

        let mut rows: Vec<Value> = state
            .tables
            .get(query.table_name())
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters().iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for order in query.ordering().iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }

        Ok(rows
            .iter()
            .map(|row| project(&state, row, query.projection()))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, BackendError> {
        self.record(Op::Insert, table, rows.clone());
        let mut state = self.state();
        if state.failing_tables.contains(table) {
            return Err(server_error(table));
        }

        let rows = match rows {
            Value::Array(rows) => rows,
            other => vec![other],
        };
        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let row = with_defaults(row);
            check_unique(&state, table, &row)?;
            state
                .tables
                .entry(table.to_string())
                .or_default()
                .push(row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        self.record(Op::Update, query.table_name(), patch.clone());
        let mut state = self.state();
        if state.failing_tables.contains(query.table_name()) {
            return Err(server_error(query.table_name()));
        }

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(query.table_name()) {
            for row in rows
                .iter_mut()
                .filter(|row| query.filters().iter().all(|f| matches(row, f)))
            {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<Vec<Value>, BackendError> {
        self.record(Op::Upsert, table, row.clone());
        let mut state = self.state();
        if state.failing_tables.contains(table) {
            return Err(server_error(table));
        }

        let keys: Vec<&str> = on_conflict.split(',').map(str::trim).collect();
        let rows = state.tables.entry(table.to_string()).or_default();
        let existing = rows.iter_mut().find(|existing| {
            keys.iter()
                .all(|key| text(existing.get(*key)) == text(row.get(*key)))
        });

        if let Some(existing) = existing {
            merge(existing, &row);
            return Ok(vec![existing.clone()]);
        }
        let row = with_defaults(row);
        rows.push(row.clone());
        Ok(vec![row])
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError> {
        self.record(Op::Rpc, function, args.clone());
        let mut state = self.state();
        if state.failing_rpcs.contains(function) {
            return Err(server_error(function));
        }

        match function {
            "get_platform_stats" => {
                let count = |table: &str| state.tables.get(table).map_or(0, Vec::len);
                let sessions: HashSet<String> = state
                    .tables
                    .get("visitor_analytics")
                    .into_iter()
                    .flatten()
                    .filter_map(|row| text(row.get("session_id")))
                    .collect();
                Ok(json!({
                    "total_visitors": sessions.len(),
                    "total_products": count("products"),
                    "total_shops": count("shops"),
                    "total_reviews": count("reviews"),
                    "total_users": count("profiles"),
                }))
            }
            "record_visit" => {
                let row = with_defaults(json!({
                    "session_id": args.get("p_session_id"),
                    "user_agent": args.get("p_user_agent"),
                    "user_id": args.get("p_user_id"),
                }));
                state
                    .tables
                    .entry("visitor_analytics".into())
                    .or_default()
                    .push(row);
                Ok(Value::Null)
            }
            "update_review_helpful_count" => {
                let review_id = text(args.get("review_id"));
                let helpful = state
                    .tables
                    .get("review_votes")
                    .into_iter()
                    .flatten()
                    .filter(|vote| text(vote.get("review_id")) == review_id)
                    .filter(|vote| vote.get("is_helpful") == Some(&Value::Bool(true)))
                    .count();
                if let Some(reviews) = state.tables.get_mut("reviews") {
                    for review in reviews
                        .iter_mut()
                        .filter(|r| text(r.get("id")) == review_id)
                    {
                        merge(review, &json!({ "helpful_count": helpful }));
                    }
                }
                Ok(Value::Null)
            }
            other => Err(BackendError::Rejected {
                status: 404,
                code: Some("PGRST202".into()),
                message: format!("Could not find the function public.{other}"),
            }),
        }
    }

    fn with_access_token(&self, _access_token: &SecretString) -> Arc<dyn Backend> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl AuthApi for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        self.record(Op::Auth, "signup", json!({ "email": email }));
        let mut state = self.state();
        if state.accounts.contains_key(email) {
            return Err(rejected(422, "User already registered"));
        }
        let user = register(&mut state, email, password, full_name);
        let token = open_session(&mut state, &user);
        Ok(SignUpOutcome {
            user: user.clone(),
            session: Some(session(token, user)),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.record(Op::Auth, "signin", json!({ "email": email }));
        let mut state = self.state();
        let user = state
            .accounts
            .get(email)
            .filter(|account| account.password == password)
            .map(|account| account.user.clone())
            .ok_or_else(|| rejected(400, "Invalid login credentials"))?;
        let token = open_session(&mut state, &user);
        Ok(session(token, user))
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError> {
        self.record(Op::Auth, "signout", Value::Null);
        self.state().sessions.remove(access_token.expose_secret());
        Ok(())
    }

    async fn recover(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.record(Op::Auth, "recover", json!({ "email": email }));
        self.state()
            .recoveries
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: &SecretString,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        self.record(Op::Auth, "password", Value::Null);
        let mut state = self.state();
        let user_id = user_for_token(&state, access_token)?;
        let account = state
            .accounts
            .values_mut()
            .find(|account| account.user.id == user_id)
            .ok_or_else(|| rejected(404, "User not found"))?;
        account.password = password.to_string();
        Ok(account.user.clone())
    }

    async fn verify_otp(
        &self,
        token_hash: &str,
        kind: OtpType,
    ) -> Result<AuthSession, AuthError> {
        self.record(Op::Auth, "verify", json!({ "type": kind }));
        let mut state = self.state();
        let user = state
            .otps
            .remove(token_hash)
            .and_then(|email| state.accounts.get(&email).map(|a| a.user.clone()))
            .ok_or_else(|| rejected(403, "Token has expired or is invalid"))?;
        let token = open_session(&mut state, &user);
        Ok(session(token, user))
    }

    async fn get_user(&self, access_token: &SecretString) -> Result<AuthUser, AuthError> {
        let state = self.state();
        let user_id = user_for_token(&state, access_token)?;
        state
            .accounts
            .values()
            .find(|account| account.user.id == user_id)
            .map(|account| account.user.clone())
            .ok_or_else(|| rejected(404, "User not found"))
    }
}

fn rejected(status: u16, message: &str) -> AuthError {
    AuthError::Rejected {
        status,
        message: message.to_string(),
    }
}

fn session(access_token: String, user: AuthUser) -> AuthSession {
    AuthSession {
        access_token,
        refresh_token: None,
        expires_in: Some(3600),
        user,
    }
}

/// Create the account and its profile row (the hosted store does this with
/// a trigger).
fn register(state: &mut State, email: &str, password: &str, full_name: &str) -> AuthUser {
    let user = AuthUser {
        id: UserId::random(),
        email: Some(email.to_string()),
        user_metadata: json!({ "full_name": full_name }),
    };
    let now = chrono::Utc::now().to_rfc3339();
    state
        .tables
        .entry("profiles".into())
        .or_default()
        .push(json!({
            "id": user.id,
            "email": email,
            "full_name": full_name,
            "avatar_url": null,
            "bio": null,
            "role": "user",
            "created_at": now,
            "updated_at": now,
        }));
    state.accounts.insert(
        email.to_string(),
        Account {
            password: password.to_string(),
            user: user.clone(),
        },
    );
    user
}

fn open_session(state: &mut State, user: &AuthUser) -> String {
    let token = format!("token-{}", uuid::Uuid::new_v4());
    state.sessions.insert(token.clone(), user.id);
    token
}

fn user_for_token(state: &State, access_token: &SecretString) -> Result<UserId, AuthError> {
    state
        .sessions
        .get(access_token.expose_secret())
        .copied()
        .ok_or_else(|| rejected(401, "invalid JWT"))
}

// =============================================================================
// Row evaluation
// =============================================================================

fn with_defaults(row: Value) -> Value {
    let mut row = match row {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let now = chrono::Utc::now().to_rfc3339();
    row.entry("id")
        .or_insert_with(|| json!(uuid::Uuid::new_v4()));
    row.entry("created_at").or_insert_with(|| json!(now));
    row.entry("updated_at").or_insert_with(|| json!(now));
    Value::Object(row)
}

fn check_unique(state: &State, table: &str, row: &Value) -> Result<(), BackendError> {
    let existing = state.tables.get(table).map(Vec::as_slice).unwrap_or_default();
    for (_, column) in state.unique.iter().filter(|(t, _)| t == table) {
        let value = text(row.get(column));
        if value.is_some() && existing.iter().any(|r| text(r.get(column)) == value) {
            return Err(BackendError::Rejected {
                status: 409,
                code: Some("23505".into()),
                message: format!(
                    "duplicate key value violates unique constraint \"{table}_{column}_key\""
                ),
            });
        }
    }
    Ok(())
}

fn merge(row: &mut Value, patch: &Value) {
    if let (Value::Object(row), Value::Object(patch)) = (row, patch) {
        for (key, value) in patch {
            row.insert(key.clone(), value.clone());
        }
    }
}

/// Text form of a column value as the store compares it. `NULL` is `None`.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn column_text(row: &Value, column: &super::Column) -> Option<String> {
    let value = row.get(column.name());
    match column.json_key() {
        Some(key) => text(value.and_then(|v| v.get(key))),
        None => text(value),
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Or(inner) => inner.iter().any(|f| matches(row, f)),
        Filter::Eq(column, expected) => column_text(row, column).as_ref() == Some(expected),
        Filter::Gte(column, bound) => column_text(row, column)
            .is_some_and(|v| compare_text(&v, bound) != Ordering::Less),
        Filter::Lte(column, bound) => column_text(row, column)
            .is_some_and(|v| compare_text(&v, bound) != Ordering::Greater),
        Filter::ILike(column, pattern) => {
            column_text(row, column).is_some_and(|v| like(&v.to_lowercase(), &pattern.to_lowercase()))
        }
        Filter::In(column, values) => {
            column_text(row, column).is_some_and(|v| values.contains(&v))
        }
    }
}

/// Numbers compare numerically, everything else (ISO dates included) as text.
fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Sort order with `NULL` greater than everything (nulls last ascending).
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (text(a), text(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_text(&a, &b),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Literal(char),
    One,
    Many,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            '%' => Token::Many,
            '_' => Token::One,
            other => Token::Literal(other),
        });
    }
    tokens
}

/// SQL `LIKE` with `\` as the escape character.
#[allow(clippy::indexing_slicing)] // indices bounded by chars.len()
fn like(value: &str, pattern: &str) -> bool {
    let tokens = tokenize(pattern);
    let chars: Vec<char> = value.chars().collect();

    // reachable[j]: the first i tokens can consume exactly j characters
    let mut reachable = vec![false; chars.len() + 1];
    reachable[0] = true;
    for token in &tokens {
        let mut next = vec![false; chars.len() + 1];
        for j in 0..=chars.len() {
            if !reachable[j] {
                continue;
            }
            match token {
                Token::Many => {
                    for slot in next.iter_mut().skip(j) {
                        *slot = true;
                    }
                }
                Token::One => {
                    if j < chars.len() {
                        next[j + 1] = true;
                    }
                }
                Token::Literal(c) => {
                    if chars.get(j) == Some(c) {
                        next[j + 1] = true;
                    }
                }
            }
        }
        reachable = next;
    }
    reachable[chars.len()]
}

// =============================================================================
// Projection and embedding
// =============================================================================

/// Split a select list on top-level commas.
fn split_top_level(select: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in select.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

/// Apply a select list to a row. Embeds are written `alias:table(columns)`
/// and join on the `<alias>_id` column of the row.
fn project(state: &State, row: &Value, select: &str) -> Value {
    let items = split_top_level(select);
    let mut out = Map::new();

    for item in &items {
        if item == "*" {
            if let Value::Object(map) = row {
                out.extend(map.clone());
            }
            continue;
        }
        let Some(open) = item.find('(') else {
            if let Some(value) = row.get(item.as_str()) {
                out.insert(item.clone(), value.clone());
            }
            continue;
        };
        let (head, rest) = item.split_at(open);
        let columns = rest.trim_start_matches('(').trim_end_matches(')');
        let (alias, table) = head.split_once(':').unwrap_or((head, head));
        let foreign_key = text(row.get(format!("{alias}_id").as_str()));
        let embedded = foreign_key
            .and_then(|id| {
                state
                    .tables
                    .get(table)?
                    .iter()
                    .find(|r| text(r.get("id")).as_ref() == Some(&id))
                    .cloned()
            })
            .map_or(Value::Null, |r| project(state, &r, columns));
        out.insert(alias.to_string(), embedded);
    }

    Value::Object(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::backend::query::{Column, contains_pattern};

    #[test]
    fn test_like_wildcards_and_escapes() {
        assert!(like("galaxy s24", "%s24%"));
        assert!(like("abc", "a_c"));
        assert!(!like("abc", "a_"));
        assert!(like("100% cotton", &contains_pattern("100%")));
        assert!(!like("1000 cotton", &contains_pattern("100%")));
        assert!(!like("axb", &contains_pattern("a_b")));
        assert!(like("a_b", &contains_pattern("a_b")));
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_embeds() {
        let backend = MemoryBackend::new();
        backend.seed(
            "categories",
            vec![json!({"id": "c1", "name": "Phones", "slug": "phones"})],
        );
        backend.seed(
            "products",
            vec![
                json!({"id": "p1", "name": "A", "price": 100, "category_id": "c1", "created_at": "2024-01-01"}),
                json!({"id": "p2", "name": "B", "price": 300, "category_id": null, "created_at": "2024-02-01"}),
                json!({"id": "p3", "name": "C", "price": null, "category_id": "c1", "created_at": "2024-03-01"}),
            ],
        );

        let query = Query::table("products")
            .select("*, category:categories(name)")
            .filter(Filter::Gte(Column::new("price"), "50".into()))
            .order("created_at", Direction::Desc);
        let rows = backend.select(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "p2");
        assert_eq!(rows[0]["category"], Value::Null);
        assert_eq!(rows[1]["category"], json!({"name": "Phones"}));
    }

    #[tokio::test]
    async fn test_insert_enforces_unique_slug() {
        let backend = MemoryBackend::new();
        backend
            .insert("products", json!({"slug": "pixel-9"}))
            .await
            .unwrap();
        let err = backend
            .insert("products", json!({"slug": "pixel-9"}))
            .await
            .unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(backend.rows("products").len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_merges_on_conflict_columns() {
        let backend = MemoryBackend::new();
        let vote = |helpful| json!({"review_id": "r1", "user_id": "u1", "is_helpful": helpful});
        backend.upsert("review_votes", vote(true), "review_id,user_id").await.unwrap();
        backend.upsert("review_votes", vote(false), "review_id,user_id").await.unwrap();

        let rows = backend.rows("review_votes");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["is_helpful"], false);
    }

    #[tokio::test]
    async fn test_rejects_json_filters_when_configured() {
        let backend = MemoryBackend::new();
        backend.reject_json_filters();
        let query = Query::table("products").filter(Filter::ILike(
            Column::json_text("specifications", "network"),
            contains_pattern("5G"),
        ));
        assert!(backend.select(&query).await.unwrap_err().is_rejected());
        assert!(backend.select(&query.without_json_filters()).await.is_ok());
    }

    #[tokio::test]
    async fn test_auth_round_trip() {
        let backend = MemoryBackend::new();
        let outcome = backend.sign_up("ana@example.com", "secret1", "Ana").await.unwrap();
        let token = SecretString::from(outcome.session.unwrap().access_token);
        assert_eq!(backend.get_user(&token).await.unwrap().id, outcome.user.id);
        assert_eq!(backend.rows("profiles").len(), 1);

        backend.sign_out(&token).await.unwrap();
        assert!(backend.get_user(&token).await.is_err());
        assert!(backend.sign_in("ana@example.com", "wrong!").await.is_err());
    }
}
