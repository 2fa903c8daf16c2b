//! List queries: filters, pagination options, and their URL query encoding.
//!
//! The query-parameter names are defined once here in [`QueryParam`]. The HTTP
//! handler decodes with [`ListQuery::from_query_string`] and the HTTP client
//! encodes with [`ListQuery::to_query_pairs`], so both sides share one table.

use core::str::FromStr;

use crate::authorization::Authorization;
use crate::error::{AuthError, AuthResult};
use crate::id::Id;

/// Partial-match query over authorizations. Populated fields are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationFilter {
    pub id: Option<Id>,
    pub user_id: Option<Id>,
    pub token: Option<String>,
}

impl AuthorizationFilter {
    pub fn by_id(id: Id) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_user(user_id: Id) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn by_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.user_id.is_none() && self.token.is_none()
    }

    pub fn matches(&self, auth: &Authorization) -> bool {
        self.id.as_ref().is_none_or(|id| *id == auth.id)
            && self.user_id.as_ref().is_none_or(|u| *u == auth.user_id)
            && self.token.as_ref().is_none_or(|t| *t == auth.token)
    }
}

/// Field a listing may be sorted by.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    Id,
    UserId,
    Token,
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Id, SortKey::UserId, SortKey::Token, SortKey::Status];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::UserId => "userID",
            SortKey::Token => "token",
            SortKey::Status => "status",
        }
    }
}

impl FromStr for SortKey {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AuthError::invalid_argument(format!("unknown sort key {s:?}")))
    }
}

/// Pagination and ordering, applied after filtering.
///
/// With no `sort_by`, results keep store insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort_by: Option<SortKey>,
    pub descending: bool,
}

impl FindOptions {
    pub fn page(offset: usize, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, key: SortKey, descending: bool) -> Self {
        self.sort_by = Some(key);
        self.descending = descending;
        self
    }

    /// Sort (stably) and slice an already-filtered result set.
    pub fn apply(&self, mut items: Vec<Authorization>) -> Vec<Authorization> {
        if let Some(key) = self.sort_by {
            match key {
                SortKey::Id => items.sort_by(|a, b| a.id.cmp(&b.id)),
                SortKey::UserId => items.sort_by(|a, b| a.user_id.cmp(&b.user_id)),
                SortKey::Token => items.sort_by(|a, b| a.token.cmp(&b.token)),
                SortKey::Status => items.sort_by(|a, b| a.status.cmp(&b.status)),
            }
        }
        if self.descending {
            items.reverse();
        }
        let limit = self.limit.unwrap_or(usize::MAX);
        items.into_iter().skip(self.offset).take(limit).collect()
    }
}

/// One row of the query-parameter mapping table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueryParam {
    Id,
    UserId,
    Token,
    Limit,
    Offset,
    SortBy,
    Descending,
}

impl QueryParam {
    /// Encoding order of the parameters.
    pub const ALL: [QueryParam; 7] = [
        QueryParam::Id,
        QueryParam::UserId,
        QueryParam::Token,
        QueryParam::Limit,
        QueryParam::Offset,
        QueryParam::SortBy,
        QueryParam::Descending,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QueryParam::Id => "id",
            QueryParam::UserId => "userID",
            QueryParam::Token => "token",
            QueryParam::Limit => "limit",
            QueryParam::Offset => "offset",
            QueryParam::SortBy => "sortBy",
            QueryParam::Descending => "descending",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// A filter together with its find options, as carried by a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: AuthorizationFilter,
    pub options: FindOptions,
}

impl ListQuery {
    pub fn new(filter: AuthorizationFilter, options: FindOptions) -> Self {
        Self { filter, options }
    }

    /// Populated fields as `(name, value)` pairs, in [`QueryParam::ALL`] order.
    ///
    /// Defaults (`offset=0`, `descending=false`) are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let f = &self.filter;
        let o = &self.options;
        QueryParam::ALL
            .into_iter()
            .filter_map(|param| {
                let value = match param {
                    QueryParam::Id => f.id.as_ref().map(Id::encode),
                    QueryParam::UserId => f.user_id.as_ref().map(Id::encode),
                    QueryParam::Token => f.token.clone(),
                    QueryParam::Limit => o.limit.map(|l| l.to_string()),
                    QueryParam::Offset => (o.offset > 0).then(|| o.offset.to_string()),
                    QueryParam::SortBy => o.sort_by.map(|k| k.as_str().to_string()),
                    QueryParam::Descending => o.descending.then(|| "true".to_string()),
                };
                value.map(|v| (param.name(), v))
            })
            .collect()
    }

    /// Canonical `application/x-www-form-urlencoded` form; empty when nothing is set.
    pub fn to_query_string(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.to_query_pairs() {
            ser.append_pair(name, &value);
        }
        ser.finish()
    }

    /// Decode a raw query string. Unknown parameters are ignored; the last
    /// occurrence of a repeated parameter wins.
    pub fn from_query_string(raw: &str) -> AuthResult<Self> {
        let mut query = Self::default();
        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let Some(param) = QueryParam::from_name(&name) else {
                continue;
            };
            query.set(param, &value)?;
        }
        Ok(query)
    }

    fn set(&mut self, param: QueryParam, value: &str) -> AuthResult<()> {
        let invalid = |what: &str| {
            AuthError::invalid_argument(format!("invalid {} {value:?}: {what}", param.name()))
        };
        match param {
            QueryParam::Id => self.filter.id = Some(value.parse()?),
            QueryParam::UserId => self.filter.user_id = Some(value.parse()?),
            QueryParam::Token => self.filter.token = Some(value.to_string()),
            QueryParam::Limit => {
                self.options.limit = Some(value.parse().map_err(|_| invalid("expected a count"))?)
            }
            QueryParam::Offset => {
                self.options.offset = value.parse().map_err(|_| invalid("expected a count"))?
            }
            QueryParam::SortBy => self.options.sort_by = Some(value.parse()?),
            QueryParam::Descending => {
                self.options.descending = value.parse().map_err(|_| invalid("expected true or false"))?
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::Status;

    fn auth(id: u64, user: u64, token: &str) -> Authorization {
        Authorization {
            id: Id::from(id),
            user_id: Id::from(user),
            token: token.to_string(),
            status: Status::Unset,
            description: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = AuthorizationFilter::default();
        assert!(f.is_empty());
        assert!(f.matches(&auth(1, 2, "a")));
    }

    #[test]
    fn populated_fields_are_anded() {
        let f = AuthorizationFilter {
            user_id: Some(Id::from(2)),
            token: Some("a".into()),
            ..Default::default()
        };
        assert!(f.matches(&auth(1, 2, "a")));
        assert!(!f.matches(&auth(1, 2, "b")));
        assert!(!f.matches(&auth(1, 3, "a")));
    }

    #[test]
    fn options_sort_then_slice() {
        let items = vec![auth(3, 1, "c"), auth(1, 1, "a"), auth(2, 1, "b")];

        let unsorted = FindOptions::page(1, 1).apply(items.clone());
        assert_eq!(unsorted, vec![auth(1, 1, "a")]);

        let by_token = FindOptions::default()
            .sorted_by(SortKey::Token, true)
            .apply(items.clone());
        let tokens: Vec<_> = by_token.iter().map(|a| a.token.as_str()).collect();
        assert_eq!(tokens, ["c", "b", "a"]);

        let past_end = FindOptions::page(10, 5).apply(items);
        assert!(past_end.is_empty());
    }

    #[test]
    fn empty_query_encodes_to_nothing() {
        assert_eq!(ListQuery::default().to_query_string(), "");
        assert_eq!(ListQuery::from_query_string("").unwrap(), ListQuery::default());
    }

    #[test]
    fn query_string_round_trips_every_parameter() {
        let query = ListQuery::new(
            AuthorizationFilter {
                id: Some(Id::from(7)),
                user_id: Some("10".parse().unwrap()),
                token: Some("a b&c".into()),
            },
            FindOptions::page(4, 2).sorted_by(SortKey::UserId, true),
        );
        let raw = query.to_query_string();
        assert_eq!(
            raw,
            "id=0000000000000007&userID=10&token=a+b%26c&limit=2&offset=4&sortBy=userID&descending=true"
        );
        assert_eq!(ListQuery::from_query_string(&raw).unwrap(), query);
    }

    #[test]
    fn bad_values_are_invalid_arguments() {
        for raw in ["userID=zz", "limit=-1", "sortBy=name", "descending=maybe"] {
            let err = ListQuery::from_query_string(raw).unwrap_err();
            assert!(matches!(err, AuthError::InvalidArgument(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let q = ListQuery::from_query_string("foo=bar&userID=10").unwrap();
        assert_eq!(q.filter, AuthorizationFilter::by_user("10".parse().unwrap()));
    }
}
