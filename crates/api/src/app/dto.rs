//! Response encoding and link computation.
//!
//! Links are derived from `id` / `user_id` at encode time and never stored.

use serde::Serialize;

use keyward_core::{Authorization, AuthorizationPage, Id, ListQuery};

/// Builds hyperlinks relative to the mount prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBuilder {
    prefix: String,
}

impl LinkBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn authorizations(&self) -> String {
        format!("{}/authorizations", self.prefix)
    }

    pub fn authorization(&self, id: &Id) -> String {
        format!("{}/authorizations/{id}", self.prefix)
    }

    pub fn user(&self, user_id: &Id) -> String {
        format!("{}/users/{user_id}", self.prefix)
    }

    /// Collection path plus the canonical query string, if any.
    pub fn collection(&self, query: &ListQuery) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            self.authorizations()
        } else {
            format!("{}?{qs}", self.authorizations())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorizationLinks {
    #[serde(rename = "self")]
    pub self_: String,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorizationResponse {
    pub links: AuthorizationLinks,
    #[serde(flatten)]
    pub authorization: Authorization,
}

#[derive(Debug, Serialize)]
pub struct CollectionLinks {
    #[serde(rename = "self")]
    pub self_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizationsResponse {
    pub links: CollectionLinks,
    pub auths: Vec<AuthorizationResponse>,
}

pub fn authorization_to_response(links: &LinkBuilder, auth: Authorization) -> AuthorizationResponse {
    AuthorizationResponse {
        links: AuthorizationLinks {
            self_: links.authorization(&auth.id),
            user: links.user(&auth.user_id),
        },
        authorization: auth,
    }
}

pub fn page_to_response(
    links: &LinkBuilder,
    query: &ListQuery,
    page: AuthorizationPage,
) -> AuthorizationsResponse {
    let opts = &query.options;
    let returned = page.items.len();

    // A zero limit cannot advance; prev falls back to the first page.
    let step = opts.limit.filter(|&limit| limit > 0);

    let next = step
        .filter(|_| opts.offset + returned < page.total)
        .map(|limit| {
            let mut q = query.clone();
            q.options.offset = opts.offset + limit;
            links.collection(&q)
        });

    let prev = (opts.offset > 0).then(|| {
        let mut q = query.clone();
        q.options.offset = opts.offset.saturating_sub(step.unwrap_or(opts.offset));
        links.collection(&q)
    });

    AuthorizationsResponse {
        links: CollectionLinks {
            self_: links.collection(query),
            next,
            prev,
        },
        auths: page
            .items
            .into_iter()
            .map(|a| authorization_to_response(links, a))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use keyward_core::{AuthorizationFilter, FindOptions, Status};
    use serde_json::json;

    use super::*;

    fn sample(id: u64, token: &str) -> Authorization {
        Authorization {
            id: Id::from(id),
            user_id: "10".parse().unwrap(),
            token: token.into(),
            status: Status::Unset,
            description: None,
        }
    }

    #[test]
    fn entity_links_are_computed() {
        let body = serde_json::to_value(authorization_to_response(
            &LinkBuilder::default(),
            sample(1, "hello"),
        ))
        .unwrap();
        assert_eq!(
            body,
            json!({
                "links": {
                    "self": "/authorizations/0000000000000001",
                    "user": "/users/10",
                },
                "id": "0000000000000001",
                "userID": "10",
                "token": "hello",
                "status": "",
            })
        );
    }

    #[test]
    fn empty_page_encodes_empty_array() {
        let body = serde_json::to_value(page_to_response(
            &LinkBuilder::default(),
            &ListQuery::default(),
            AuthorizationPage::default(),
        ))
        .unwrap();
        assert_eq!(body, json!({"links": {"self": "/authorizations"}, "auths": []}));
    }

    #[test]
    fn prefix_applies_to_every_link() {
        let links = LinkBuilder::new("/v1");
        assert_eq!(links.authorization(&Id::from(2)), "/v1/authorizations/0000000000000002");
        assert_eq!(links.user(&"20".parse().unwrap()), "/v1/users/20");
        assert_eq!(links.collection(&ListQuery::default()), "/v1/authorizations");
    }

    #[test]
    fn paging_links_follow_limit_and_offset() {
        let query = ListQuery::new(
            AuthorizationFilter::by_user("10".parse().unwrap()),
            FindOptions::page(2, 2),
        );
        let page = AuthorizationPage {
            items: vec![sample(3, "c"), sample(4, "d")],
            total: 5,
        };
        let body = serde_json::to_value(page_to_response(&LinkBuilder::default(), &query, page)).unwrap();

        assert_eq!(body["links"]["self"], "/authorizations?userID=10&limit=2&offset=2");
        assert_eq!(body["links"]["next"], "/authorizations?userID=10&limit=2&offset=4");
        assert_eq!(body["links"]["prev"], "/authorizations?userID=10&limit=2");
    }

    #[test]
    fn last_page_has_no_next() {
        let query = ListQuery::new(AuthorizationFilter::default(), FindOptions::page(0, 5));
        let page = AuthorizationPage {
            items: vec![sample(1, "a")],
            total: 1,
        };
        let body = serde_json::to_value(page_to_response(&LinkBuilder::default(), &query, page)).unwrap();
        assert!(body["links"].get("next").is_none());
        assert!(body["links"].get("prev").is_none());
    }

    #[test]
    fn zero_limit_has_no_next_link() {
        let query = ListQuery::new(AuthorizationFilter::default(), FindOptions::page(0, 0));
        let page = AuthorizationPage {
            items: vec![],
            total: 3,
        };
        let body = serde_json::to_value(page_to_response(&LinkBuilder::default(), &query, page)).unwrap();
        assert_eq!(body["links"]["self"], "/authorizations?limit=0");
        assert!(body["links"].get("next").is_none());
        assert!(body["links"].get("prev").is_none());
    }

    #[test]
    fn zero_limit_prev_returns_to_start() {
        let query = ListQuery::new(AuthorizationFilter::default(), FindOptions::page(2, 0));
        let page = AuthorizationPage {
            items: vec![],
            total: 3,
        };
        let body = serde_json::to_value(page_to_response(&LinkBuilder::default(), &query, page)).unwrap();
        assert!(body["links"].get("next").is_none());
        assert_eq!(body["links"]["prev"], "/authorizations?limit=0");
    }
}
