//! Behavioural suite for [`AuthorizationService`] implementations.
//!
//! Each public function runs a group of cases against a fresh service obtained
//! from an [`Init`]. The in-memory store and the HTTP client (talking to a
//! handler in front of the store) run the same functions, which is how the two
//! paths are kept observationally equivalent.

use std::any::Any;
use std::sync::Arc;

use keyward_core::{
    AuthError, Authorization, AuthorizationFilter, AuthorizationService, AuthorizationUpdate,
    ErrorCode, FindOptions, Id, IdGenerator, NewAuthorization, SequentialIdGenerator,
    SequentialTokenGenerator, SortKey, Status, TokenGenerator,
};

/// Initial state for one case.
pub struct AuthorizationFields {
    pub id_generator: Arc<dyn IdGenerator>,
    pub token_generator: Arc<dyn TokenGenerator>,
    pub users: Vec<Id>,
    pub authorizations: Vec<Authorization>,
}

impl Default for AuthorizationFields {
    fn default() -> Self {
        Self {
            id_generator: Arc::new(SequentialIdGenerator::starting_at(FIRST_ID)),
            token_generator: Arc::new(SequentialTokenGenerator::new("token-")),
            users: Vec::new(),
            authorizations: Vec::new(),
        }
    }
}

/// A service under test plus whatever must stay alive while it is used.
pub struct Harness {
    pub service: Arc<dyn AuthorizationService>,
    _guard: Option<Box<dyn Any + Send>>,
}

impl Harness {
    pub fn new(service: Arc<dyn AuthorizationService>) -> Self {
        Self {
            service,
            _guard: None,
        }
    }

    /// Keep `guard` (e.g. a server task handle) alive for the harness lifetime.
    pub fn with_guard(mut self, guard: impl Any + Send) -> Self {
        self._guard = Some(Box::new(guard));
        self
    }
}

/// Builds a populated service for a case.
#[async_trait::async_trait]
pub trait Init: Send + Sync {
    async fn init(&self, fields: AuthorizationFields) -> Harness;
}

pub const FIRST_ID: u64 = 0x020f_755c_3c08_2000;

pub fn user(n: u64) -> Id {
    Id::from_bytes([n as u8]).expect("one-byte id")
}

pub fn auth(id: u64, user_id: Id, token: &str) -> Authorization {
    Authorization {
        id: Id::from(id),
        user_id,
        token: token.to_string(),
        status: Status::Unset,
        description: None,
    }
}

fn seeded() -> AuthorizationFields {
    AuthorizationFields {
        users: vec![user(1), user(2)],
        authorizations: vec![
            auth(1, user(1), "abc"),
            auth(2, user(2), "xyz"),
            auth(3, user(1), "rrr"),
        ],
        ..AuthorizationFields::default()
    }
}

#[track_caller]
fn assert_code<T: std::fmt::Debug>(case: &str, result: Result<T, AuthError>, code: ErrorCode) {
    match result {
        Err(e) => assert_eq!(e.code(), code, "{case}: unexpected error {e:?}"),
        Ok(v) => panic!("{case}: expected {code} error, got {v:?}"),
    }
}

fn ids(items: &[Authorization]) -> Vec<Id> {
    items.iter().map(|a| a.id.clone()).collect()
}

pub async fn create_authorization(init: &impl Init) {
    tracing::debug!("conformance: create_authorization");

    // Generated id and token.
    let h = init
        .init(AuthorizationFields {
            users: vec![user(1)],
            ..AuthorizationFields::default()
        })
        .await;
    let created = h
        .service
        .create_authorization(NewAuthorization::for_user(user(1)))
        .await
        .expect("create with generated fields");
    assert_eq!(created.id, Id::from(FIRST_ID));
    assert_eq!(created.token, "token-1");
    assert_eq!(created.user_id, user(1));
    assert_eq!(h.service.find_authorization_by_id(&created.id).await.unwrap(), created);
    assert_eq!(h.service.find_authorization_by_token(&created.token).await.unwrap(), created);

    // Caller-supplied token and description are kept.
    let h = init
        .init(AuthorizationFields {
            users: vec![user(0x10)],
            ..AuthorizationFields::default()
        })
        .await;
    let created = h
        .service
        .create_authorization(
            NewAuthorization::for_user(user(0x10))
                .with_token("hello")
                .with_description("laptop"),
        )
        .await
        .expect("create with token");
    assert_eq!(created.token, "hello");
    assert_eq!(created.user_id.to_string(), "10");
    assert_eq!(created.description.as_deref(), Some("laptop"));
    assert_eq!(h.service.find_authorization_by_token("hello").await.unwrap(), created);

    // Two creates give distinct ids and tokens.
    let h = init
        .init(AuthorizationFields {
            users: vec![user(1)],
            ..AuthorizationFields::default()
        })
        .await;
    let a = h
        .service
        .create_authorization(NewAuthorization::for_user(user(1)))
        .await
        .unwrap();
    let b = h
        .service
        .create_authorization(NewAuthorization::for_user(user(1)))
        .await
        .unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(a.token, b.token);

    // Missing or unknown user.
    let h = init
        .init(AuthorizationFields {
            users: vec![user(1)],
            ..AuthorizationFields::default()
        })
        .await;
    assert_code(
        "missing user",
        h.service.create_authorization(NewAuthorization::default()).await,
        ErrorCode::InvalidArgument,
    );
    assert_code(
        "unknown user",
        h.service
            .create_authorization(NewAuthorization::for_user(user(9)))
            .await,
        ErrorCode::InvalidArgument,
    );
    let page = h
        .service
        .find_authorizations(&AuthorizationFilter::default(), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0, "failed creates must not insert");

    // Duplicate token or id.
    let h = init.init(seeded()).await;
    assert_code(
        "duplicate token",
        h.service
            .create_authorization(NewAuthorization::for_user(user(1)).with_token("abc"))
            .await,
        ErrorCode::Conflict,
    );
    assert_code(
        "duplicate id",
        h.service
            .create_authorization(NewAuthorization::for_user(user(1)).with_id(Id::from(2)))
            .await,
        ErrorCode::Conflict,
    );
}

pub async fn find_authorization_by_id(init: &impl Init) {
    tracing::debug!("conformance: find_authorization_by_id");

    let h = init.init(seeded()).await;
    let found = h.service.find_authorization_by_id(&Id::from(2)).await.unwrap();
    assert_eq!(found, auth(2, user(2), "xyz"));

    assert_code(
        "missing id",
        h.service
            .find_authorization_by_id(&"020f755c3c082000".parse().unwrap())
            .await,
        ErrorCode::NotFound,
    );
}

pub async fn find_authorization_by_token(init: &impl Init) {
    tracing::debug!("conformance: find_authorization_by_token");

    let h = init.init(seeded()).await;
    let found = h.service.find_authorization_by_token("rrr").await.unwrap();
    assert_eq!(found, auth(3, user(1), "rrr"));

    assert_code(
        "missing token",
        h.service.find_authorization_by_token("nope").await,
        ErrorCode::NotFound,
    );
}

pub async fn find_authorizations(init: &impl Init) {
    tracing::debug!("conformance: find_authorizations");

    let h = init.init(seeded()).await;
    let all = h
        .service
        .find_authorizations(&AuthorizationFilter::default(), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items, seeded().authorizations, "insertion order");

    let by_user = h
        .service
        .find_authorizations(&AuthorizationFilter::by_user(user(1)), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&by_user.items), vec![Id::from(1), Id::from(3)]);
    assert_eq!(by_user.total, 2);

    let by_id = h
        .service
        .find_authorizations(&AuthorizationFilter::by_id(Id::from(2)), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(by_id.items, vec![auth(2, user(2), "xyz")]);

    let by_token = h
        .service
        .find_authorizations(&AuthorizationFilter::by_token("abc"), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(by_token.items, vec![auth(1, user(1), "abc")]);

    let mismatched = h
        .service
        .find_authorizations(
            &AuthorizationFilter {
                user_id: Some(user(2)),
                token: Some("abc".into()),
                id: None,
            },
            &FindOptions::default(),
        )
        .await
        .unwrap();
    assert!(mismatched.items.is_empty());
    assert_eq!(mismatched.total, 0);

    let second_page = h
        .service
        .find_authorizations(&AuthorizationFilter::default(), &FindOptions::page(1, 1))
        .await
        .unwrap();
    assert_eq!(ids(&second_page.items), vec![Id::from(2)]);
    assert_eq!(second_page.total, 3, "total counts matches before pagination");

    let sorted = h
        .service
        .find_authorizations(
            &AuthorizationFilter::default(),
            &FindOptions::default().sorted_by(SortKey::Token, false),
        )
        .await
        .unwrap();
    let tokens: Vec<_> = sorted.items.iter().map(|a| a.token.as_str()).collect();
    assert_eq!(tokens, ["abc", "rrr", "xyz"]);

    // Short identifiers keep their width: the one-byte 01 is not the eight-byte 0000000000000001.
    let short_id = h
        .service
        .find_authorizations(
            &AuthorizationFilter::by_id(Id::from_bytes([0x01]).expect("one-byte id")),
            &FindOptions::default(),
        )
        .await
        .unwrap();
    assert!(short_id.items.is_empty());
    assert_eq!(short_id.total, 0);

    let unknown_user = h
        .service
        .find_authorizations(&AuthorizationFilter::by_user(user(9)), &FindOptions::default())
        .await
        .unwrap();
    assert!(unknown_user.items.is_empty());

    let zero_limit = h
        .service
        .find_authorizations(&AuthorizationFilter::default(), &FindOptions::page(0, 0))
        .await
        .unwrap();
    assert!(zero_limit.items.is_empty());
    assert_eq!(zero_limit.total, 3);

    let empty = init.init(AuthorizationFields::default()).await;
    let none = empty
        .service
        .find_authorizations(&AuthorizationFilter::default(), &FindOptions::default())
        .await
        .unwrap();
    assert!(none.items.is_empty());
    assert_eq!(none.total, 0);
}

pub async fn update_authorization(init: &impl Init) {
    tracing::debug!("conformance: update_authorization");

    let h = init.init(seeded()).await;
    let updated = h
        .service
        .update_authorization(
            &Id::from(1),
            AuthorizationUpdate {
                status: Some(Status::Inactive),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, Status::Inactive);
    assert_eq!(updated.token, "abc");
    assert_eq!(updated.user_id, user(1));

    let described = h
        .service
        .update_authorization(
            &Id::from(1),
            AuthorizationUpdate {
                status: None,
                description: Some("rotated".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(described.status, Status::Inactive, "unset fields are left alone");
    assert_eq!(described.description.as_deref(), Some("rotated"));
    assert_eq!(h.service.find_authorization_by_id(&Id::from(1)).await.unwrap(), described);

    assert_code(
        "update missing",
        h.service
            .update_authorization(&Id::from(99), AuthorizationUpdate::default())
            .await,
        ErrorCode::NotFound,
    );
}

pub async fn delete_authorization(init: &impl Init) {
    tracing::debug!("conformance: delete_authorization");

    let h = init.init(seeded()).await;
    h.service.delete_authorization(&Id::from(1)).await.unwrap();

    assert_code(
        "find deleted",
        h.service.find_authorization_by_id(&Id::from(1)).await,
        ErrorCode::NotFound,
    );
    assert_code(
        "find deleted token",
        h.service.find_authorization_by_token("abc").await,
        ErrorCode::NotFound,
    );
    assert_code(
        "delete twice",
        h.service.delete_authorization(&Id::from(1)).await,
        ErrorCode::NotFound,
    );

    let rest = h
        .service
        .find_authorizations(&AuthorizationFilter::default(), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&rest.items), vec![Id::from(2), Id::from(3)]);
}
