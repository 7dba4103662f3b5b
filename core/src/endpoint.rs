//! Descriptors for the remote methods the client can call.
//!
//! Every client operation maps to one [`Endpoint`]: the HTTP method, the
//! remote method name sent as `method=...`, the guard that must pass before
//! the request is built, and whether `format=json` is sent.

use crate::http::HttpMethod;

use self::Guard::{ApiKey, AuthorizedUser};

/// Precondition evaluated before any parameters are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Public method.
    Open,
    /// Needs the application API key.
    ApiKey,
    /// Needs the API key and an authorized user; `username` and `authkey`
    /// are added to the request.
    AuthorizedUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Client operation name, used in guard errors.
    pub operation: &'static str,
    /// Remote method name.
    pub remote: &'static str,
    pub method: HttpMethod,
    pub guard: Guard,
    pub json_format: bool,
}

impl Endpoint {
    const fn new(operation: &'static str, remote: &'static str, method: HttpMethod) -> Self {
        Self {
            operation,
            remote,
            method,
            guard: Guard::Open,
            json_format: false,
        }
    }

    const fn get(operation: &'static str, remote: &'static str) -> Self {
        Self::new(operation, remote, HttpMethod::Get)
    }

    const fn post(operation: &'static str, remote: &'static str) -> Self {
        Self::new(operation, remote, HttpMethod::Post)
    }

    const fn guarded(self, guard: Guard) -> Self {
        Self { guard, ..self }
    }

    const fn json(self) -> Self {
        Self {
            json_format: true,
            ..self
        }
    }
}

// Authorization
pub const AUTHORIZED_CHECK: Endpoint =
    Endpoint::get("authorized_check", "pnet.api.authorized.check").guarded(ApiKey);
pub const AUTHKEY_GET: Endpoint = Endpoint::get("authkey_get", "pnet.api.authkey.get").guarded(ApiKey);
pub const API_AUTHORIZE: Endpoint = Endpoint::post("api_authorize", "pnet.api.authorize").guarded(ApiKey);

// Blog, news, reviews
pub const BLOG_GET: Endpoint = Endpoint::get("blog_get", "pnet.blog.get").json();
pub const BLOG_ITEM_GET: Endpoint = Endpoint::get("blog_item_get", "pnet.blog.item.get").json();
pub const NEWS_GET: Endpoint = Endpoint::get("news_get", "pnet.news.get").json();
pub const NEWS_COMMENTS_GET: Endpoint =
    Endpoint::get("news_comments_get", "pnet.news.comments.get").json();
pub const REVIEWS_RECENT: Endpoint = Endpoint::get("reviews_recent", "pnet.reviews.recent").json();
pub const REVIEWS_QUERY: Endpoint = Endpoint::get("reviews_query", "pnet.reviews.query")
    .guarded(ApiKey)
    .json();

// Forum
pub const FORUM_GET: Endpoint = Endpoint::get("forum_get", "pnet.forum.get").json();
pub const FORUM_THREAD_GET: Endpoint = Endpoint::get("forum_thread_get", "pnet.forum.thread.get")
    .guarded(ApiKey)
    .json();
pub const FORUM_CANPOST: Endpoint =
    Endpoint::get("forum_canpost", "pnet.forum.canpost").guarded(ApiKey);
pub const FORUM_THREAD_NEW: Endpoint =
    Endpoint::post("forum_thread_new", "pnet.forum.thread.new").guarded(AuthorizedUser);
pub const FORUM_THREAD_RESPOND: Endpoint =
    Endpoint::post("forum_thread_respond", "pnet.forum.thread.respond").guarded(AuthorizedUser);

// Shows and setlists
pub const SHOWS_SETLISTS_LATEST: Endpoint =
    Endpoint::get("shows_setlists_latest", "pnet.shows.setlists.latest").json();
pub const SHOWS_SETLISTS_RANDOM: Endpoint =
    Endpoint::get("shows_setlists_random", "pnet.shows.setlists.random").json();
pub const SHOWS_SETLISTS_RECENT: Endpoint =
    Endpoint::get("shows_setlists_recent", "pnet.shows.setlists.recent").json();
pub const SHOWS_SETLISTS_GET: Endpoint = Endpoint::get("shows_setlists_get", "pnet.shows.setlists.get")
    .guarded(ApiKey)
    .json();
pub const SHOWS_SETLISTS_TIPH: Endpoint =
    Endpoint::get("shows_setlists_tiph", "pnet.shows.setlists.tiph").json();
pub const SHOWS_LINKS_GET: Endpoint = Endpoint::get("shows_links_get", "pnet.shows.links.get")
    .guarded(ApiKey)
    .json();
pub const SHOWS_UPCOMING: Endpoint = Endpoint::get("shows_upcoming", "pnet.shows.upcoming").json();
pub const SHOWS_QUERY: Endpoint = Endpoint::get("shows_query", "pnet.shows.query")
    .guarded(ApiKey)
    .json();

// Collections
pub const COLLECTIONS_GET: Endpoint = Endpoint::get("collections_get", "pnet.collections.get")
    .guarded(ApiKey)
    .json();
pub const COLLECTIONS_QUERY: Endpoint = Endpoint::get("collections_query", "pnet.collections.query")
    .guarded(ApiKey)
    .json();

// Users
pub const USER_USERNAME_CHECK: Endpoint =
    Endpoint::get("user_username_check", "pnet.user.username.check")
        .guarded(ApiKey)
        .json();
pub const USER_REGISTER: Endpoint = Endpoint::post("user_register", "pnet.user.register")
    .guarded(ApiKey)
    .json();
pub const USER_UID_GET: Endpoint = Endpoint::get("user_uid_get", "pnet.user.uid.get")
    .guarded(ApiKey)
    .json();
pub const USER_MYSHOWS_GET: Endpoint = Endpoint::get("user_myshows_get", "pnet.user.myshows.get")
    .guarded(ApiKey)
    .json();
pub const USER_MYSHOWS_GET_AUTHORIZED: Endpoint =
    Endpoint::get("user_myshows_get_authorized", "pnet.user.myshows.get")
        .guarded(AuthorizedUser)
        .json();
pub const USER_MYSHOWS_ADD: Endpoint =
    Endpoint::post("user_myshows_add", "pnet.user.myshows.add").guarded(AuthorizedUser);
pub const USER_MYSHOWS_REMOVE: Endpoint =
    Endpoint::post("user_myshows_remove", "pnet.user.myshows.remove").guarded(AuthorizedUser);
pub const USER_SHOWS_RATE: Endpoint =
    Endpoint::post("user_shows_rate", "pnet.user.shows.rate").guarded(AuthorizedUser);

// Reference data
pub const JAMCHARTS_ALL: Endpoint = Endpoint::get("jamcharts_all", "pnet.jamcharts.all");
pub const ARTISTS_GET: Endpoint = Endpoint::get("artists_get", "pnet.artists.get").json();

/// Every endpoint the client exposes.
pub const ALL: &[Endpoint] = &[
    AUTHORIZED_CHECK,
    AUTHKEY_GET,
    API_AUTHORIZE,
    BLOG_GET,
    BLOG_ITEM_GET,
    NEWS_GET,
    NEWS_COMMENTS_GET,
    REVIEWS_RECENT,
    REVIEWS_QUERY,
    FORUM_GET,
    FORUM_THREAD_GET,
    FORUM_CANPOST,
    FORUM_THREAD_NEW,
    FORUM_THREAD_RESPOND,
    SHOWS_SETLISTS_LATEST,
    SHOWS_SETLISTS_RANDOM,
    SHOWS_SETLISTS_RECENT,
    SHOWS_SETLISTS_GET,
    SHOWS_SETLISTS_TIPH,
    SHOWS_LINKS_GET,
    SHOWS_UPCOMING,
    SHOWS_QUERY,
    COLLECTIONS_GET,
    COLLECTIONS_QUERY,
    USER_USERNAME_CHECK,
    USER_REGISTER,
    USER_UID_GET,
    USER_MYSHOWS_GET,
    USER_MYSHOWS_GET_AUTHORIZED,
    USER_MYSHOWS_ADD,
    USER_MYSHOWS_REMOVE,
    USER_SHOWS_RATE,
    JAMCHARTS_ALL,
    ARTISTS_GET,
];
