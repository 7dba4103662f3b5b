//! Blocking client for the Phish.net API.
//!
//! # Design
//! `PhishNetClient` owns an [`Executor`] (transport, base URL, API version,
//! API key) and the session's optional [`Authorization`]. Every endpoint
//! method goes through [`PhishNetClient::call`], which evaluates the
//! endpoint's guard, then lets the method validate its own arguments and add
//! parameters, and only then issues the request. Nothing reaches the network
//! if any of those steps fails.
//!
//! The client is not meant to be shared across threads without a lock; use
//! one client per concurrent caller.

use serde_json::Value;

use crate::auth::Authorization;
use crate::config::ClientConfig;
use crate::endpoint::{self, Endpoint, Guard};
use crate::error::ApiError;
use crate::executor::Executor;
use crate::http::{HttpMethod, Transport, UreqTransport};
use crate::request::{Params, RequestSpec};
use crate::types::{IdList, Rating, ShowDate, ShowQuery};

const FORMAT: &str = "json";

#[derive(Debug)]
pub struct PhishNetClient<T = UreqTransport> {
    pub(crate) executor: Executor<T>,
    retries: u32,
    authorization: Option<Authorization>,
}

impl PhishNetClient<UreqTransport> {
    /// Creates a client that talks HTTP through a pooled `ureq` agent.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout, config.verify_tls);
        Self::with_transport(config, transport)
    }

    /// Creates a client configured from the `PHISHNET_*` environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }
}

impl<T: Transport> PhishNetClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            executor: Executor::new(transport, config.base_url, config.version, config.api_key),
            retries: config.retries,
            authorization: config.authorization,
        }
    }

    pub fn base_url(&self) -> &str {
        self.executor.base_url()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.executor.api_key()
    }

    pub fn authorization(&self) -> Option<&Authorization> {
        self.authorization.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.authorization.as_ref().map(Authorization::username)
    }

    pub fn authkey(&self) -> Option<&str> {
        self.authorization.as_ref().map(Authorization::authkey)
    }

    /// Replaces the session's authorized user.
    pub fn set_authorization(&mut self, authorization: Option<Authorization>) {
        self.authorization = authorization;
    }

    /// Issues a GET to the default path with the default retry count.
    pub fn get(&self, params: Params) -> Result<Value, ApiError> {
        self.execute(&RequestSpec::get(params))
    }

    /// Issues a POST to the default path with the default retry count.
    pub fn post(&self, params: Params) -> Result<Value, ApiError> {
        self.execute(&RequestSpec::post(params))
    }

    pub fn execute(&self, spec: &RequestSpec) -> Result<Value, ApiError> {
        self.executor.execute(spec, self.retries)
    }

    /// Issues a request with the method given by name, e.g. `"GET"`.
    ///
    /// Names other than GET and POST fail with `UnsupportedMethod` before
    /// anything is sent.
    pub fn request(
        &self,
        method: &str,
        path: &str,
        params: Params,
        retries: u32,
    ) -> Result<Value, ApiError> {
        let method: HttpMethod = method.parse()?;
        let spec = RequestSpec::new(method, params).with_path(path);
        self.executor.execute(&spec, retries)
    }

    pub(crate) fn require_api_key(&self, operation: &'static str) -> Result<(), ApiError> {
        match self.api_key() {
            Some(_) => Ok(()),
            None => Err(ApiError::MissingApiKey { operation }),
        }
    }

    fn require_authorization(&self, operation: &'static str) -> Result<&Authorization, ApiError> {
        self.require_api_key(operation)?;
        self.authorization
            .as_ref()
            .filter(|auth| auth.is_complete())
            .ok_or(ApiError::MissingAuthorization { operation })
    }

    /// Base parameters for `endpoint` once its guard has passed.
    fn prepare(&self, endpoint: &Endpoint) -> Result<Params, ApiError> {
        let mut params = Params::method(endpoint.remote);
        match endpoint.guard {
            Guard::Open => {}
            Guard::ApiKey => self.require_api_key(endpoint.operation)?,
            Guard::AuthorizedUser => {
                let auth = self.require_authorization(endpoint.operation)?;
                params.insert("username", auth.username());
                params.insert("authkey", auth.authkey());
            }
        }
        if endpoint.json_format {
            params.insert("format", FORMAT);
        }
        Ok(params)
    }

    /// Guard, then `build`, then the request.
    pub(crate) fn call<F>(&self, endpoint: &Endpoint, build: F) -> Result<Value, ApiError>
    where
        F: FnOnce(Params) -> Result<Params, ApiError>,
    {
        let params = build(self.prepare(endpoint)?)?;
        self.execute(&RequestSpec::new(endpoint.method, params))
    }

    fn call_plain(&self, endpoint: &Endpoint) -> Result<Value, ApiError> {
        self.call(endpoint, Ok)
    }

    /// Recent entries on the phish.net blog.
    pub fn blog_get(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::BLOG_GET)
    }

    pub fn blog_item_get(&self, id: u64) -> Result<Value, ApiError> {
        self.call(&endpoint::BLOG_ITEM_GET, |p| Ok(p.with("id", id)))
    }

    /// Recently active forum threads.
    pub fn forum_get(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::FORUM_GET)
    }

    pub fn forum_thread_get(&self, thread: u64) -> Result<Value, ApiError> {
        self.call(&endpoint::FORUM_THREAD_GET, |p| Ok(p.with("thread", thread)))
    }

    /// Whether a user may post to the forum. Defaults to the authorized user.
    pub fn forum_canpost(&self, username: Option<&str>) -> Result<Value, ApiError> {
        self.call(&endpoint::FORUM_CANPOST, |p| {
            let username = self.default_username(username, endpoint::FORUM_CANPOST.operation)?;
            Ok(p.with("username", username))
        })
    }

    /// Starts a forum thread as the authorized user. The response carries the
    /// new thread id in `thread`.
    pub fn forum_thread_new(&self, title: &str, txt: &str) -> Result<Value, ApiError> {
        self.call(&endpoint::FORUM_THREAD_NEW, |p| {
            Ok(p.with("title", title).with("txt", txt))
        })
    }

    pub fn forum_thread_respond(&self, thread: u64, txt: &str) -> Result<Value, ApiError> {
        self.call(&endpoint::FORUM_THREAD_RESPOND, |p| {
            Ok(p.with("thread", thread).with("txt", txt))
        })
    }

    pub fn news_get(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::NEWS_GET)
    }

    pub fn news_comments_get(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::NEWS_COMMENTS_GET)
    }

    pub fn reviews_recent(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::REVIEWS_RECENT)
    }

    /// Reviews by user, by show date, or by both.
    pub fn reviews_query(
        &self,
        username: Option<&str>,
        showdate: Option<ShowDate>,
    ) -> Result<Value, ApiError> {
        self.call(&endpoint::REVIEWS_QUERY, |mut p| {
            p.insert_opt("username", username);
            p.insert_opt("showdate", showdate.map(|d| d.resolve()).transpose()?);
            Ok(p)
        })
    }

    /// The most recent setlist. Unlinked setlists skip the song-history links.
    pub fn shows_setlists_latest(&self, linked: bool) -> Result<Value, ApiError> {
        self.call(&endpoint::SHOWS_SETLISTS_LATEST, |mut p| {
            if !linked {
                p.insert("linked", -1);
            }
            Ok(p)
        })
    }

    pub fn shows_setlists_random(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::SHOWS_SETLISTS_RANDOM)
    }

    pub fn shows_setlists_recent(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::SHOWS_SETLISTS_RECENT)
    }

    /// Setlist of one show by id or date. The API prefers `showid` when both
    /// are given.
    pub fn shows_setlists_get(
        &self,
        showid: Option<u64>,
        showdate: Option<ShowDate>,
    ) -> Result<Value, ApiError> {
        self.call(&endpoint::SHOWS_SETLISTS_GET, |mut p| {
            p.insert_opt("showid", showid);
            p.insert_opt("showdate", showdate.map(|d| d.resolve()).transpose()?);
            Ok(p)
        })
    }

    /// "Today in Phish history".
    pub fn shows_setlists_tiph(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::SHOWS_SETLISTS_TIPH)
    }

    pub fn shows_links_get(&self, showid: u64) -> Result<Value, ApiError> {
        self.call(&endpoint::SHOWS_LINKS_GET, |p| Ok(p.with("showid", showid)))
    }

    pub fn shows_upcoming(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::SHOWS_UPCOMING)
    }

    pub fn shows_query(&self, query: &ShowQuery) -> Result<Value, ApiError> {
        self.call(&endpoint::SHOWS_QUERY, |mut p| {
            query.apply(&mut p);
            Ok(p)
        })
    }

    pub fn collections_get(&self, collectionid: u64) -> Result<Value, ApiError> {
        self.call(&endpoint::COLLECTIONS_GET, |p| {
            Ok(p.with("collectionid", collectionid))
        })
    }

    /// Collections owned by the user with id `uid`.
    pub fn collections_query(&self, uid: u64) -> Result<Value, ApiError> {
        self.call(&endpoint::COLLECTIONS_QUERY, |p| Ok(p.with("uid", uid)))
    }

    /// Whether `username` is available for registration.
    pub fn user_username_check(&self, username: &str) -> Result<Value, ApiError> {
        self.call(&endpoint::USER_USERNAME_CHECK, |p| {
            Ok(p.with("username", username))
        })
    }

    /// Registers a phish.net account. On success the response carries the
    /// new `uid` and an `authkey` for this application.
    pub fn user_register(
        &self,
        username: &str,
        password: &str,
        email: &str,
        realname: &str,
    ) -> Result<Value, ApiError> {
        self.call(&endpoint::USER_REGISTER, |p| {
            Ok(p.with("username", username)
                .with("password", password)
                .with("email", email)
                .with("realname", realname))
        })
    }

    pub fn user_uid_get(&self, username: &str) -> Result<Value, ApiError> {
        self.call(&endpoint::USER_UID_GET, |p| Ok(p.with("username", username)))
    }

    /// Shows attended by one or more users.
    ///
    /// The parameter follows the number of names, not the shape of the
    /// argument: a single name is sent as `username` whether it came as a
    /// string or a one-element list, and several names as `usernames`.
    pub fn user_myshows_get(&self, usernames: impl Into<IdList>) -> Result<Value, ApiError> {
        let usernames = usernames.into();
        self.call(&endpoint::USER_MYSHOWS_GET, |p| match usernames.len() {
            0 => Err(ApiError::MissingUsername {
                operation: endpoint::USER_MYSHOWS_GET.operation,
            }),
            1 => Ok(p.with("username", &usernames)),
            _ => Ok(p.with("usernames", &usernames)),
        })
    }

    /// Shows attended by the authorized user.
    pub fn user_myshows_get_authorized(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::USER_MYSHOWS_GET_AUTHORIZED)
    }

    pub fn user_myshows_add(&self, showdate: impl Into<ShowDate>) -> Result<Value, ApiError> {
        let showdate = showdate.into();
        self.call(&endpoint::USER_MYSHOWS_ADD, |p| {
            Ok(p.with("showdate", showdate.resolve()?))
        })
    }

    pub fn user_myshows_remove(&self, showdate: impl Into<ShowDate>) -> Result<Value, ApiError> {
        let showdate = showdate.into();
        self.call(&endpoint::USER_MYSHOWS_REMOVE, |p| {
            Ok(p.with("showdate", showdate.resolve()?))
        })
    }

    /// Rates a show from 1 to 5 as the authorized user. Invalid ratings fail
    /// with `InvalidRating` before anything is sent.
    pub fn user_shows_rate<R>(&self, showdate: impl Into<ShowDate>, rating: R) -> Result<Value, ApiError>
    where
        R: TryInto<Rating, Error = ApiError>,
    {
        let showdate = showdate.into();
        self.call(&endpoint::USER_SHOWS_RATE, |p| {
            let rating = rating.try_into()?;
            Ok(p.with("showdate", showdate.resolve()?).with("rating", rating))
        })
    }

    pub fn jamcharts_all(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::JAMCHARTS_ALL)
    }

    /// Artists known to the API, for `ShowQuery::artist`.
    pub fn artists_get(&self) -> Result<Value, ApiError> {
        self.call_plain(&endpoint::ARTISTS_GET)
    }

    fn default_username<'a>(
        &'a self,
        username: Option<&'a str>,
        operation: &'static str,
    ) -> Result<&'a str, ApiError> {
        username
            .filter(|u| !u.is_empty())
            .or_else(|| self.username().filter(|u| !u.is_empty()))
            .ok_or(ApiError::MissingUsername { operation })
    }
}
