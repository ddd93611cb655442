use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "auth_token";

/// Puts a freshly issued session token into the jar.
pub fn with_session(jar: CookieJar, token: String, ttl: std::time::Duration, secure: bool) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ttl.as_secs() as i64));
    jar.add(cookie)
}

/// Replaces the session cookie with an empty, already-expired one.
pub fn without_session(jar: CookieJar, secure: bool) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH);
    jar.add(cookie)
}
