/// Session cookies
///
/// Both tokens travel as `HttpOnly; Secure; SameSite=None` cookies. The
/// refresh cookie is scoped to the refresh endpoint so browsers send it
/// nowhere else.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpResponseBuilder;

use crate::auth::jwt::TokenPair;
use crate::configuration::JwtSettings;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const ACCESS_COOKIE_PATH: &str = "/";
pub const REFRESH_COOKIE_PATH: &str = "/auth/refresh-token";

fn session_cookie(name: &'static str, value: String, path: &'static str, max_age: Duration) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path(path)
        .max_age(max_age)
        .finish()
}

/// Attach both tokens to the response, with lifetimes matching the tokens.
pub fn set_auth_cookies(response: &mut HttpResponseBuilder, tokens: &TokenPair, config: &JwtSettings) {
    response.cookie(session_cookie(
        ACCESS_COOKIE,
        tokens.access_token.clone(),
        ACCESS_COOKIE_PATH,
        Duration::seconds(config.access_token_expiry),
    ));
    response.cookie(session_cookie(
        REFRESH_COOKIE,
        tokens.refresh_token.clone(),
        REFRESH_COOKIE_PATH,
        Duration::seconds(config.refresh_token_expiry),
    ));
}

/// Overwrite both cookies with empty, immediately expiring values.
pub fn clear_auth_cookies(response: &mut HttpResponseBuilder) {
    response.cookie(session_cookie(
        ACCESS_COOKIE,
        String::new(),
        ACCESS_COOKIE_PATH,
        Duration::ZERO,
    ));
    response.cookie(session_cookie(
        REFRESH_COOKIE,
        String::new(),
        REFRESH_COOKIE_PATH,
        Duration::ZERO,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header::SET_COOKIE, HttpResponse};

    fn config() -> JwtSettings {
        JwtSettings {
            access_secret: "a".to_string(),
            refresh_secret: "b".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn set_cookie_headers(response: &HttpResponse) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_set_auth_cookies() {
        let tokens = TokenPair {
            access_token: "access.jwt.value".to_string(),
            refresh_token: "refresh.jwt.value".to_string(),
        };
        let mut builder = HttpResponse::Ok();
        set_auth_cookies(&mut builder, &tokens, &config());
        let response = builder.finish();

        let cookies = response.cookies().collect::<Vec<_>>();
        let access = cookies.iter().find(|c| c.name() == ACCESS_COOKIE).unwrap();
        let refresh = cookies.iter().find(|c| c.name() == REFRESH_COOKIE).unwrap();

        assert_eq!(access.value(), "access.jwt.value");
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(Duration::minutes(15)));
        assert_eq!(refresh.value(), "refresh.jwt.value");
        assert_eq!(refresh.path(), Some("/auth/refresh-token"));
        assert_eq!(refresh.max_age(), Some(Duration::days(7)));

        for cookie in [access, refresh] {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::None));
        }

        let headers = set_cookie_headers(&response);
        assert!(headers.iter().all(|h| h.contains("SameSite=None")));
    }

    #[test]
    fn test_clear_auth_cookies() {
        let mut builder = HttpResponse::Ok();
        clear_auth_cookies(&mut builder);
        let response = builder.finish();

        let cookies = response.cookies().collect::<Vec<_>>();
        assert_eq!(cookies.len(), 2);
        for cookie in &cookies {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }

        let refresh = cookies.iter().find(|c| c.name() == REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.path(), Some("/auth/refresh-token"));
    }
}
