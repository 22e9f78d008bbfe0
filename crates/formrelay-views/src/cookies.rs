//! The session token cookie, as configured by [`RelaySettings`]

use formrelay_conf::RelaySettings;
use formrelay_http::{Request, SetCookie};
use formrelay_store::SessionToken;

/// Raw token cookie value from the request, if any
pub fn presented_token(request: &Request, settings: &RelaySettings) -> Option<String> {
	request.cookie(&settings.cookie_name)
}

/// Cookie handing `token` to the browser for the redirect
pub fn token_cookie(settings: &RelaySettings, token: &SessionToken) -> SetCookie {
	scoped(
		SetCookie::new(settings.cookie_name.as_str(), token.as_str())
			.with_path(settings.cookie_path.as_str())
			.with_max_age(settings.record_ttl()),
		settings,
	)
}

/// Cookie telling the browser to forget the token
///
/// Carries the same path and domain as [`token_cookie`]; browsers ignore a
/// removal whose scope differs from the cookie it targets.
pub fn clear_token_cookie(settings: &RelaySettings) -> SetCookie {
	scoped(
		SetCookie::removal(settings.cookie_name.as_str(), settings.cookie_path.as_str()),
		settings,
	)
}

fn scoped(cookie: SetCookie, settings: &RelaySettings) -> SetCookie {
	let cookie = cookie
		.with_secure(settings.cookie_secure)
		.with_same_site(settings.same_site());
	match settings.cookie_domain.as_deref() {
		Some(domain) => cookie.with_domain(domain),
		None => cookie,
	}
}
