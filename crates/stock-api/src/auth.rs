//! HTTP Basic authentication against the [`CredentialStore`].

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use stock_core::{Error, store::CredentialStore};

use crate::{AppState, Backend, error::ApiError};

/// `subject:secret` as sent in an `Authorization: Basic` header.
#[derive(Debug, PartialEq, Eq)]
pub struct BasicCredentials {
  pub subject: String,
  pub secret:  String,
}

/// Decode the `Authorization` header. Anything malformed is an
/// [`Error::AuthenticationFailure`].
pub fn parse_basic(headers: &HeaderMap) -> Result<BasicCredentials, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::AuthenticationFailure)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::AuthenticationFailure)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| Error::AuthenticationFailure)?;
  let creds   = String::from_utf8(decoded).map_err(|_| Error::AuthenticationFailure)?;

  let (subject, secret) = creds.split_once(':').ok_or(Error::AuthenticationFailure)?;
  if subject.is_empty() || secret.is_empty() {
    return Err(Error::AuthenticationFailure);
  }

  Ok(BasicCredentials { subject: subject.to_owned(), secret: secret.to_owned() })
}

/// Verify the request's credentials; returns the authenticated subject.
pub async fn authenticate<S>(store: &S, headers: &HeaderMap) -> Result<String, ApiError>
where
  S: CredentialStore,
{
  let creds = parse_basic(headers)?;
  let valid = store
    .check(&creds.subject, &creds.secret)
    .await
    .map_err(ApiError::store)?;
  if !valid {
    tracing::warn!(subject = %creds.subject, "authentication failed");
    return Err(Error::AuthenticationFailure.into());
  }
  Ok(creds.subject)
}

/// Present in a handler's arguments means the request was authenticated.
pub struct Authenticated(pub String);

impl<S: Backend> FromRequestParts<AppState<S>> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let subject = authenticate(state.store.as_ref(), &parts.headers).await?;
    Ok(Authenticated(subject))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{HeaderValue, header};

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn parses_valid_header() {
    let h = headers(&format!("Basic {}", B64.encode("alice:s3:cret")));
    assert_eq!(
      parse_basic(&h).unwrap(),
      BasicCredentials { subject: "alice".into(), secret: "s3:cret".into() }
    );
  }

  #[test]
  fn missing_header() {
    assert!(matches!(parse_basic(&HeaderMap::new()), Err(Error::AuthenticationFailure)));
  }

  #[test]
  fn invalid_base64() {
    assert!(matches!(
      parse_basic(&headers("Basic !!!not-base64!!!")),
      Err(Error::AuthenticationFailure)
    ));
  }

  #[test]
  fn empty_secret() {
    let h = headers(&format!("Basic {}", B64.encode("alice:")));
    assert!(matches!(parse_basic(&h), Err(Error::AuthenticationFailure)));
  }

  #[test]
  fn wrong_scheme() {
    let h = headers(&format!("Bearer {}", B64.encode("alice:x")));
    assert!(matches!(parse_basic(&h), Err(Error::AuthenticationFailure)));
  }

  #[tokio::test]
  async fn wrong_secret_is_authentication_failure() {
    let store = stock_store_sqlite::SqliteStore::open_in_memory().await.unwrap();
    assert!(store.add("alice", "secret1").await.unwrap());

    let ok = headers(&format!("Basic {}", B64.encode("alice:secret1")));
    assert_eq!(authenticate(&store, &ok).await.unwrap(), "alice");

    let bad = headers(&format!("Basic {}", B64.encode("alice:secret2")));
    assert!(matches!(authenticate(&store, &bad).await, Err(ApiError::Unauthorized)));
    assert!(matches!(
      ApiError::from(Error::AuthenticationFailure),
      ApiError::Unauthorized
    ));
  }
}
