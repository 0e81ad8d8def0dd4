//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
    policy::Caller,
};

use crate::{error::AccessError, AsError, Error, Service};

/// Context of an authorized HTTP API request.
///
/// Extracting it rejects the request with `UNAUTHORIZED` unless a valid
/// bearer token of an existing [`User`] is provided.
///
/// [`User`]: service::domain::User
#[derive(Clone, Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Caller`] performing the request.
    caller: Caller,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub const fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the [`Caller`] performing the request.
    #[must_use]
    pub const fn caller(&self) -> Caller {
        self.caller
    }

    /// Authenticates the request described by the provided `parts`.
    ///
    /// # Errors
    ///
    /// Errors if the request is not authorized, or the provided token is
    /// invalid.
    async fn authenticate(
        service: &Service,
        parts: &mut http::request::Parts,
    ) -> Result<Caller, Error> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(AsError::into_error)?;

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token =
            unsafe { session::Token::new_unchecked(bearer.token().to_owned()) };
        service
            .execute(command::AuthorizeUserSession { token })
            .await
            .map(Caller::from)
            .map_err(AsError::into_error)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let caller = Self::authenticate(&service, parts).await?;

        Ok(Self { service, caller })
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(_) | Self::UserNotExists(_) => {
                Some(AccessError::Unauthorized.into())
            }
        }
    }
}
