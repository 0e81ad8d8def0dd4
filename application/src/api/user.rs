//! [`User`]-related endpoints.

use axum::{extract::rejection::JsonRejection, Extension, Json};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, user},
};

use crate::{
    api::{self, valid},
    define_error, AsError, Error, Service,
};

/// [`User`] representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
pub struct User {
    /// ID of this [`User`].
    pub id: user::Id,

    /// Name of this [`User`].
    pub name: user::Name,

    /// Email of this [`User`].
    pub email: user::Email,

    /// Role of this [`User`].
    pub role: user::Role,

    /// Phone number of this [`User`], if any.
    pub phone: Option<user::Phone>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
        }
    }
}

/// Request body of the [`signup()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Name of a new [`User`].
    pub name: String,

    /// Email of a new [`User`].
    pub email: String,

    /// Password of a new [`User`].
    pub password: String,

    /// Role of a new [`User`], customer by default.
    #[serde(default)]
    pub role: Option<user::Role>,

    /// Phone number of a new [`User`].
    #[serde(default)]
    pub phone: Option<String>,
}

impl TryFrom<SignupRequest> for command::CreateUser {
    type Error = Error;

    fn try_from(req: SignupRequest) -> Result<Self, Self::Error> {
        let SignupRequest {
            name,
            email,
            password,
            role,
            phone,
        } = req;

        Ok(Self {
            name: valid(user::Name::new(name))?,
            email: valid(user::Email::new(email))?,
            password: SecretBox::new(Box::new(valid(user::Password::new(
                password,
            ))?)),
            role: role.unwrap_or_default(),
            phone: phone.map(|p| valid(user::Phone::new(p))).transpose()?,
        })
    }
}

/// Registers a new [`User`].
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_REQUEST` - the request body is invalid;
/// - `EMAIL_ALREADY_EXISTS` - the email is occupied by another [`User`].
#[tracing::instrument(skip_all, fields(http.route = "POST /auth/signup"))]
pub async fn signup(
    Extension(service): Extension<Service>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> api::Created<User> {
    let Json(body) = body?;
    let cmd = command::CreateUser::try_from(body)?;

    let user = service.execute(cmd).await.map_err(AsError::into_error)?;

    Ok(api::created(user.into()))
}

/// Request body of the [`login()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email of the [`User`].
    pub email: String,

    /// Password of the [`User`].
    pub password: String,
}

/// Response body of the [`login()`] endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token of the created session.
    pub token: String,

    /// Logged in [`User`].
    pub user: User,
}

/// Logs a [`User`] in by the provided credentials.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_REQUEST` - the request body is invalid;
/// - `INVALID_CREDENTIALS` - no [`User`] matches the credentials.
#[tracing::instrument(skip_all, fields(http.route = "POST /auth/login"))]
pub async fn login(
    Extension(service): Extension<Service>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> api::Result<LoginResponse> {
    let Json(LoginRequest { email, password }) = body?;
    let email = valid(user::Email::new(email))?;
    let password = valid(user::Password::new(password))?;

    let out = service
        .execute(command::CreateUserSession::ByCredentials {
            email,
            password: SecretBox::new(Box::new(password)),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Envelope::success(LoginResponse {
        token: out.token.to_string(),
        user: out.user.into(),
    }))
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_ALREADY_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Email is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{self, create_user::ExecutionError},
        domain::user,
    };

    use crate::AsError as _;

    use super::SignupRequest;

    fn request(phone: Option<&str>) -> SignupRequest {
        SignupRequest {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            password: "secret1".into(),
            role: None,
            phone: phone.map(Into::into),
        }
    }

    #[test]
    fn signup_defaults_to_customer() {
        let cmd = command::CreateUser::try_from(request(None)).unwrap();

        assert_eq!(cmd.role, user::Role::Customer);
        assert!(cmd.phone.is_none());
    }

    #[test]
    fn signup_rejects_invalid_fields() {
        let err = command::CreateUser::try_from(request(Some("12"))).unwrap_err();
        assert_eq!(err.code, "INVALID_REQUEST");

        let mut req = request(None);
        req.password = "short".into();
        let err = command::CreateUser::try_from(req).unwrap_err();
        assert_eq!(err.code, "INVALID_REQUEST");
    }

    #[test]
    fn occupied_email_is_bad_request() {
        let err = ExecutionError::EmailOccupied(
            user::Email::new("jane@example.com").unwrap(),
        )
        .into_error();

        assert_eq!(err.code, "EMAIL_ALREADY_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
