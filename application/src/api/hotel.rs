//! [`Hotel`]-related endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};
use common::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, hotel, room, user::Role},
    policy, query, read, Query as _,
};

use crate::{
    api::{self, valid},
    define_error, AsError, Context, Error,
};

/// [`Hotel`] representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// ID of this [`Hotel`].
    pub id: hotel::Id,

    /// ID of the [`User`] owning this [`Hotel`].
    ///
    /// [`User`]: domain::User
    pub owner_id: domain::user::Id,

    /// Name of this [`Hotel`].
    pub name: hotel::Name,

    /// Description of this [`Hotel`], if any.
    pub description: Option<hotel::Description>,

    /// City this [`Hotel`] is located in.
    pub city: hotel::City,

    /// Country this [`Hotel`] is located in.
    pub country: hotel::Country,

    /// Amenities of this [`Hotel`].
    pub amenities: Vec<hotel::Amenity>,

    /// Average review score of this [`Hotel`], if it has been reviewed.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,

    /// Number of reviews of this [`Hotel`].
    pub total_reviews: u32,
}

impl From<domain::Hotel> for Hotel {
    fn from(hotel: domain::Hotel) -> Self {
        Self {
            id: hotel.id,
            owner_id: hotel.owner_id,
            name: hotel.name,
            description: hotel.description,
            city: hotel.city,
            country: hotel.country,
            amenities: hotel.amenities,
            rating: hotel.rating.average,
            total_reviews: hotel.rating.total_reviews,
        }
    }
}

/// [`Room`] representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// ID of this [`Room`].
    pub id: room::Id,

    /// ID of the [`Hotel`] this [`Room`] belongs to.
    pub hotel_id: hotel::Id,

    /// Number of this [`Room`] within its [`Hotel`].
    pub room_number: room::Number,

    /// Type of this [`Room`].
    pub room_type: room::Kind,

    /// Price of a single night in this [`Room`].
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,

    /// Maximum number of guests this [`Room`] accommodates.
    pub max_occupancy: u16,
}

impl From<domain::Room> for Room {
    fn from(room: domain::Room) -> Self {
        Self {
            id: room.id,
            hotel_id: room.hotel_id,
            room_number: room.number,
            room_type: room.kind,
            price_per_night: room.price.get().amount(),
            max_occupancy: room.max_occupancy.get(),
        }
    }
}

/// Request body of the [`create()`] endpoint.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// Name of a new [`Hotel`].
    pub name: String,

    /// Description of a new [`Hotel`].
    #[serde(default)]
    pub description: Option<String>,

    /// City of a new [`Hotel`].
    pub city: String,

    /// Country of a new [`Hotel`].
    pub country: String,

    /// Amenities of a new [`Hotel`].
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl CreateRequest {
    /// Validates this [`CreateRequest`] into a [`command::CreateHotel`]
    /// issued by the provided [`policy::Caller`].
    fn into_command(
        self,
        caller: policy::Caller,
    ) -> Result<command::CreateHotel, Error> {
        let Self {
            name,
            description,
            city,
            country,
            amenities,
        } = self;

        Ok(command::CreateHotel {
            caller,
            name: valid(hotel::Name::new(name))?,
            description: description
                .map(|d| valid(hotel::Description::new(d)))
                .transpose()?,
            city: valid(hotel::City::new(city))?,
            country: valid(hotel::Country::new(country))?,
            amenities: amenities
                .into_iter()
                .map(|a| valid(hotel::Amenity::new(a)))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Creates a new [`Hotel`] owned by the caller.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `FORBIDDEN` - the caller is not an owner;
/// - `INVALID_REQUEST` - the request body is invalid.
#[tracing::instrument(skip_all, fields(http.route = "POST /hotels"))]
pub async fn create(
    ctx: Context,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> api::Created<Hotel> {
    policy::create_hotel(ctx.caller())
        .ok()
        .map_err(AsError::into_error)?;
    let Json(body) = body?;

    let hotel = ctx
        .service()
        .execute(body.into_command(ctx.caller())?)
        .await
        .map_err(AsError::into_error)?;

    Ok(api::created(hotel.into()))
}

/// Request body of the [`add_room()`] endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoomRequest {
    /// Number of a new [`Room`].
    pub room_number: String,

    /// Type of a new [`Room`].
    pub room_type: String,

    /// Nightly price of a new [`Room`].
    pub price_per_night: Money,

    /// Maximum number of guests of a new [`Room`].
    pub max_occupancy: u16,
}

impl AddRoomRequest {
    /// Validates this [`AddRoomRequest`] into a [`command::CreateRoom`] for
    /// the provided [`Hotel`].
    fn into_command(
        self,
        caller: policy::Caller,
        hotel_id: hotel::Id,
    ) -> Result<command::CreateRoom, Error> {
        let Self {
            room_number,
            room_type,
            price_per_night,
            max_occupancy,
        } = self;

        Ok(command::CreateRoom {
            caller,
            hotel_id,
            number: valid(room::Number::new(room_number))?,
            kind: valid(room::Kind::new(room_type))?,
            price: valid(room::Price::new(price_per_night))?,
            max_occupancy: valid(room::Occupancy::new(max_occupancy))?,
        })
    }
}

/// Adds a new [`Room`] to the [`Hotel`] owned by the caller.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `FORBIDDEN` - the caller doesn't own the [`Hotel`];
/// - `INVALID_REQUEST` - the request body is invalid;
/// - `HOTEL_NOT_FOUND` - the [`Hotel`] doesn't exist;
/// - `ROOM_ALREADY_EXISTS` - the room number is occupied in the [`Hotel`].
#[tracing::instrument(
    skip_all,
    fields(http.route = "POST /hotels/:hotel_id/rooms"),
)]
pub async fn add_room(
    ctx: Context,
    hotel_id: Result<Path<hotel::Id>, PathRejection>,
    body: Result<Json<AddRoomRequest>, JsonRejection>,
) -> api::Created<Room> {
    policy::require(ctx.caller(), Role::Owner)
        .ok()
        .map_err(AsError::into_error)?;
    let Path(hotel_id) = hotel_id?;
    let Json(body) = body?;

    let room = ctx
        .service()
        .execute(body.into_command(ctx.caller(), hotel_id)?)
        .await
        .map_err(AsError::into_error)?;

    Ok(api::created(room.into()))
}

/// Query parameters of the [`list()`] endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// City the listed [`Hotel`]s are located in.
    pub city: Option<String>,

    /// Country the listed [`Hotel`]s are located in.
    pub country: Option<String>,

    /// Lower bound of a [`Room`] nightly price.
    pub min_price: Option<Money>,

    /// Upper bound of a [`Room`] nightly price.
    pub max_price: Option<Money>,

    /// Lower bound of a [`Hotel`] rating.
    pub min_rating: Option<Decimal>,
}

impl TryFrom<ListParams> for read::hotel::list::Filter {
    type Error = Error;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let ListParams {
            city,
            country,
            min_price,
            max_price,
            min_rating,
        } = params;

        Ok(Self {
            city: city.map(|c| valid(hotel::City::new(c))).transpose()?,
            country: country
                .map(|c| valid(hotel::Country::new(c)))
                .transpose()?,
            min_price,
            max_price,
            min_rating,
        })
    }
}

/// [`Hotel`] list item representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Listed [`Hotel`].
    #[serde(flatten)]
    pub hotel: Hotel,

    /// Lowest nightly price among the [`Room`]s of the [`Hotel`].
    #[serde(with = "rust_decimal::serde::float_option")]
    pub min_price_per_night: Option<Decimal>,
}

impl From<read::hotel::list::Item> for ListItem {
    fn from(item: read::hotel::list::Item) -> Self {
        Self {
            hotel: item.hotel.into(),
            min_price_per_night: item.min_price.map(|p| p.amount()),
        }
    }
}

/// Lists [`Hotel`]s matching the provided query parameters.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `INVALID_REQUEST` - the query parameters are invalid.
#[tracing::instrument(skip_all, fields(http.route = "GET /hotels"))]
pub async fn list(
    ctx: Context,
    params: Result<Query<ListParams>, QueryRejection>,
) -> api::Result<Vec<ListItem>> {
    let Query(params) = params?;

    let items = ctx
        .service()
        .execute(query::hotels::List::by(params.try_into()?))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Envelope::success(
        items.into_iter().map(Into::into).collect(),
    ))
}

/// [`Hotel`] details representation in the HTTP API.
#[derive(Clone, Debug, Serialize)]
pub struct Details {
    /// Requested [`Hotel`].
    #[serde(flatten)]
    pub hotel: Hotel,

    /// All the [`Room`]s of the [`Hotel`].
    pub rooms: Vec<Room>,
}

/// Returns the [`Hotel`] with all its [`Room`]s.
///
/// # Errors
///
/// Possible error codes:
/// - `UNAUTHORIZED` - the request is not authenticated;
/// - `INVALID_REQUEST` - the [`Hotel`] ID is malformed;
/// - `HOTEL_NOT_FOUND` - the [`Hotel`] doesn't exist.
#[tracing::instrument(skip_all, fields(http.route = "GET /hotels/:hotel_id"))]
pub async fn details(
    ctx: Context,
    hotel_id: Result<Path<hotel::Id>, PathRejection>,
) -> api::Result<Details> {
    let Path(hotel_id) = hotel_id?;

    let hotel = ctx
        .service()
        .execute(query::hotel::ById::by(hotel_id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(NotFoundError::Hotel))?;
    let rooms = ctx
        .service()
        .execute(query::hotel::Rooms::by(hotel_id))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Envelope::success(Details {
        hotel: hotel.into(),
        rooms: rooms.into_iter().map(Into::into).collect(),
    }))
}

define_error! {
    enum NotFoundError {
        #[code = "HOTEL_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`Hotel` does not exist"]
        Hotel,
    }
}

impl AsError for command::create_hotel::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(r) => r.try_as_error(),
        }
    }
}

impl AsError for command::create_room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ROOM_ALREADY_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Room number is occupied in the `Hotel`"]
                RoomNumberOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(r) => r.try_as_error(),
            Self::HotelNotExists(_) => Some(NotFoundError::Hotel.into()),
            Self::RoomNumberOccupied(_) => {
                Some(Error::RoomNumberOccupied.into())
            }
        }
    }
}
