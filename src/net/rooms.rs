//! Room collection endpoints under `/rooms`.

use serde::de::IgnoredAny;

use super::api::{ApiClient, ApiError};
use super::types::{IdentityId, NewRoom, Room, RoomId, RoomUpdate};

pub const ROOMS_PATH: &str = "/rooms";

fn room_path(id: RoomId) -> String {
    format!("{ROOMS_PATH}/{id}")
}

/// Fetch all rooms via `GET /rooms`, in server order.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn list(api: &ApiClient) -> Result<Vec<Room>, ApiError> {
    api.get(ROOMS_PATH).await
}

/// Fetch one room via `GET /rooms/{id}`.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn get(api: &ApiClient, id: RoomId) -> Result<Room, ApiError> {
    api.get(&room_path(id)).await
}

/// Create a room via `POST /rooms`.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn create(api: &ApiClient, room: &NewRoom) -> Result<Room, ApiError> {
    api.post(ROOMS_PATH, Some(room)).await
}

/// Update a room via `PUT /rooms/{id}`.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn update(api: &ApiClient, id: RoomId, update: &RoomUpdate) -> Result<Room, ApiError> {
    api.put(&room_path(id), update).await
}

/// Delete a room via `DELETE /rooms/{id}`. Any response body is ignored.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn delete(api: &ApiClient, id: RoomId) -> Result<(), ApiError> {
    let _: Option<IgnoredAny> = api.delete(&room_path(id)).await?;
    Ok(())
}

/// Add a user to a room via `POST /rooms/{room}/join/{user}`; returns the
/// room with its updated member list.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn join(api: &ApiClient, room_id: RoomId, user_id: &IdentityId) -> Result<Room, ApiError> {
    let path = format!("{}/join/{user_id}", room_path(room_id));
    api.post::<_, ()>(&path, None).await
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod tests;
