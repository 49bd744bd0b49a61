//! Read-only registry views.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use talemap_domain::{Character, CharacterId, GroupId};

use crate::app::App;

/// What a map panel needs to know about one location.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    map: String,
    location: String,
    /// Characters placed at the location, registry order.
    characters: Vec<Character>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<GroupSummary>,
    group_chat_enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    id: GroupId,
    name: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    accent: Option<String>,
}

/// GET /api/characters
pub async fn list_characters(State(app): State<Arc<App>>) -> Json<Vec<Character>> {
    Json(app.characters.list().cloned().collect())
}

/// GET /api/characters/{id}
pub async fn get_character(
    State(app): State<Arc<App>>,
    Path(id): Path<CharacterId>,
) -> Result<Json<Character>, (StatusCode, String)> {
    app.characters
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("character not found: {id}")))
}

/// GET /api/locations/{map}/{location}
pub async fn location_view(
    State(app): State<Arc<App>>,
    Path((map, location)): Path<(String, String)>,
) -> Json<LocationView> {
    let characters: Vec<Character> = app
        .characters
        .by_location(&map, &location)
        .cloned()
        .collect();
    let group = app.groups.by_location(&map, &location).next();
    let group_chat_enabled = group
        .map(|g| app.groups.is_enabled(&g.id, &app.characters))
        .unwrap_or(false);
    let group = group.map(|g| GroupSummary {
        id: g.id.clone(),
        name: g.name.clone(),
        label: g.label.clone(),
        accent: g.accent.clone(),
    });

    Json(LocationView {
        map,
        location,
        characters,
        group,
        group_chat_enabled,
    })
}
