use axum::{
    Json,
    extract::{Query, State},
};
use std::collections::HashMap;

use super::ServerState;
use crate::console::console;
use crate::resources::FilteredResources;

/// Filtered resources for the destination named by the configured query
/// parameter. Unknown or missing destinations answer with empty lists.
pub async fn filtered_resources_handler(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<FilteredResources> {
    let destination = params.get(&state.query_param).map(String::as_str);
    let resources = state.catalog.filter(destination);

    let counts = resources.counts();
    console().debug(&format!(
        "{}={} -> attractions: {}, restaurants: {}, hotels: {}",
        state.query_param,
        destination.unwrap_or("<none>"),
        counts.attractions,
        counts.restaurants,
        counts.hotels
    ));

    Json(resources)
}
