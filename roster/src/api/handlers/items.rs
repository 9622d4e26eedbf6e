use crate::AppState;
use crate::api::models::items::{ItemResponse, ListItemsQuery};
use crate::errors::Result;
use crate::services::ItemsService;
use crate::views::View;
use axum::extract::{Query, State};
use minijinja::context;

/// Items with exactly the given name. Without a name the page shows only the search box.
#[tracing::instrument(skip_all)]
pub async fn list_items(State(state): State<AppState>, Query(query): Query<ListItemsQuery>) -> Result<View> {
    let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let items: Vec<ItemResponse> = match name {
        Some(name) => ItemsService::new(state.db.clone())
            .find_by_item_name(name)
            .await?
            .into_iter()
            .map(ItemResponse::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(View::new(
        "items/index",
        context! {
            name => name,
            items => items,
        },
    ))
}
