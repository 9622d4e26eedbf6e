use crate::api::models::items::ItemForm;
use crate::api::models::people::{MethodOverride, PersonForm, PersonResponse, PersonSearchQuery};
use crate::errors::Result;
use crate::services::{ItemsService, PeopleService};
use crate::validation::ValidationErrors;
use crate::views::View;
use crate::{AppState, types::PersonId};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::Deserialize;

/// Body of `POST /people/{id}`: an HTML form standing in for PATCH or DELETE
#[derive(Debug, Deserialize)]
pub struct OverrideForm {
    #[serde(rename = "_method", default)]
    pub method: String,
    #[serde(flatten)]
    pub form: PersonForm,
}

fn new_form_view(form: &PersonForm, errors: &ValidationErrors) -> View {
    View::new(
        "people/new",
        context! {
            form => form,
            errors => errors.by_field(),
        },
    )
}

fn edit_form_view(id: PersonId, form: &PersonForm, errors: &ValidationErrors) -> View {
    View::new(
        "people/edit",
        context! {
            id => id,
            form => form,
            errors => errors.by_field(),
        },
    )
}

/// Everyone with their items, fetched by one joined query
#[tracing::instrument(skip_all)]
pub async fn list_people(State(state): State<AppState>) -> Result<View> {
    let people: Vec<PersonResponse> = PeopleService::new(state.db.clone())
        .find_all_with_items()
        .await?
        .into_iter()
        .map(PersonResponse::from)
        .collect();

    Ok(View::new(
        "people/index",
        context! {
            people => people,
            with_items => true,
            query => PersonSearchQuery::default(),
        },
    ))
}

#[tracing::instrument(skip_all)]
pub async fn search_people(State(state): State<AppState>, Query(query): Query<PersonSearchQuery>) -> Result<View> {
    let people: Vec<PersonResponse> = PeopleService::new(state.db.clone())
        .search(&query)
        .await?
        .into_iter()
        .map(PersonResponse::from)
        .collect();

    Ok(View::new(
        "people/index",
        context! {
            people => people,
            with_items => false,
            query => query,
        },
    ))
}

#[tracing::instrument(skip_all, fields(person_id = id))]
pub async fn show_person(State(state): State<AppState>, Path(id): Path<PersonId>) -> Result<View> {
    let person = PeopleService::new(state.db.clone()).find_one_with_items(id).await?;

    Ok(View::new(
        "people/show",
        context! {
            person => PersonResponse::from(person),
            item_form => ItemForm::default(),
            errors => ValidationErrors::default().by_field(),
        },
    ))
}

#[tracing::instrument(skip_all)]
pub async fn new_person_form() -> View {
    new_form_view(&PersonForm::default(), &ValidationErrors::default())
}

/// Validate and create. Invalid input re-renders the form with the submitted values.
#[tracing::instrument(skip_all)]
pub async fn create_person(State(state): State<AppState>, Form(form): Form<PersonForm>) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(new_form_view(&form, &errors)
                .with_status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response());
        }
    };

    PeopleService::new(state.db.clone()).create(input).await?;
    Ok(Redirect::to("/people").into_response())
}

#[tracing::instrument(skip_all, fields(person_id = id))]
pub async fn edit_person_form(State(state): State<AppState>, Path(id): Path<PersonId>) -> Result<View> {
    let person = PeopleService::new(state.db.clone()).find_one(id).await?;
    Ok(edit_form_view(id, &PersonForm::from(&person), &ValidationErrors::default()))
}

/// The path id decides which row changes; nothing in the body can redirect the update.
#[tracing::instrument(skip_all, fields(person_id = id))]
pub async fn update_person(State(state): State<AppState>, Path(id): Path<PersonId>, Form(form): Form<PersonForm>) -> Result<Response> {
    let input = match form.validate_update() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(edit_form_view(id, &form, &errors)
                .with_status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response());
        }
    };

    PeopleService::new(state.db.clone()).update(id, input).await?;
    Ok(Redirect::to("/people").into_response())
}

#[tracing::instrument(skip_all, fields(person_id = id))]
pub async fn delete_person(State(state): State<AppState>, Path(id): Path<PersonId>) -> Result<Redirect> {
    PeopleService::new(state.db.clone()).delete(id).await?;
    Ok(Redirect::to("/people"))
}

#[tracing::instrument(skip_all, fields(person_id = id, method = %body.method))]
pub async fn override_person(state: State<AppState>, Path(id): Path<PersonId>, Form(body): Form<OverrideForm>) -> Result<Response> {
    match body.method.parse::<MethodOverride>()? {
        MethodOverride::Patch => update_person(state, Path(id), Form(body.form)).await,
        MethodOverride::Delete => Ok(delete_person(state, Path(id)).await?.into_response()),
    }
}

/// Add an item to a person, then go back to that person's page
#[tracing::instrument(skip_all, fields(person_id = id))]
pub async fn add_item(State(state): State<AppState>, Path(id): Path<PersonId>, Form(form): Form<ItemForm>) -> Result<Response> {
    let item_name = match form.validate() {
        Ok(item_name) => item_name,
        Err(errors) => {
            let person = PeopleService::new(state.db.clone()).find_one_with_items(id).await?;
            return Ok(View::new(
                "people/show",
                context! {
                    person => PersonResponse::from(person),
                    item_form => form,
                    errors => errors.by_field(),
                },
            )
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response());
        }
    };

    let item = ItemsService::new(state.db.clone()).add_item(id, item_name).await?;
    tracing::debug!(item_id = item.id, "item added");

    Ok(Redirect::to(&format!("/people/{id}")).into_response())
}
