//! Server-side HTML views.
//!
//! A [`View`] is a template name plus the model handed to it. Templates are compiled into the
//! binary and looked up through a minijinja loader, so a broken template surfaces as a render
//! error on the request that uses it. `.html` templates are auto-escaped.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{Environment, Value};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::errors::Error;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("people/index.html", include_str!("../templates/people/index.html")),
    ("people/show.html", include_str!("../templates/people/show.html")),
    ("people/new.html", include_str!("../templates/people/new.html")),
    ("people/edit.html", include_str!("../templates/people/edit.html")),
    ("people/_form.html", include_str!("../templates/people/_form.html")),
    ("items/index.html", include_str!("../templates/items/index.html")),
];

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_loader(|name| Ok(TEMPLATES.iter().find(|(n, _)| *n == name).map(|(_, source)| source.to_string())));
    env
});

/// A named template and its model
#[derive(Debug, Clone)]
pub struct View {
    name: &'static str,
    status: StatusCode,
    model: Value,
}

impl View {
    /// `name` is the template path without its extension, e.g. `people/index`
    pub fn new<S: Serialize>(name: &'static str, model: S) -> Self {
        Self {
            name,
            status: StatusCode::OK,
            model: Value::from_serialize(&model),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn render(&self) -> Result<String, minijinja::Error> {
        ENV.get_template(&format!("{}.html", self.name))?.render(&self.model)
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        match self.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(e) => Error::Template(e).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_every_template_compiles() {
        for (name, _) in TEMPLATES {
            assert!(ENV.get_template(name).is_ok(), "template {name} failed to compile");
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let view = View::new(
            "items/index",
            context! {
                name => "<script>",
                items => Vec::<String>::new(),
            },
        );
        let html = view.render().unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_unknown_view_is_a_template_error() {
        let response = View::new("people/missing", ()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
