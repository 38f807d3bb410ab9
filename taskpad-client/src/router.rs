//! Fragment router
//!
//! [`ViewRouter`] maps location fragments (`#/tasks`) to templates, renders
//! the matching template into a [`Container`] and then runs the route's init
//! callback. Protected routes require a logged-in [`ClientSession`] and
//! otherwise fall back to the root view.

use crate::{
    session::ClientSession,
    templates::{TemplateRegistry, LOGIN_TEMPLATE, REGISTER_TEMPLATE, TASKS_TEMPLATE},
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

/// Markup shown when no route matches
pub const NOT_FOUND_HTML: &str = "<h1>404 - Page Not Found</h1>";

/// Markup shown when a route's template is missing
pub const LOAD_ERROR_HTML: &str = "<h1>Error Loading Template</h1>";

pub const ROOT_PATH: &str = "/";
pub const REGISTER_PATH: &str = "/register";
pub const TASKS_PATH: &str = "/tasks";

/// Callback run after a route's template is rendered
pub type InitFn = Arc<dyn Fn(&Container) + Send + Sync>;

/// Render target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    html: String,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current markup
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Replaces the markup
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }
}

/// A routable view
#[derive(Clone)]
pub struct Route {
    template: String,
    init: Option<InitFn>,
    protected: bool,
}

impl Route {
    /// Public route rendering `template`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            init: None,
            protected: false,
        }
    }

    /// Requires a logged-in session
    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    /// Runs `init` after every render of this route
    pub fn on_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&Container) + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }
}

/// Result of handling a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Template rendered for `path`
    Rendered { path: String },

    /// `from` needs a session; the root view was handled instead
    Redirected { from: String, to: String },

    /// No route for `path`
    NotFound { path: String },

    /// Route exists but its template does not
    LoadError { path: String, template: String },
}

/// Location fragment → view
pub struct ViewRouter {
    routes: HashMap<String, Route>,
    templates: TemplateRegistry,
    session: ClientSession,
    container: Container,
    current: Option<String>,
}

impl ViewRouter {
    pub fn new(templates: TemplateRegistry, session: ClientSession) -> Self {
        Self {
            routes: HashMap::new(),
            templates,
            session,
            container: Container::new(),
            current: None,
        }
    }

    /// Registers `route` at `path` (normalized), replacing any previous one
    pub fn add_route(&mut self, path: &str, route: Route) -> &mut Self {
        self.routes.insert(normalize_fragment(path), route);
        self
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    /// Path of the last handled location
    pub fn current_path(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Renders the view for `fragment`
    pub fn handle_location(&mut self, fragment: &str) -> Navigation {
        let path = normalize_fragment(fragment);

        let Some(route) = self.routes.get(&path).cloned() else {
            debug!(%path, "No route");
            self.container.set_html(NOT_FOUND_HTML);
            self.current = Some(path.clone());
            return Navigation::NotFound { path };
        };

        if route.protected && !self.session.is_logged_in() && path != ROOT_PATH {
            debug!(%path, "Protected view without session, redirecting");
            self.handle_location(ROOT_PATH);
            return Navigation::Redirected {
                from: path,
                to: ROOT_PATH.to_string(),
            };
        }

        self.current = Some(path.clone());

        let Some(markup) = self.templates.get(&route.template) else {
            warn!(%path, template = %route.template, "Template not found");
            self.container.set_html(LOAD_ERROR_HTML);
            return Navigation::LoadError {
                path,
                template: route.template,
            };
        };

        self.container.set_html(markup);
        if let Some(init) = &route.init {
            init(&self.container);
        }

        Navigation::Rendered { path }
    }
}

/// Normalizes a location fragment to a route path
///
/// Strips the leading `#`, any query and trailing slashes; the empty
/// fragment is `/`.
pub fn normalize_fragment(fragment: &str) -> String {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let path = fragment.split('?').next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');

    if trimmed.is_empty() {
        ROOT_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// The Taskpad view set
pub struct TaskpadRouter;

impl TaskpadRouter {
    /// Router with `/` (login), `/register` and the protected `/tasks`,
    /// using the built-in templates
    pub fn standard(session: ClientSession) -> ViewRouter {
        Self::with_templates(TemplateRegistry::standard(), session)
    }

    /// Same routes over caller-supplied templates
    pub fn with_templates(templates: TemplateRegistry, session: ClientSession) -> ViewRouter {
        let mut router = ViewRouter::new(templates, session);
        router
            .add_route(ROOT_PATH, Route::new(LOGIN_TEMPLATE))
            .add_route(REGISTER_PATH, Route::new(REGISTER_TEMPLATE))
            .add_route(TASKS_PATH, Route::new(TASKS_TEMPLATE).protected());
        router
    }
}
