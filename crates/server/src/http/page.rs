//! Server-rendered cache admin page.
//!
//! Deleting a key takes two clicks. A row's `Delete` link re-renders the
//! listing with that row armed, and only an armed row carries the form that
//! posts the delete. Navigating anywhere else drops the armed state.

use cairn_core::CacheBackend;
use cairn_core::cache::MAX_LIST_LIMIT;
use cairn_core::interaction::{ControlEvent, DoubleCheck};
use minijinja::{Environment, context};
use serde::Serialize;

use super::cache::CachePage;

const CACHE_TEMPLATE: &str = "cache.html";

const DELETE_LABEL: &str = "Delete";
const CONFIRM_LABEL: &str = "Confirm?";

/// The row a previous `Delete` click armed, carried as `arm=<backend>:<key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedKey {
    pub backend: CacheBackend,
    pub key: String,
}

impl ArmedKey {
    /// Parse an `arm` parameter. Unknown backends arm nothing.
    pub fn parse(raw: &str) -> Option<Self> {
        let (backend, key) = raw.split_once(':')?;
        Some(Self { backend: backend.parse().ok()?, key: key.to_string() })
    }

    fn matches(&self, backend: CacheBackend, key: &str) -> bool {
        self.backend == backend && self.key == key
    }
}

#[derive(Serialize)]
struct Row<'a> {
    key: &'a str,
    label: &'static str,
    armed: bool,
    arm_href: String,
}

#[derive(Serialize)]
struct Section<'a> {
    backend: CacheBackend,
    rows: Vec<Row<'a>>,
}

/// Compiled page templates. `.html` templates auto-escape every value.
#[derive(Debug)]
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(CACHE_TEMPLATE, include_str!("../../templates/cache.html"))?;
        Ok(Self { env })
    }

    pub fn cache_page(&self, page: &CachePage, armed: Option<&ArmedKey>) -> Result<String, minijinja::Error> {
        let sections: Vec<Section<'_>> = CacheBackend::ALL
            .into_iter()
            .map(|backend| Section {
                backend,
                rows: page.keys.keys(backend).iter().map(|key| row(page, backend, key, armed)).collect(),
            })
            .collect();

        self.env
            .get_template(CACHE_TEMPLATE)?
            .render(context! { page, sections, max_limit => MAX_LIST_LIMIT })
    }
}

fn row<'a>(page: &CachePage, backend: CacheBackend, key: &'a str, armed: Option<&ArmedKey>) -> Row<'a> {
    let mut check = DoubleCheck::new();
    if armed.is_some_and(|armed| armed.matches(backend, key)) {
        check.activate(&mut ControlEvent::activate());
    }
    Row {
        key,
        label: check.label(DELETE_LABEL, CONFIRM_LABEL),
        armed: check.is_armed(),
        arm_href: arm_href(page, backend, key),
    }
}

/// This listing with `key` armed.
fn arm_href(page: &CachePage, backend: CacheBackend, key: &str) -> String {
    let mut pairs = url::form_urlencoded::Serializer::new(String::new());
    if let Some(query) = &page.query {
        pairs.append_pair("query", query);
    }
    pairs
        .append_pair("limit", &page.limit.to_string())
        .append_pair("instance", &page.instance)
        .append_pair("arm", &format!("{backend}:{key}"));
    format!("/admin/cache?{}", pairs.finish())
}
