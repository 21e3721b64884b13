pub mod api;
pub mod payments;
pub mod public;
pub mod trips;

use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    pagination::{Page, PageLink, PageSize, PAGE_SIZE_OPTIONS},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(public::router())
        .nest("/trips", trips::router())
        .nest("/payments", payments::router())
        .nest("/api", api::router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pagination controls as the templates consume them.
#[derive(Debug, Clone)]
pub(crate) struct Pager {
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub first_row: usize,
    pub last_row: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: usize,
    pub next: usize,
    pub links: Vec<PageLink>,
    pub per_page: String,
    pub sizes: Vec<SizeOption>,
}

#[derive(Debug, Clone)]
pub(crate) struct SizeOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl<T> From<&Page<T>> for Pager {
    fn from(page: &Page<T>) -> Self {
        let mut sizes: Vec<SizeOption> = PAGE_SIZE_OPTIONS
            .iter()
            .map(|size| SizeOption {
                value: size.to_string(),
                label: size.to_string(),
                selected: page.size == PageSize::Limited(*size),
            })
            .collect();
        sizes.push(SizeOption {
            value: PageSize::All.as_param(),
            label: "∞".into(),
            selected: page.size == PageSize::All,
        });

        Self {
            number: page.number,
            total_pages: page.total_pages,
            total_items: page.total_items,
            first_row: page.first_row,
            last_row: page.last_row,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.number.saturating_sub(1).max(1),
            next: (page.number + 1).min(page.total_pages.max(1)),
            links: page.links(),
            per_page: page.size.as_param(),
            sizes,
        }
    }
}

/// Parses a `page` query value, treating anything odd as the first page.
pub(crate) fn page_number(raw: Option<&str>) -> usize {
    raw.and_then(|raw| raw.trim().parse().ok()).unwrap_or(1)
}

/// Only same-site paths are accepted as redirect targets.
pub(crate) fn local_path(raw: Option<&str>, fallback: &'static str) -> String {
    match raw.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::paginate;

    #[test]
    fn pager_marks_selected_size() {
        let page = paginate((0..30).collect::<Vec<u8>>(), 2, PageSize::Limited(25));
        let pager = Pager::from(&page);
        assert_eq!((pager.previous, pager.next), (1, 2));
        assert_eq!(pager.sizes.iter().filter(|size| size.selected).count(), 1);
        assert!(pager.sizes[1].selected);
        assert_eq!(pager.sizes.last().map(|size| size.value.as_str()), Some("all"));
    }

    #[test]
    fn redirect_targets_stay_local() {
        assert_eq!(local_path(Some("/payments?page=2"), "/trips"), "/payments?page=2");
        assert_eq!(local_path(Some("https://evil.test"), "/trips"), "/trips");
        assert_eq!(local_path(Some("//evil.test"), "/trips"), "/trips");
        assert_eq!(local_path(None, "/trips"), "/trips");
        assert_eq!(page_number(Some("x")), 1);
        assert_eq!(page_number(Some("4")), 4);
    }
}
