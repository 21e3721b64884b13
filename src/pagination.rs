use serde::Serialize;

/// Page sizes offered by the tables.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

const PAGE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(usize),
    All,
}

impl PageSize {
    /// `all` / `-1` show everything; anything that is not an offered size
    /// falls back to `default`.
    pub fn from_param(raw: Option<&str>, default: usize) -> Self {
        match raw.map(str::trim) {
            Some("all") | Some("-1") => Self::All,
            Some(value) => match value.parse::<usize>() {
                Ok(size) if PAGE_SIZE_OPTIONS.contains(&size) => Self::Limited(size),
                _ => Self::Limited(default.max(1)),
            },
            None => Self::Limited(default.max(1)),
        }
    }

    pub fn as_param(self) -> String {
        match self {
            Self::Limited(size) => size.to_string(),
            Self::All => "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: usize,
    pub current: bool,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based index of the first shown row, 0 when empty.
    pub first_row: usize,
    pub last_row: usize,
    pub size: PageSize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Up to five page numbers centred on the current page.
    pub fn links(&self) -> Vec<PageLink> {
        let shown = self.total_pages.min(PAGE_WINDOW);
        let start = self
            .number
            .saturating_sub(2)
            .min(self.total_pages.saturating_sub(PAGE_WINDOW - 1))
            .max(1);
        (start..start + shown)
            .map(|number| PageLink {
                number,
                current: number == self.number,
            })
            .collect()
    }
}

/// Slices `items` to the requested page, clamping the page into range.
pub fn paginate<T>(items: Vec<T>, requested: usize, size: PageSize) -> Page<T> {
    let total_items = items.len();
    let per_page = match size {
        PageSize::Limited(per_page) => per_page.max(1),
        PageSize::All => total_items.max(1),
    };
    let total_pages = total_items.div_ceil(per_page);
    let number = requested.clamp(1, total_pages.max(1));
    let start = (number - 1) * per_page;
    let end = (start + per_page).min(total_items);

    let items = items.into_iter().skip(start).take(end - start).collect();
    Page {
        items,
        number,
        total_pages,
        total_items,
        first_row: if total_items == 0 { 0 } else { start + 1 },
        last_row: end,
        size,
    }
}
