//! Search filters and the URL query contract.
//!
//! The query string is the only source of truth for filters: every render
//! re-parses it, and every filter change is expressed as a new query string.
//!
//! ```text
//! /search?page=3&breed=Poodle&sortBy=age&sort=desc
//! ```
//!
//! All parameters are optional. Missing or malformed values fall back to
//! `page=1`, `breed=All breeds`, `sort=asc`, `sortBy=breed`.

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::pagination::MAX_RESULT_WINDOW;

/// Sentinel breed value meaning "no breed filter".
pub const ALL_BREEDS: &str = "All breeds";

/// Breed filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Breed {
    #[default]
    All,
    Named(String),
}

impl Breed {
    /// Parse a decoded query value. Empty input and the sentinel both mean `All`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_BREEDS {
            Self::All
        } else {
            Self::Named(value.to_owned())
        }
    }

    /// The value written to the URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_BREEDS,
            Self::Named(name) => name,
        }
    }

    /// The breed to send to the remote search, if any.
    #[must_use]
    pub fn as_filter(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Breed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Field the results are sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Age,
    #[default]
    Breed,
    Name,
}

impl SortField {
    pub const ALL: [Self; 3] = [Self::Age, Self::Breed, Self::Name];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "age" => Some(Self::Age),
            "breed" => Some(Self::Breed),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Breed => "breed",
            Self::Name => "name",
        }
    }

    /// Human label for the sort control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Breed => "Breed",
            Self::Name => "Name",
        }
    }
}

/// The filter tuple `(breed, sort, sortBy, page)` that fully determines a
/// search result set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    pub breed: Breed,
    pub sort: SortDirection,
    pub sort_by: SortField,
    pub page: NonZeroU32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            breed: Breed::All,
            sort: SortDirection::Asc,
            sort_by: SortField::Breed,
            page: NonZeroU32::MIN,
        }
    }
}

/// Partial filter overrides applied by [`Filters::navigate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub breed: Option<Breed>,
    pub sort: Option<SortDirection>,
    pub sort_by: Option<SortField>,
    pub page: Option<NonZeroU32>,
}

/// Parameters of one remote id search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Number of ids requested.
    pub size: u32,
    /// Zero-based offset of the first id.
    pub from: u32,
    /// `<field>:<asc|desc>`.
    pub sort: String,
    pub breed: Option<String>,
}

impl SearchRequest {
    /// Whether the request falls entirely past the remote result window.
    #[must_use]
    pub const fn is_out_of_window(&self) -> bool {
        self.size == 0
    }

    /// Query pairs for `/dogs/search`.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("sort", self.sort.clone()),
            ("size", self.size.to_string()),
            ("from", self.from.to_string()),
        ];
        if let Some(breed) = &self.breed {
            pairs.push(("breeds", breed.clone()));
        }
        pairs
    }
}

impl Filters {
    /// Parse filters from a raw (still encoded) query string.
    ///
    /// Never fails: each absent or malformed parameter takes its default, and
    /// when a key repeats the first occurrence wins.
    #[must_use]
    pub fn from_query(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut page = None;
        let mut breed = None;
        let mut sort = None;
        let mut sort_by = None;

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match &*key {
                "page" if page.is_none() => page = Some(parse_page(&value)),
                "breed" if breed.is_none() => breed = Some(Breed::parse(&value)),
                "sort" if sort.is_none() => sort = Some(SortDirection::parse(&value)),
                "sortBy" if sort_by.is_none() => sort_by = Some(SortField::parse(&value)),
                _ => {}
            }
        }

        let defaults = Self::default();
        Self {
            breed: breed.unwrap_or(defaults.breed),
            sort: sort.flatten().unwrap_or(defaults.sort),
            sort_by: sort_by.flatten().unwrap_or(defaults.sort_by),
            page: page.flatten().unwrap_or(defaults.page),
        }
    }

    /// Canonical query string for these filters, without the leading `?`.
    #[must_use]
    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("page", &self.page.to_string())
            .append_pair("breed", self.breed.as_str())
            .append_pair("sortBy", self.sort_by.as_str())
            .append_pair("sort", self.sort.as_str())
            .finish()
    }

    /// Merge overrides onto these filters.
    ///
    /// The page resets to 1 whenever the breed, sort field or sort direction
    /// changes; otherwise an explicit page override is honoured.
    #[must_use]
    pub fn navigate(&self, update: FilterUpdate) -> Self {
        let breed = update.breed.unwrap_or_else(|| self.breed.clone());
        let sort = update.sort.unwrap_or(self.sort);
        let sort_by = update.sort_by.unwrap_or(self.sort_by);

        let reset = breed != self.breed || sort != self.sort || sort_by != self.sort_by;
        let page = if reset {
            NonZeroU32::MIN
        } else {
            update.page.unwrap_or(self.page)
        };

        Self {
            breed,
            sort,
            sort_by,
            page,
        }
    }

    /// Same filters on another page.
    #[must_use]
    pub fn with_page(&self, page: NonZeroU32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Zero-based offset of the first result on this page.
    #[must_use]
    pub const fn offset(&self, page_size: u32) -> u32 {
        (self.page.get() - 1).saturating_mul(page_size)
    }

    /// Build the remote id search for this page.
    ///
    /// The size is clamped so `from + size` never exceeds the remote window;
    /// a page entirely past the window gets size 0.
    #[must_use]
    pub fn search_request(&self, page_size: u32) -> SearchRequest {
        let from = self.offset(page_size);
        let size = page_size.min(MAX_RESULT_WINDOW.saturating_sub(from));
        SearchRequest {
            size,
            from,
            sort: format!("{}:{}", self.sort_by.as_str(), self.sort.as_str()),
            breed: self.breed.as_filter().map(str::to_owned),
        }
    }
}

fn parse_page(value: &str) -> Option<NonZeroU32> {
    value.trim().parse::<NonZeroU32>().ok()
}
