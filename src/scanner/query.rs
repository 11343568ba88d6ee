//! Marker queries: filtering, ordering and pagination over a scan result

use crate::scanner::error::ScanError;
use crate::scanner::types::{MarkerRecord, ScanResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

/// Marker field addressable by filters and ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerField {
    Text,
    Tag,
    Author,
    Path,
    Url,
}

impl MarkerField {
    fn value<'a>(&self, record: &'a MarkerRecord) -> Option<&'a str> {
        match self {
            MarkerField::Text => Some(&record.text),
            MarkerField::Tag => Some(&record.tag),
            MarkerField::Author => record.author.as_deref(),
            MarkerField::Path => Some(&record.file_path),
            MarkerField::Url => Some(&record.view_url),
        }
    }
}

impl FromStr for MarkerField {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(MarkerField::Text),
            "tag" => Ok(MarkerField::Tag),
            "author" => Ok(MarkerField::Author),
            "path" | "file" | "filepath" => Ok(MarkerField::Path),
            "url" | "viewurl" => Ok(MarkerField::Url),
            other => Err(ScanError::Configuration {
                message: format!(
                    "Unknown marker field '{}' (expected one of: text, tag, author, path, url)",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Ordering specification, written `field` or `field=asc|desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: MarkerField,
    pub direction: SortDirection,
}

impl FromStr for OrderBy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once('=') {
            Some((field, direction)) => (field, Some(direction)),
            None => (s, None),
        };
        let direction = match direction.map(|d| d.trim().to_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) => {
                return Err(ScanError::Configuration {
                    message: format!("Unknown sort direction '{}' (expected asc or desc)", d),
                })
            }
        };
        Ok(OrderBy {
            field: field.parse()?,
            direction,
        })
    }
}

/// Substring filter on one field, written `field=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: MarkerField,
    pub value: String,
}

impl FieldFilter {
    /// Case-insensitive containment; a missing field never matches
    pub fn matches(&self, record: &MarkerRecord) -> bool {
        let needle = self.value.to_lowercase();
        self.field
            .value(record)
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    }
}

impl FromStr for FieldFilter {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s.split_once('=').ok_or_else(|| ScanError::Configuration {
            message: format!("Filter '{}' must be written as field=value", s),
        })?;
        Ok(FieldFilter {
            field: field.parse()?,
            value: value.to_string(),
        })
    }
}

/// Query over a scan result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub offset: usize,
    pub limit: Option<usize>,
    pub order_by: Option<OrderBy>,
    pub filters: Vec<FieldFilter>,
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<MarkerRecord>,
    /// Matching items before pagination
    pub total_count: usize,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn apply(&self, result: &ScanResult) -> ListPage {
        let mut items: Vec<&MarkerRecord> = result
            .items
            .iter()
            .filter(|record| self.filters.iter().all(|f| f.matches(record)))
            .collect();

        if let Some(order) = self.order_by {
            items.sort_by(|a, b| compare(order, a, b));
        }

        let total_count = items.len();
        let page = items
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        ListPage {
            items: page,
            total_count,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

// Missing values sort last in either direction
fn compare(order: OrderBy, a: &MarkerRecord, b: &MarkerRecord) -> Ordering {
    match (order.field.value(a), order.field.value(b)) {
        (Some(x), Some(y)) => {
            let ordering = x.to_lowercase().cmp(&y.to_lowercase());
            match order.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
