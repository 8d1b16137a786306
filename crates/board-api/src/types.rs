//! API request and response types.

use crate::boards::{BoardDefinition, ProcessingMode};
use board_pipeline::{Group, GroupKey, LabelFormat};
use board_types::{BoardRequest, Record};
use serde::{Deserialize, Serialize};

/// How a query wants its page grouped.
///
/// Serialized externally tagged: `{"field": "chain"}`, `{"week_of": "date"}`
/// or `{"label": "All"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSpec {
    /// One group per value of a field, label capitalized.
    Field(String),
    /// One group per Sunday-start week of a date field.
    WeekOf(String),
    /// Everything under one label.
    Label(String),
}

impl GroupSpec {
    /// Build the pipeline group key.
    pub fn to_group_key(&self) -> GroupKey {
        match self {
            GroupSpec::Field(field) => GroupKey::field(field.clone(), LabelFormat::Capitalize),
            GroupSpec::WeekOf(field) => GroupKey::week_of(field.clone()),
            GroupSpec::Label(label) => GroupKey::singleton(label.clone()),
        }
    }
}

/// Body of `POST /v1/boards/:board/query`.
///
/// The upstream request shape plus presentation-only grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardQueryRequest {
    /// Filters, sort and pagination.
    #[serde(flatten)]
    pub request: BoardRequest,

    /// Optional grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupSpec>,

    /// Label of the implicit group when `group_by` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group_label: Option<String>,
}

/// A group in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResponse {
    /// Group identity.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Filtered records in the group across all pages.
    pub total_in_group: usize,
    /// Records of the group on this page.
    pub items: Vec<Record>,
}

impl From<&Group<'_>> for GroupResponse {
    fn from(group: &Group<'_>) -> Self {
        Self {
            key: group.key.clone(),
            label: group.label.clone(),
            total_in_group: group.total_in_group,
            items: group.items.iter().map(|record| (*record).clone()).collect(),
        }
    }
}

/// Page metadata in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Page that was served.
    pub page: usize,
    /// Page the client asked for.
    pub requested_page: usize,
    /// Page size.
    pub per_page: usize,
    /// Filtered record count. Unknown for server-processed boards.
    pub total_count: Option<usize>,
    /// Page count. Unknown for server-processed boards.
    pub total_pages: Option<usize>,
    /// Whether no further pages exist.
    pub is_last_page: bool,
}

/// Response of `POST /v1/boards/:board/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardQueryResponse {
    /// Board name.
    pub board: String,
    /// Where the query was processed.
    pub mode: ProcessingMode,
    /// Groups, in order of first appearance.
    pub groups: Vec<GroupResponse>,
    /// Page metadata.
    pub pagination: PageResponse,
}

impl BoardQueryResponse {
    /// All records on the page, in order.
    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.groups.iter().flat_map(|group| group.items.iter())
    }
}

/// Response of `GET /v1/boards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardListResponse {
    /// Number of boards.
    pub count: usize,
    /// Boards, ordered by name.
    pub boards: Vec<BoardDefinition>,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
}
