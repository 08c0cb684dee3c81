use crate::error::MediaError;
use crate::services::mime_registry::GenericType;
use crate::services::thumbnail_service::ThumbnailResult;
use chrono::Duration;
use sea_orm::Order;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::TempPath;
use utoipa::ToSchema;

/// File columns of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Display name as uploaded
    pub name: String,
    pub name_on_disk: String,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NewMediaObject {
    pub description: Option<String>,
    pub tags: Option<String>,
    pub file: Option<StoredFile>,
    pub preview: Option<ThumbnailResult>,
}

/// Partial update. The outer `Option` selects the column group, an inner
/// `None` clears it.
#[derive(Debug, Clone, Default)]
pub struct MediaObjectChanges {
    pub description: Option<Option<String>>,
    pub tags: Option<Option<String>>,
    pub file: Option<Option<StoredFile>>,
    pub preview: Option<Option<ThumbnailResult>>,
}

impl MediaObjectChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.tags.is_none()
            && self.file.is_none()
            && self.preview.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Timeframe {
    #[serde(rename = "last24hours")]
    Last24Hours,
    #[serde(rename = "last7days")]
    Last7Days,
    #[serde(rename = "last14days")]
    Last14Days,
    #[serde(rename = "last30days")]
    Last30Days,
    #[serde(rename = "last60days")]
    Last60Days,
    #[serde(rename = "last90days")]
    Last90Days,
    #[serde(rename = "last180days")]
    Last180Days,
    #[serde(rename = "last365days")]
    Last365Days,
}

impl Timeframe {
    pub fn duration(self) -> Duration {
        match self {
            Timeframe::Last24Hours => Duration::hours(24),
            Timeframe::Last7Days => Duration::days(7),
            Timeframe::Last14Days => Duration::days(14),
            Timeframe::Last30Days => Duration::days(30),
            Timeframe::Last60Days => Duration::days(60),
            Timeframe::Last90Days => Duration::days(90),
            Timeframe::Last180Days => Duration::days(180),
            Timeframe::Last365Days => Duration::days(365),
        }
    }
}

impl FromStr for Timeframe {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last24hours" => Ok(Timeframe::Last24Hours),
            "last7days" => Ok(Timeframe::Last7Days),
            "last14days" => Ok(Timeframe::Last14Days),
            "last30days" => Ok(Timeframe::Last30Days),
            "last60days" => Ok(Timeframe::Last60Days),
            "last90days" => Ok(Timeframe::Last90Days),
            "last180days" => Ok(Timeframe::Last180Days),
            "last365days" => Ok(Timeframe::Last365Days),
            other => Err(MediaError::invalid(format!("Unknown timeframe '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMacro {
    Name,
    DateAdded,
    DateModified,
}

/// Parses `NAME`, `DATE_ADDED:DESC` and friends. Direction defaults to ascending.
pub fn parse_order_macro(value: &str) -> Result<(OrderMacro, Order), MediaError> {
    let (name, direction) = value.split_once(':').unwrap_or((value, "ASC"));
    let order_macro = match name.trim() {
        "NAME" => OrderMacro::Name,
        "DATE_ADDED" => OrderMacro::DateAdded,
        "DATE_MODIFIED" => OrderMacro::DateModified,
        other => {
            return Err(MediaError::invalid(format!(
                "Unknown order macro '{}'",
                other
            )));
        }
    };
    let order = match direction.trim().to_ascii_uppercase().as_str() {
        "ASC" => Order::Asc,
        "DESC" => Order::Desc,
        other => {
            return Err(MediaError::invalid(format!(
                "Unknown sort direction '{}'",
                other
            )));
        }
    };
    Ok((order_macro, order))
}

#[derive(Debug, Clone, Default)]
pub struct SelectObjectsOptions {
    pub id: Option<i32>,
    pub types: BTreeSet<GenericType>,
    pub tags: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub order: Option<(OrderMacro, Order)>,
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct CountObjectsOptions {
    pub types: BTreeSet<GenericType>,
    pub tags: Option<String>,
    pub timeframe: Option<Timeframe>,
}

/// An upload staged in a temp file. The temp file is deleted on drop unless
/// it was moved into the store.
#[derive(Debug)]
pub struct UploadedFile {
    pub original_name: String,
    pub temp_path: TempPath,
    pub size: u64,
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn path(&self) -> PathBuf {
        self.temp_path.to_path_buf()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Updated,
    /// Metadata was saved but the replacement file collided with another object.
    FileNameTaken,
}
