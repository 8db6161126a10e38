//! Description of the tables the assistant may read.
//!
//! The analytics database exposes exactly two tables:
//!
//! - `videos` - final statistics per video
//! - `video_snapshots` - hourly measurements per video, with deltas since the
//!   previous measurement of the same video
//!
//! These descriptors are the single source of the validator allow-list.
//!
//! # Example
//!
//! ```
//! use nl_sql_bridge::schema::{allowed_tables, is_allowed_table};
//!
//! assert_eq!(allowed_tables(), vec!["videos", "video_snapshots"]);
//! assert!(is_allowed_table("VIDEOS"));
//! assert!(!is_allowed_table("users"));
//! ```

/// A column of a readable table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnInfo {
    /// Column name
    pub name:      &'static str,
    /// Postgres data type
    pub data_type: &'static str
}

/// A readable table.
#[derive(Debug, Clone, Copy)]
pub struct TableInfo {
    /// Table name as it appears in SQL
    pub name:        &'static str,
    /// One-line description
    pub description: &'static str,
    /// Ordered list of columns
    pub columns:     &'static [ColumnInfo]
}

const fn col(name: &'static str, data_type: &'static str) -> ColumnInfo {
    ColumnInfo {
        name,
        data_type
    }
}

/// Final statistics per video.
pub const VIDEOS: TableInfo = TableInfo {
    name:        "videos",
    description: "final statistics per video",
    columns:     &[
        col("id", "VARCHAR"),
        col("creator_id", "VARCHAR"),
        col("video_created_at", "TIMESTAMP"),
        col("views_count", "INTEGER"),
        col("likes_count", "INTEGER"),
        col("comments_count", "INTEGER"),
        col("reports_count", "INTEGER"),
        col("created_at", "TIMESTAMP"),
        col("updated_at", "TIMESTAMP")
    ]
};

/// Hourly measurements per video.
pub const VIDEO_SNAPSHOTS: TableInfo = TableInfo {
    name:        "video_snapshots",
    description: "hourly measurements per video with deltas since the previous one",
    columns:     &[
        col("id", "VARCHAR"),
        col("video_id", "VARCHAR"),
        col("views_count", "INTEGER"),
        col("likes_count", "INTEGER"),
        col("comments_count", "INTEGER"),
        col("reports_count", "INTEGER"),
        col("delta_views_count", "INTEGER"),
        col("delta_likes_count", "INTEGER"),
        col("delta_comments_count", "INTEGER"),
        col("delta_reports_count", "INTEGER"),
        col("created_at", "TIMESTAMP"),
        col("updated_at", "TIMESTAMP")
    ]
};

/// All readable tables.
pub const TABLES: [TableInfo; 2] = [VIDEOS, VIDEO_SNAPSHOTS];

/// Names of the readable tables.
pub fn allowed_tables() -> Vec<&'static str> {
    TABLES.iter().map(|t| t.name).collect()
}

/// Case-insensitive allow-list lookup
pub fn is_allowed_table(name: &str) -> bool {
    TABLES.iter().any(|t| t.name.eq_ignore_ascii_case(name))
}

impl TableInfo {
    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_table_has_deltas() {
        for metric in ["views", "likes", "comments", "reports"] {
            let name = format!("delta_{}_count", metric);
            assert!(VIDEO_SNAPSHOTS.column(&name).is_some(), "{}", name);
            assert!(VIDEOS.column(&name).is_none());
        }
    }

    #[test]
    fn test_video_id_references_videos() {
        assert!(VIDEO_SNAPSHOTS.column("video_id").is_some());
        assert!(VIDEOS.column("id").is_some());
    }
}
