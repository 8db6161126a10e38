// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use nl_sql_bridge::schema::{
    TABLES, VIDEO_SNAPSHOTS, VIDEOS, allowed_tables, is_allowed_table
};

#[test]
fn test_allowed_tables_exact() {
    assert_eq!(allowed_tables(), vec!["videos", "video_snapshots"]);
}

#[test]
fn test_is_allowed_table_case_insensitive() {
    assert!(is_allowed_table("videos"));
    assert!(is_allowed_table("VIDEO_SNAPSHOTS"));
    assert!(!is_allowed_table("users"));
    assert!(!is_allowed_table("public.videos"));
    assert!(!is_allowed_table(""));
}

#[test]
fn test_tables_order() {
    assert_eq!(TABLES[0].name, VIDEOS.name);
    assert_eq!(TABLES[1].name, VIDEO_SNAPSHOTS.name);
}

#[test]
fn test_video_columns() {
    for name in ["id", "creator_id", "video_created_at", "views_count"] {
        assert!(VIDEOS.column(name).is_some(), "missing column {}", name);
    }
    assert!(VIDEOS.column("delta_views_count").is_none());
}

#[test]
fn test_snapshot_columns() {
    for name in ["video_id", "views_count", "delta_views_count", "created_at"] {
        assert!(
            VIDEO_SNAPSHOTS.column(name).is_some(),
            "missing column {}",
            name
        );
    }
}
