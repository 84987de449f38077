/// SORT tracker implementations (single session and multi-scene batch)
///
pub mod sort;

/// Track identity sources
pub mod track_id;
