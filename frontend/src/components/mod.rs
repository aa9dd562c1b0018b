pub mod synced_scroll_bridge;
