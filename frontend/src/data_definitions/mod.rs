pub mod listing_url_state;
pub mod url_param;
