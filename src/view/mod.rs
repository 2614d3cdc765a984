//! View module - HTML pages for the web front-end
//!
//! - `utils`: escaping helpers
//! - `layout`: page shell and navigation bar
//! - `content`: the individual pages

mod utils;
mod layout;
mod content;

pub use content::{index_page, login_page, search_page, sign_up_page};
pub use utils::escape_html;
