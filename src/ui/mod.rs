//! Presentation: status header, chart panel and footer

mod state;
mod view;

pub use state::DisplayState;
pub use view::{badge_style, chart_container, draw, format_clock, format_price, regions, Regions};
