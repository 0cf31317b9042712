pub mod info;
pub mod names;
pub mod preview;
pub mod split;

use crate::naming::YearPrefix;
use crate::pdf::preview::MediaBoxRenderer;
use crate::session::Session;

/// A session for one-shot commands that never show previews.
fn headless_session(prefix: YearPrefix) -> Session {
    Session::new(Box::new(MediaBoxRenderer)).with_year_prefix(prefix)
}
