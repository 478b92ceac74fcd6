pub mod browser;
pub mod extract;
pub mod http;
pub mod session;
pub mod traits;
pub mod types;

pub use browser::BrowserBackend;
pub use http::HttpBackend;
pub use session::StayScraper;
pub use traits::{FieldLocator, ListingBackend};
pub use types::{ProgressSink, RunFlag};
