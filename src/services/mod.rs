// Service exports
pub mod cache;
pub mod distance;
pub mod postgres;
pub mod settings_store;
pub mod spreadsheet;
pub mod workbook;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use distance::{DistanceError, DistanceMatrixClient};
pub use postgres::{PostgresClient, PostgresError};
pub use settings_store::{SettingsError, SettingsStore};
pub use spreadsheet::{SpreadsheetError, SpreadsheetChecker, SpreadsheetCheck};
pub use workbook::{SheetImport, WorkbookError};
