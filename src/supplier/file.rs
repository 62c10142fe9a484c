use std::path::PathBuf;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;

use crate::error::SupplierError;
use crate::model::RawBar;
use crate::supplier::BarSupplier;

const SUPPLIER_NAME: &str = "file";

/// Reads `<data_dir>/<SYMBOL>.json`, a JSON array of daily rows oldest first.
///
/// The whole file is returned; the store applies the lookback after validation.
pub struct FileSupplier {
    data_dir: PathBuf,
}

impl FileSupplier {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{symbol}.json"))
    }
}

impl BarSupplier for FileSupplier {
    fn name(&self) -> &str {
        SUPPLIER_NAME
    }

    fn fetch_daily_bars(
        &self,
        symbol: &str,
        _lookback: usize,
    ) -> BoxFuture<'_, Result<Vec<RawBar>, Report<SupplierError>>> {
        let path = self.path_for(symbol);
        Box::pin(async move {
            let content = tokio::fs::read_to_string(&path)
                .await
                .change_context(SupplierError::Request {
                    supplier: SUPPLIER_NAME.into(),
                })
                .attach_with(|| format!("path: {}", path.display()))?;

            let rows: Vec<RawBar> = serde_json::from_str(&content)
                .change_context(SupplierError::ResponseParse {
                    supplier: SUPPLIER_NAME.into(),
                })
                .attach_with(|| format!("path: {}", path.display()))?;

            tracing::debug!(path = %path.display(), rows = rows.len(), "daily rows loaded from file");
            Ok(rows)
        })
    }
}
