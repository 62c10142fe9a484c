use std::path::Path;

use error_stack::{Report, ResultExt};

use crate::analysis::AnalysisBatch;
use crate::error::ExportError;

/// Write `batch` as pretty-printed JSON, creating parent directories as needed.
pub fn save(path: &Path, batch: &AnalysisBatch) -> Result<(), Report<ExportError>> {
    let json = serde_json::to_string_pretty(batch).change_context(ExportError::Serialize)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .change_context(ExportError::Write)
            .attach_with(|| format!("path: {}", parent.display()))?;
    }
    std::fs::write(path, json)
        .change_context(ExportError::Write)
        .attach_with(|| format!("path: {}", path.display()))?;

    tracing::info!(path = %path.display(), tickers = batch.len(), "analysis batch saved");
    Ok(())
}

/// Read a batch previously written by [`save`].
pub fn load(path: &Path) -> Result<AnalysisBatch, Report<ExportError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ExportError::Read)
        .attach_with(|| format!("path: {}", path.display()))?;

    serde_json::from_str(&content)
        .change_context(ExportError::Parse)
        .attach_with(|| format!("path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::{NamedTempFile, tempdir};

    use crate::analysis::Analyzer;
    use crate::config::AnalysisConfig;
    use crate::indicator::test_support::bars_from_closes;
    use crate::model::Ticker;

    #[test]
    fn saved_batch_loads_back_equal() {
        let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + i as f64 * 0.75).collect();
        let bars = bars_from_closes(&closes);

        let mut batch = AnalysisBatch::new();
        batch.push(analyzer.outcome(&Ticker::new("AMZN", "Amazon"), Ok(&bars)));
        batch.push(analyzer.outcome(&Ticker::new("NFLX", "Netflix"), Ok(&[])));

        let dir = tempdir().unwrap();
        // parent directories are created on save
        let path = dir.path().join("runs").join("stock_analysis.json");
        save(&path, &batch).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, batch);
        assert_eq!(loaded.run_id, batch.run_id);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err.current_context(), ExportError::Read));
    }

    #[test]
    fn garbage_is_parse_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[1, 2, 3]").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err.current_context(), ExportError::Parse));
    }
}
