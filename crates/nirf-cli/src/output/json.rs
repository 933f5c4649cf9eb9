use nirf_core::error::NirfError;
use nirf_core::model::ExtractionResult;

pub fn format_result(result: &ExtractionResult) -> Result<String, NirfError> {
    Ok(serde_json::to_string_pretty(result)?)
}
