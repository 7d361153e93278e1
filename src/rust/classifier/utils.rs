use serde::Serialize;
use serde_json::Value;

use super::error::ClassifierError;
use crate::dataset::RowItem;

/// Distinct values of `target_column` in first-seen order. Rows with an empty
/// value are skipped.
pub(crate) fn discover_labels(dataset: &[RowItem], target_column: &str) -> Result<Vec<String>, ClassifierError> {
    let mut labels: Vec<String> = Vec::new();
    for (index, row) in dataset.iter().enumerate() {
        let label = row.get(target_column).ok_or_else(|| {
            ClassifierError::ValidationError(format!(
                "Row {} has no value for target column '{}'",
                index, target_column
            ))
        })?;
        if label.is_empty() {
            log::warn!("Row {} has an empty '{}' value, skipping", index, target_column);
            continue;
        }
        if !labels.contains(label) {
            labels.push(label.clone());
        }
    }
    Ok(labels)
}

/// Stable textual form of any serializable value. Map keys come out sorted so
/// equal values always render the same text; bare strings render unquoted.
pub(crate) fn canonical_text<T: Serialize + ?Sized>(value: &T) -> Result<String, ClassifierError> {
    let value = serde_json::to_value(value)
        .map_err(|e| ClassifierError::ValidationError(format!("Input cannot be serialized: {}", e)))?;
    match value {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// `field: value` lines for a row, in column-name order.
pub(crate) fn format_row(row: &RowItem) -> String {
    row.iter()
        .map(|(field, value)| format!("{}: {}", field, value))
        .collect::<Vec<_>>()
        .join("\n")
}
