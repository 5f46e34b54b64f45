// results/error.rs

/// Report generation and (de)serialization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultGenerationError {
    #[error("Report '{report_id}' was exported before it was finalized")]
    ReportNotFinalized { report_id: String },

    #[error("Failed to serialize report '{report_id}' to {format} format: {cause}")]
    JsonSerializationFailed {
        report_id: String,
        format: String,
        cause: String,
    },

    #[error("Failed to deserialize {source_type} from JSON: {cause}")]
    JsonDeserializationFailed { source_type: String, cause: String },
}

impl ResultGenerationError {
    pub fn report_not_finalized(report_id: &str) -> Self {
        Self::ReportNotFinalized {
            report_id: report_id.to_string(),
        }
    }

    pub fn json_serialization_failed(report_id: &str, format: &str, cause: &str) -> Self {
        Self::JsonSerializationFailed {
            report_id: report_id.to_string(),
            format: format.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn json_deserialization_failed(source_type: &str, cause: &str) -> Self {
        Self::JsonDeserializationFailed {
            source_type: source_type.to_string(),
            cause: cause.to_string(),
        }
    }
}
