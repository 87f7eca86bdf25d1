use thiserror::Error;

/// Errors raised by the alignment core.
///
/// Every variant is raised at the point of detection; none of them leave a
/// [`Borehole`](crate::borehole::Borehole) partially updated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoreholeError {
    /// Input sequences that must be parallel have different lengths.
    #[error("shape mismatch: expected {expected} values, got {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// A value could not be interpreted as a float.
    #[error("cannot convert {value:?} at position {index} to a float")]
    TypeConversion { index: usize, value: String },

    /// Nothing was left after masking out missing values.
    #[error("dataset '{key}' has no samples left after masking missing values")]
    InsufficientData { key: String },

    /// An infinite value where a finite domain position or signal is needed.
    #[error("dataset '{key}' holds a non-finite value at position {index}")]
    NonFinite { key: String, index: usize },

    /// Invalid sample count or domain bounds for a resample pass.
    #[error("invalid sampler configuration: {0}")]
    DomainConfig(String),

    /// A column has zero variance and cannot be standardised.
    #[error("column '{key}' has zero variance and cannot be normalised")]
    UndefinedVariance { key: String },

    /// No dataset is registered under this key.
    #[error("no dataset registered under key '{0}'")]
    KeyNotFound(String),

    /// An operation was requested before a required prior step.
    #[error("invalid state: {0}")]
    State(String),

    /// Too few samples to fit the requested polynomial trend.
    #[error("cannot fit a degree {degree} trend to {nsamples} samples")]
    DegenerateTrend { degree: usize, nsamples: usize },
}

pub type Result<T> = std::result::Result<T, BoreholeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_payload() {
        let err = BoreholeError::ShapeMismatch { expected: 4, found: 3 };
        assert_eq!(err.to_string(), "shape mismatch: expected 4 values, got 3");

        let err = BoreholeError::KeyNotFound("gamma".into());
        assert!(err.to_string().contains("'gamma'"));

        let err = BoreholeError::TypeConversion { index: 2, value: "abc".into() };
        assert!(err.to_string().contains("\"abc\""));
        assert!(err.to_string().contains("position 2"));

        let err = BoreholeError::NonFinite { key: "gamma".into(), index: 7 };
        assert_eq!(err.to_string(), "dataset 'gamma' holds a non-finite value at position 7");
    }

    #[test]
    fn converts_into_anyhow() {
        fn fails() -> anyhow::Result<()> {
            Err::<(), _>(BoreholeError::UndefinedVariance { key: "density".into() })?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.to_string().contains("density"));
        assert!(err.downcast_ref::<BoreholeError>().is_some());
    }
}
