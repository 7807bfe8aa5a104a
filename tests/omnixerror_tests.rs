// tests/omnixerror_tests.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[TESTS]Xyn>=====S===t===u===d===i===o===s======[R|$>

#[cfg(test)]
mod tests {
    use ntmx::omnixtracker::{NTMError, OmniXError};

    #[test]
    fn test_validation_error() {
        let error = OmniXError::ValidationError("ntm config: num_shift must be odd (currently 2)".to_string());
        assert_eq!(format!("{}", error), "Validation error: ntm config: num_shift must be odd (currently 2)");
    }

    #[test]
    fn test_configuration_error() {
        let error = OmniXError::ConfigurationError("num_shift must be odd".to_string());
        assert_eq!(format!("{}", error), "Configuration error: num_shift must be odd");
    }

    #[test]
    fn test_shape_mismatch_message() {
        let error = NTMError::shape(&[2, 18, 12], &[2, 18, 11]);
        assert_eq!(format!("{}", error), "Shape mismatch: expected [2, 18, 12], actual [2, 18, 11]");
    }

    #[test]
    fn test_insufficient_bits_becomes_configuration_error() {
        let error: OmniXError = NTMError::InsufficientBits {
            problem: "serial_recall",
            kind: "data",
            required: 2,
            actual: 1,
        }
        .into();
        assert_eq!(
            format!("{}", error),
            "Configuration error: Problem serial_recall requires at least 2 data bits (currently 1)"
        );
    }

    #[test]
    fn test_ntm_variants_carry_over() {
        assert!(matches!(OmniXError::from(NTMError::ComputationError), OmniXError::NTMComputationError));
        assert!(matches!(
            OmniXError::from(NTMError::MemoryError("batch 3 out of range".to_string())),
            OmniXError::NTMMemoryError(msg) if msg == "batch 3 out of range"
        ));
    }

    #[test]
    fn test_log_does_not_panic() {
        OmniXError::ValidationError("batch_size must be positive".to_string()).log();
        OmniXError::NTMComputationError.log();
    }
}
