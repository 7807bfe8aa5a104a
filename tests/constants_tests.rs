// tests/constants_tests.rs ~=#######D]======A===r===c====M===o===o===n=====<Lord[TESTS]Xyn>=====S===t===u===d===i===o===s======[R|$>

#[cfg(test)]
mod tests {
    use ntmx::constants::*;
    use ntmx::{NTMConfig, ProblemConfig, VqaConfig};

    #[test]
    fn test_signature_has_module_placeholder() {
        assert!(ARCMOON_SIGNATURE.contains("<Lord[{}]Xyn>"));
    }

    #[test]
    fn test_shift_kernel_is_odd() {
        assert_eq!(NTM_NUM_SHIFT % 2, 1);
    }

    #[test]
    fn test_problem_minimums() {
        assert_eq!(SERIAL_RECALL_MIN_CONTROL_BITS, 1);
        assert_eq!(SERIAL_RECALL_MIN_DATA_BITS, 2);
        assert_eq!(DUAL_RECALL_MIN_CONTROL_BITS, 4);
        assert_eq!(DUAL_RECALL_MIN_DATA_BITS, 1);
    }

    #[test]
    fn test_default_problem_satisfies_dual_recall() {
        assert!(PROBLEM_CONTROL_BITS >= DUAL_RECALL_MIN_CONTROL_BITS);
        assert!(PROBLEM_DATA_BITS >= DUAL_RECALL_MIN_DATA_BITS);
        assert!(PROBLEM_MIN_SEQUENCE_LENGTH <= PROBLEM_MAX_SEQUENCE_LENGTH);
        assert!((0.0..=1.0).contains(&PROBLEM_BIAS));
    }

    #[test]
    fn test_defaults_flow_into_configs() {
        let ntm = NTMConfig::default();
        assert_eq!(ntm.memory_addresses, NTM_MEMORY_ADDRESSES);
        assert_eq!(ntm.memory_content_size, NTM_MEMORY_CONTENT_SIZE);
        assert_eq!(ntm.is_cam, NTM_IS_CAM);

        let problem = ProblemConfig::default();
        assert_eq!(problem.input_size(), PROBLEM_CONTROL_BITS + PROBLEM_DATA_BITS);

        let vqa = VqaConfig::default();
        assert_eq!(vqa.num_classes, VQA_NUM_CLASSES);
        assert_eq!(vqa.image_encoding_channels, VQA_IMAGE_ENCODING_CHANNELS);
    }

    #[test]
    fn test_crate_version_matches_manifest() {
        assert_eq!(CRATE_VERSION, env!("CARGO_PKG_VERSION"));
    }
}
