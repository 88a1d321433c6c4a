    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_unknown_mode() {
        let mut config = Config::default();
        config.digest.mode = "visible".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "digest.mode"));
    }

    #[test]
    fn test_validate_position_without_onscreen() {
        let mut config = Config::default();
        config.digest.include_position = true;

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.path == "digest.include_position"));

        config.digest.mode = "onscreen".to_string();
        assert!(ConfigValidator::validate(&config).is_valid());
    }

    #[test]
    fn test_validate_zero_text_limit() {
        let mut config = Config::default();
        config.digest.text_limit = 0;

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.path == "digest.text_limit"));
    }

    #[test]
    fn test_validate_zero_viewport_warning() {
        let mut config = Config::default();
        config.viewport.height = 0;

        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.path == "viewport"));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();
        config.logging.level = "chatty".to_string();
        let result = ConfigValidator::validate(&config);
        assert!(result.warnings.iter().any(|w| w.path == "logging.level"));

        config.logging.level = "domsift_core=debug".to_string();
        assert!(ConfigValidator::validate(&config).warnings.is_empty());

        config.logging.level = "INFO".to_string();
        assert!(ConfigValidator::validate(&config).warnings.is_empty());
    }

    #[test]
    fn test_into_result() {
        let mut config = Config::default();
        config.digest.mode = "nope".to_string();
        let err = ConfigValidator::validate(&config).into_result().unwrap_err();
        assert!(err.to_string().contains("digest.mode"));

        let mut config = Config::default();
        config.viewport.width = 0;
        let warnings = ConfigValidator::validate(&config).into_result().unwrap();
        assert_eq!(warnings.len(), 1);
    }
