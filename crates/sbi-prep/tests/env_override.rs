//! Environment overrides (separate binary: sets process-wide variables)

use sbi_prep::{PipelineConfig, SpectrumTransform};

#[test]
fn test_environment_overrides_file_values() {
    std::env::set_var("SBI_PREP__PCA__COMPONENTS", "4");
    std::env::set_var("SBI_PREP__COVARIANCE__CONDITION_THRESHOLD", "1e-9");

    let config = PipelineConfig::from_toml_str(
        r#"
        [pca]
        components = 8

        [spectrum]
        mode = "standardize"
        "#,
    )
    .unwrap();

    assert_eq!(config.pca.map(|p| p.components), Some(4));
    assert_eq!(config.covariance.condition_threshold, 1e-9);
    assert_eq!(config.spectrum, SpectrumTransform::Standardize);
}
