//! Configuration template for `shelf init`.

/// Example configuration with a small instance and authority catalog (valid TOML).
const TEMPLATE: &str = include_str!("../templates/config.toml");

/// Returns the example configuration written by `shelf init`.
pub fn config_template() -> &'static str {
    TEMPLATE
}
