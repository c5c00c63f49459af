// Route declarations loaded from YAML

pub mod routes;
pub mod yml_settings;

pub use routes::{RouteTable, DEFAULT_CONFIG_FILE};
pub use yml_settings::{RouteSettings, TypeSettings, YmlSettings};
