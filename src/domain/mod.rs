// Domain model: URI templates, parameter stores and the route registry

pub mod cache;
pub mod parameters;
pub mod registry;
pub mod template;

pub use cache::TemplateCache;
pub use parameters::{Parameters, UriParameters};
pub use registry::{Registry, RegistryBuilder, Resolution, Route, RouteInfo, SharedRegistry};
pub use template::{compile, Expandable, Matchable, Template, TemplateParser, Token};
