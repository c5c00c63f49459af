// Services built on top of the route registry

pub mod redirect_service;
