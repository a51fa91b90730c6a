pub mod dev_socket;
pub mod forecast;
pub mod health;
pub mod https_redirect;
pub mod openapi;
pub mod spa;
