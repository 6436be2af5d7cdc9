//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the router and handlers: response
//! builders and form-encoded body parsing.

pub mod form;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_500_response, build_503_response, build_health_response, build_html_response,
    build_html_with_status, build_options_response, build_redirect_response,
};
