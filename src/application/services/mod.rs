pub mod converter_service;

pub use converter_service::ConverterService;
