#[derive(Debug)]
pub enum ApplicationError {
    BadRequest(String),
    Unauthorized,
    UnsupportedInput(String),
    PayloadTooLarge(u64),
    ConversionFailed(String),
    InternalError(String),
}
