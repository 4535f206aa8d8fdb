#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    InternalServerError,
    // Compile-time failures
    OperationParsingError,
    OperationValidationError,
    // Pre-execution failures
    VariableError,
    // Field execution
    FieldError,
    NonNullViolation,
    LeafSerializationError,
    TypeResolutionError,
    ExpectedIterable,
}
