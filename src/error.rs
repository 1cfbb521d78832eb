use crate::auth::backend::MemberBackend;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::num::{ParseFloatError, ParseIntError};

pub type PortalResult<T> = Result<T, PortalError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PortalError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to find record {:?} in collection `{}`", id, collection))]
    MissingRecord { collection: String, id: String },
    #[snafu(display("Record {:?} already exists in collection `{}`", id, collection))]
    DuplicateRecord { collection: String, id: String },
    #[snafu(display("Record for collection `{}` had no `_id`", collection))]
    MissingRecordId { collection: String },
    #[snafu(display("Record for collection `{}` was not a JSON object", collection))]
    RecordNotAnObject { collection: String },
    #[snafu(display("Error converting record for collection `{}`", collection))]
    SerdeJson {
        source: serde_json::Error,
        collection: &'static str,
    },
    #[snafu(display("Error serialising with rmp_serde"))]
    RmpSerdeEncode { source: rmp_serde::encode::Error },
    #[snafu(display("Error deserialising with rmp_serde"))]
    RmpSerdeDecode { source: rmp_serde::decode::Error },
    #[snafu(display("Error decoding Base64"))]
    B64 { source: base64::DecodeError },
    #[snafu(display("Unable to parse date {:?}", original))]
    ParseDate {
        source: jiff::Error,
        original: String,
    },
    #[snafu(display("Unable to parse GPA {:?}", original))]
    ParseGpa {
        source: ParseFloatError,
        original: String,
    },
    #[snafu(display("Stored timestamp {} was out of range", millis))]
    InvalidTimestamp { source: jiff::Error, millis: i64 },
    #[snafu(display("Session expiry {} was out of range", seconds))]
    InvalidExpiry {
        source: time::error::ComponentRange,
        seconds: i64,
    },
    #[snafu(display("Error with sessions"))]
    TowerSession {
        source: axum_login::tower_sessions::session::Error,
    },
    #[snafu(display("The identity provider did not hand back a member"))]
    UnableToEstablishMember,
}

impl From<axum_login::Error<MemberBackend>> for PortalError {
    fn from(value: axum_login::Error<MemberBackend>) -> Self {
        match value {
            axum_login::Error::Session(source) => Self::TowerSession { source },
            axum_login::Error::Backend(backend) => backend,
        }
    }
}

impl PortalError {
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const CF: StatusCode = StatusCode::CONFLICT;

        match self {
            Self::OpenDatabase { .. } | Self::MakeQuery { .. } | Self::Migrate { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } => ISE,
            Self::MissingRecord { .. } => NF,
            Self::DuplicateRecord { .. } => CF,
            Self::MissingRecordId { .. } | Self::RecordNotAnObject { .. } => BI,
            Self::SerdeJson { .. } => ISE,
            Self::RmpSerdeEncode { .. } => ISE,
            Self::RmpSerdeDecode { .. } | Self::B64 { .. } => BI,
            Self::ParseDate { .. } | Self::ParseGpa { .. } => BI,
            Self::InvalidTimestamp { .. } | Self::InvalidExpiry { .. } => ISE,
            Self::TowerSession { .. } => ISE,
            Self::UnableToEstablishMember => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let basic_error = |desc| {
            html! {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    strong class="font-bold" {"Something went wrong. "}
                    span {(desc)}
                }
            }
        };

        error!(?self, "Error!");
        (self.status_code(), Html(basic_error(self.to_string()))).into_response()
    }
}
