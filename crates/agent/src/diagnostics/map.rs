//! Pure conversion functions for the Diagnostics RPCs.
//!
//! Protobuf ↔ internal type mapping, request validation, and error to
//! status mapping.

use tonic::Status;
use tracing::error;

use crate::info::{InfoItem, InfoKind};
use crate::logs::{SearchError, SearchRequest};
use crate::parser::{Level, LogRecord};
use crate::proto::{
    LogLevel as ProtoLogLevel, LogMessage, SearchLogRequest, SearchLogResponse, ServerInfoItem,
    ServerInfoPair, ServerInfoResponse, ServerInfoType,
};
use crate::runtime::blocking::Panicked;

/// Convert a protobuf level value to the internal level.
pub fn convert_level(value: i32) -> Result<Level, Status> {
    let level = match ProtoLogLevel::try_from(value) {
        Ok(ProtoLogLevel::Unknown) => Level::Unknown,
        Ok(ProtoLogLevel::Debug) => Level::Debug,
        Ok(ProtoLogLevel::Info) => Level::Info,
        Ok(ProtoLogLevel::Warn) => Level::Warn,
        Ok(ProtoLogLevel::Trace) => Level::Trace,
        Ok(ProtoLogLevel::Critical) => Level::Critical,
        Ok(ProtoLogLevel::Error) => Level::Error,
        Err(_) => return Err(Status::invalid_argument(format!("unknown log level: {}", value))),
    };
    Ok(level)
}

/// Convert internal level to protobuf enum value.
pub fn convert_log_level(level: Level) -> i32 {
    let proto = match level {
        Level::Unknown => ProtoLogLevel::Unknown,
        Level::Debug => ProtoLogLevel::Debug,
        Level::Info => ProtoLogLevel::Info,
        Level::Warn => ProtoLogLevel::Warn,
        Level::Trace => ProtoLogLevel::Trace,
        Level::Critical => ProtoLogLevel::Critical,
        Level::Error => ProtoLogLevel::Error,
    };
    proto as i32
}

pub fn convert_search_request(req: SearchLogRequest) -> Result<SearchRequest, Status> {
    let levels = req
        .levels
        .iter()
        .map(|&l| convert_level(l))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchRequest {
        start_time: req.start_time,
        end_time: req.end_time,
        levels,
        patterns: req.patterns,
    })
}

pub fn convert_record(record: LogRecord) -> LogMessage {
    LogMessage {
        time: record.time,
        level: convert_log_level(record.level),
        message: record.message,
    }
}

pub fn convert_batch(records: Vec<LogRecord>) -> SearchLogResponse {
    SearchLogResponse {
        messages: records.into_iter().map(convert_record).collect(),
    }
}

/// Map a search failure to the status returned to the caller.
pub fn search_error_status(e: &SearchError) -> Status {
    match e {
        SearchError::EmptyPath => Status::failed_precondition(e.to_string()),
        SearchError::BadRegex(_) => Status::invalid_argument(e.to_string()),
        SearchError::Cancelled => Status::cancelled(e.to_string()),
        SearchError::Panic(_) => {
            error!("{}", e);
            Status::internal(e.to_string())
        }
        _ => Status::internal(e.to_string()),
    }
}

pub fn panic_status(panicked: Panicked) -> Status {
    search_error_status(&SearchError::Panic(panicked.to_string()))
}

pub fn convert_info_type(tp: i32) -> Result<InfoKind, Status> {
    match ServerInfoType::try_from(tp) {
        Ok(ServerInfoType::All) => Ok(InfoKind::All),
        Ok(ServerInfoType::HardwareInfo) => Ok(InfoKind::Hardware),
        Ok(ServerInfoType::SystemInfo) => Ok(InfoKind::System),
        Ok(ServerInfoType::LoadInfo) => Ok(InfoKind::Load),
        Err(_) => Err(Status::invalid_argument(format!("unknown server info type: {}", tp))),
    }
}

pub fn convert_info_items(items: Vec<InfoItem>) -> ServerInfoResponse {
    ServerInfoResponse {
        items: items
            .into_iter()
            .map(|item| ServerInfoItem {
                tp: item.tp,
                name: item.name,
                pairs: item
                    .pairs
                    .into_iter()
                    .map(|p| ServerInfoPair { key: p.key, value: p.value })
                    .collect(),
            })
            .collect(),
    }
}
