//! Error and notice response messages.

use std::collections::HashMap;

use crate::error::{Error, ServerError, field_type};
use crate::error::Result;
use crate::protocol::codec::read_cstr;

/// Parse error/notice fields from payload into a [`ServerError`].
fn parse_fields(payload: &[u8]) -> Result<ServerError> {
    let mut fields = HashMap::new();
    let mut data = payload;

    while !data.is_empty() && data[0] != 0 {
        let field_type = data[0];
        data = &data[1..];

        let (value, rest) = read_cstr(data)?;
        data = rest;

        fields.insert(field_type, value.to_string());
    }

    Ok(ServerError::new(fields))
}

/// ErrorResponse message - fatal error from server.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// Parsed error fields
    pub fields: ServerError,
}

impl ErrorResponse {
    /// Parse an ErrorResponse message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            fields: parse_fields(payload)?,
        })
    }

    /// Convert to an Error.
    pub fn into_error(self) -> Error {
        Error::Server(self.fields)
    }

    /// Get the SQLSTATE code.
    pub fn code(&self) -> Option<&str> {
        self.fields.get(field_type::CODE)
    }

    /// Get the primary message.
    pub fn message(&self) -> Option<&str> {
        self.fields.get(field_type::MESSAGE)
    }

    /// Get the severity.
    pub fn severity(&self) -> Option<&str> {
        self.fields
            .get(field_type::SEVERITY_V)
            .or_else(|| self.fields.get(field_type::SEVERITY))
    }
}

/// NoticeResponse message - non-fatal warning/info from server.
#[derive(Debug, Clone)]
pub struct NoticeResponse {
    /// Parsed notice fields
    pub fields: ServerError,
}

impl NoticeResponse {
    /// Parse a NoticeResponse message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            fields: parse_fields(payload)?,
        })
    }

    /// Get the SQLSTATE code.
    pub fn code(&self) -> Option<&str> {
        self.fields.get(field_type::CODE)
    }

    /// Get the primary message.
    pub fn message(&self) -> Option<&str> {
        self.fields.get(field_type::MESSAGE)
    }

    /// Get the severity.
    pub fn severity(&self) -> Option<&str> {
        self.fields
            .get(field_type::SEVERITY_V)
            .or_else(|| self.fields.get(field_type::SEVERITY))
    }
}
