//! COPY TO STDOUT state machine.
//!
//! `COPY ... FROM STDIN` is driven directly by the connection (see
//! `tokio::Conn::copy_in`) rather than through a `StateMachine`: the data
//! to send arrives from the caller interactively, which doesn't fit the
//! "construct once, drive to `Finished`" shape the other state machines use.

use crate::error::{Error, Result};
use crate::handler::CopyOutHandler;
use crate::protocol::backend::{
    CommandComplete, CopyData, CopyDone, CopyOutResponse, ErrorResponse, RawMessage,
    ReadyForQuery, msg_type,
};
use crate::protocol::frontend::write_query;
use crate::protocol::types::TransactionStatus;

use super::StateMachine;
use super::action::{Action, AsyncMessage};
use crate::buffer_set::BufferSet;

/// COPY OUT state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Initial,
    WaitingCopyResponse,
    Copying,
    WaitingCommandComplete,
    WaitingReady,
    Finished,
}

/// Drives a `COPY ... TO STDOUT` statement issued over the simple query protocol.
pub struct CopyOutStateMachine<'a, H> {
    state: State,
    handler: &'a mut H,
    transaction_status: TransactionStatus,
    status: Option<String>,
}

impl<'a, H: CopyOutHandler> CopyOutStateMachine<'a, H> {
    /// Create a new COPY OUT state machine.
    ///
    /// Writes the Query message to `buffer_set.write_buffer`.
    pub fn new(handler: &'a mut H, buffer_set: &mut BufferSet, sql: &str) -> Self {
        buffer_set.write_buffer.clear();
        write_query(&mut buffer_set.write_buffer, sql);

        Self {
            state: State::Initial,
            handler,
            transaction_status: TransactionStatus::Idle,
            status: None,
        }
    }

    /// The command tag from `CommandComplete` (e.g. `"COPY 5"`), once the
    /// operation has finished.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn handle_async_message(&self, msg: &RawMessage<'_>) -> Result<Action> {
        match msg.type_byte {
            msg_type::NOTICE_RESPONSE => {
                let notice = crate::protocol::backend::NoticeResponse::parse(msg.payload)?;
                Ok(Action::HandleAsyncMessageAndReadMessage(
                    AsyncMessage::Notice(notice.fields),
                ))
            }
            msg_type::PARAMETER_STATUS => {
                let param = crate::protocol::backend::auth::ParameterStatus::parse(msg.payload)?;
                Ok(Action::HandleAsyncMessageAndReadMessage(
                    AsyncMessage::ParameterChanged {
                        name: param.name.to_string(),
                        value: param.value.to_string(),
                    },
                ))
            }
            msg_type::NOTIFICATION_RESPONSE => {
                let notification =
                    crate::protocol::backend::auth::NotificationResponse::parse(msg.payload)?;
                Ok(Action::HandleAsyncMessageAndReadMessage(
                    AsyncMessage::Notification {
                        pid: notification.pid,
                        channel: notification.channel.to_string(),
                        payload: notification.payload.to_string(),
                    },
                ))
            }
            _ => Err(Error::Protocol(format!(
                "Unknown async message type: '{}'",
                msg.type_byte as char
            ))),
        }
    }
}

impl<H: CopyOutHandler> StateMachine for CopyOutStateMachine<'_, H> {
    fn step(&mut self, buffer_set: &mut BufferSet) -> Result<Action> {
        if self.state == State::Initial {
            self.state = State::WaitingCopyResponse;
            return Ok(Action::WriteAndReadMessage);
        }

        let type_byte = buffer_set.type_byte;

        if RawMessage::is_async_type(type_byte) {
            let msg = RawMessage::new(type_byte, &buffer_set.read_buffer);
            return self.handle_async_message(&msg);
        }

        if type_byte == msg_type::ERROR_RESPONSE {
            let error = ErrorResponse::parse(&buffer_set.read_buffer)?;
            self.state = State::WaitingReady;
            return Err(error.into_error());
        }

        match self.state {
            State::WaitingCopyResponse => {
                if type_byte != msg_type::COPY_OUT_RESPONSE {
                    return Err(Error::Protocol(format!(
                        "Expected CopyOutResponse, got '{}'",
                        type_byte as char
                    )));
                }
                CopyOutResponse::parse(&buffer_set.read_buffer)?;
                self.state = State::Copying;
                Ok(Action::ReadMessage)
            }
            State::Copying => match type_byte {
                msg_type::COPY_DATA => {
                    let data = CopyData::parse(&buffer_set.read_buffer)?;
                    self.handler.chunk(data.data)?;
                    Ok(Action::ReadMessage)
                }
                msg_type::COPY_DONE => {
                    CopyDone::parse(&buffer_set.read_buffer)?;
                    self.state = State::WaitingCommandComplete;
                    Ok(Action::ReadMessage)
                }
                _ => Err(Error::Protocol(format!(
                    "Unexpected message during COPY OUT: '{}'",
                    type_byte as char
                ))),
            },
            State::WaitingCommandComplete => {
                if type_byte != msg_type::COMMAND_COMPLETE {
                    return Err(Error::Protocol(format!(
                        "Expected CommandComplete, got '{}'",
                        type_byte as char
                    )));
                }
                let complete = CommandComplete::parse(&buffer_set.read_buffer)?;
                self.status = Some(complete.tag.to_string());
                self.state = State::WaitingReady;
                Ok(Action::ReadMessage)
            }
            State::WaitingReady => {
                if type_byte != msg_type::READY_FOR_QUERY {
                    return Err(Error::Protocol(format!(
                        "Expected ReadyForQuery, got '{}'",
                        type_byte as char
                    )));
                }
                let ready = ReadyForQuery::parse(&buffer_set.read_buffer)?;
                self.transaction_status = ready.transaction_status().unwrap_or_default();
                self.state = State::Finished;
                Ok(Action::Finished)
            }
            _ => Err(Error::Protocol(format!(
                "Unexpected state {:?}",
                self.state
            ))),
        }
    }

    fn transaction_status(&self) -> TransactionStatus {
        self.transaction_status
    }
}
