/*
    codes.rs - Protocol buffer message codes

    Every frame exchanged with the server carries a one-byte code that
    identifies the payload schema. Only the codes this client sends or
    decodes are listed here.
*/

use std::fmt;

/// Known message codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum MessageCode {
    ErrorResp = 0,
    PingReq = 1,
    PingResp = 2,
    GetServerInfoReq = 7,
    GetServerInfoResp = 8,
    GetReq = 9,
    GetResp = 10,
    PutReq = 11,
    PutResp = 12,
    DelReq = 13,
    DelResp = 14,
    DtFetchReq = 80,
    DtFetchResp = 81,
    DtUpdateReq = 82,
    DtUpdateResp = 83,
}

impl MessageCode {
    /// Wire value of this code
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Protocol name of the message, as used in server logs
    pub fn name(&self) -> &'static str {
        match self {
            MessageCode::ErrorResp => "RpbErrorResp",
            MessageCode::PingReq => "RpbPingReq",
            MessageCode::PingResp => "RpbPingResp",
            MessageCode::GetServerInfoReq => "RpbGetServerInfoReq",
            MessageCode::GetServerInfoResp => "RpbGetServerInfoResp",
            MessageCode::GetReq => "RpbGetReq",
            MessageCode::GetResp => "RpbGetResp",
            MessageCode::PutReq => "RpbPutReq",
            MessageCode::PutResp => "RpbPutResp",
            MessageCode::DelReq => "RpbDelReq",
            MessageCode::DelResp => "RpbDelResp",
            MessageCode::DtFetchReq => "DtFetchReq",
            MessageCode::DtFetchResp => "DtFetchResp",
            MessageCode::DtUpdateReq => "DtUpdateReq",
            MessageCode::DtUpdateResp => "DtUpdateResp",
        }
    }

    /// Whether this code is sent by the server
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            MessageCode::ErrorResp
                | MessageCode::PingResp
                | MessageCode::GetServerInfoResp
                | MessageCode::GetResp
                | MessageCode::PutResp
                | MessageCode::DelResp
                | MessageCode::DtFetchResp
                | MessageCode::DtUpdateResp
        )
    }
}

impl TryFrom<u8> for MessageCode {
    /// The unrecognised byte is handed back
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let code = match value {
            0 => MessageCode::ErrorResp,
            1 => MessageCode::PingReq,
            2 => MessageCode::PingResp,
            7 => MessageCode::GetServerInfoReq,
            8 => MessageCode::GetServerInfoResp,
            9 => MessageCode::GetReq,
            10 => MessageCode::GetResp,
            11 => MessageCode::PutReq,
            12 => MessageCode::PutResp,
            13 => MessageCode::DelReq,
            14 => MessageCode::DelResp,
            80 => MessageCode::DtFetchReq,
            81 => MessageCode::DtFetchResp,
            82 => MessageCode::DtUpdateReq,
            83 => MessageCode::DtUpdateResp,
            other => return Err(other),
        };
        Ok(code)
    }
}

impl From<MessageCode> for u8 {
    fn from(code: MessageCode) -> Self {
        code.as_u8()
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}
