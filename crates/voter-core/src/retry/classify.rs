//! Maps transport failures of a page fetch onto [`ErrorKind`].

use crate::retry::policy::ErrorKind;
use crate::transport::TransportError;

pub fn classify(e: &TransportError) -> ErrorKind {
    match e {
        TransportError::Http(code) => match code {
            // Rate limited or under maintenance: the page usually comes back.
            429 | 503 => ErrorKind::Busy,
            500..=599 => ErrorKind::ServerError(*code as u16),
            _ => ErrorKind::Fatal,
        },
        TransportError::Curl(ce) if ce.is_operation_timedout() => ErrorKind::Timeout,
        TransportError::Curl(ce)
            if ce.is_couldnt_connect()
                || ce.is_couldnt_resolve_host()
                || ce.is_couldnt_resolve_proxy()
                || ce.is_recv_error()
                || ce.is_send_error()
                || ce.is_read_error()
                || ce.is_got_nothing() =>
        {
            ErrorKind::Unreachable
        }
        TransportError::Curl(_) => ErrorKind::Fatal,
    }
}
