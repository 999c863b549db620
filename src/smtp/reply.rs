//! SMTP reply parsing.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::config::MAX_SMTP_REPLY_BYTES;
use crate::error_handling::ProbeError;

/// One complete, possibly multi-line, SMTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    /// All lines of the reply joined with spaces.
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Splits one reply line into code, whether it is the last line, and text.
///
/// `250-SIZE` continues a reply, `250 OK` (or a bare `250`) ends it.
pub(crate) fn parse_line(line: &str) -> Result<(u16, bool, &str), ProbeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let malformed = || ProbeError::MalformedReply(line.to_string());

    let digits = line.get(..3).ok_or_else(malformed)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let code: u16 = digits.parse().map_err(|_| malformed())?;

    match line.as_bytes().get(3) {
        None => Ok((code, true, "")),
        Some(b' ') => Ok((code, true, &line[4..])),
        Some(b'-') => Ok((code, false, &line[4..])),
        Some(_) => Err(malformed()),
    }
}

/// Reads one complete reply.
pub(crate) async fn read_reply<R>(reader: &mut R) -> Result<Reply, ProbeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    let mut code = None;
    let mut total = 0usize;

    loop {
        let mut line = String::new();
        let budget = (MAX_SMTP_REPLY_BYTES - total) as u64 + 1;
        let read = (&mut *reader).take(budget).read_line(&mut line).await?;
        if read == 0 {
            return Err(ProbeError::ConnectionClosed);
        }
        total += read;
        if total > MAX_SMTP_REPLY_BYTES {
            return Err(ProbeError::ReplyTooLong {
                limit: MAX_SMTP_REPLY_BYTES,
            });
        }

        let (line_code, last, text) = parse_line(&line)?;
        if code.is_some_and(|c| c != line_code) {
            return Err(ProbeError::MalformedReply(line.trim_end().to_string()));
        }
        code = Some(line_code);
        lines.push(text.to_string());

        if last {
            return Ok(Reply {
                code: line_code,
                lines,
            });
        }
    }
}
