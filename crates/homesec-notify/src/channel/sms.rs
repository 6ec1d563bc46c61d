//! SMS gateway channel.

use std::fmt;
use std::path::Path;

use url::Url;

use super::{ChannelKind, read_credential_pair};
use crate::error::{ChannelError, DeliveryError};
use crate::transport::{ChannelTransport, OutboundRequest};

const SMS_ENDPOINT: &str = "https://smsapi.free-mobile.fr/sendmsg";
const ACCOUNT_DIGITS: usize = 8;
const SECRET_LEN: usize = 14;

/// Channel delivering plain text through an SMS gateway.
///
/// The gateway has no notion of structured values, so a multi-value send is
/// joined into one space-separated message.
#[derive(Clone, PartialEq, Eq)]
pub struct SmsChannel {
    account: String,
    secret: String,
}

impl SmsChannel {
    /// Builds a channel for an eight-digit account id and 14-character secret.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::InvalidCredential`] when either value has the
    /// wrong shape.
    pub fn new(
        account: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ChannelError> {
        let account = account.into();
        let secret = secret.into();
        if account.len() != ACCOUNT_DIGITS || !account.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ChannelError::invalid(ChannelKind::Sms, "account id must be eight digits"));
        }
        if secret.chars().count() != SECRET_LEN {
            return Err(ChannelError::invalid(ChannelKind::Sms, "secret must be 14 characters"));
        }
        Ok(Self { account, secret })
    }

    /// Loads the channel from a two-line file: account id, then secret.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the file is unreadable, does not have
    /// exactly two lines, or holds invalid credentials.
    pub fn from_file(path: &Path) -> Result<Self, ChannelError> {
        let (account, secret) = read_credential_pair(ChannelKind::Sms, path)?;
        Self::new(account, secret)
    }

    /// Account id this channel sends from.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    pub(super) fn send_message(
        &self,
        transport: &dyn ChannelTransport,
        message: &str,
    ) -> Result<(), DeliveryError> {
        if message.is_empty() {
            return Err(DeliveryError::EmptyPayload {
                kind: ChannelKind::Sms,
            });
        }
        let request = self.request(message)?;
        let status = transport.execute(&request)?;
        interpret_status(status)
    }

    pub(super) fn send_values<S: AsRef<str>>(
        &self,
        transport: &dyn ChannelTransport,
        values: &[S],
    ) -> Result<(), DeliveryError> {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.send_message(transport, &joined)
    }

    fn request(&self, message: &str) -> Result<OutboundRequest, DeliveryError> {
        let url = Url::parse_with_params(
            SMS_ENDPOINT,
            &[
                ("user", self.account.as_str()),
                ("pass", self.secret.as_str()),
                ("msg", message),
            ],
        )
        .map_err(|source| DeliveryError::Url {
            kind: ChannelKind::Sms,
            source,
        })?;
        Ok(OutboundRequest::Get { url })
    }
}

const fn interpret_status(status: u16) -> Result<(), DeliveryError> {
    let reason = match status {
        200 => return Ok(()),
        400 => "missing parameter",
        402 => "too many messages sent",
        403 => "service not activated on the account",
        500 => "provider internal error",
        _ => "unexpected status",
    };
    Err(DeliveryError::Rejected {
        kind: ChannelKind::Sms,
        status,
        reason,
    })
}

impl fmt::Debug for SmsChannel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SmsChannel")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}
