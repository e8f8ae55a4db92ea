//! Endpoint identity and channel naming.
//!
//! A channel is named after the session that owns it:
//!
//! ```text
//! {socket_dir}/
//! └── {broker}\{instrument}\{timeframe}\{instance_id}   ← one socket per session
//! ```
//!
//! The backslash is the component separator of the name itself, so no
//! component may contain one.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::IdentityError;

/// Separator between identity components in the channel name.
pub const NAME_SEPARATOR: char = '\\';

type Result<T> = std::result::Result<T, IdentityError>;

/// Validates that an identity component can be embedded in a channel name.
///
/// # Errors
///
/// Returns `IdentityError` if the component:
/// - is empty
/// - contains `/`, `\` or a null byte
/// - is a special directory (`.` or `..`)
pub fn validate_component(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(IdentityError::EmptyComponent { field });
    }
    if value == "."
        || value == ".."
        || value.contains('/')
        || value.contains(NAME_SEPARATOR)
        || value.contains('\0')
    {
        return Err(IdentityError::InvalidComponent {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// `(broker, instrument, timeframe, instance)` naming exactly one channel.
///
/// Immutable once constructed; case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointIdentity {
    broker: String,
    instrument: String,
    timeframe: String,
    instance_id: String,
}

impl EndpointIdentity {
    pub fn new(
        broker: impl Into<String>,
        instrument: impl Into<String>,
        timeframe: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Result<Self> {
        let identity = Self {
            broker: broker.into(),
            instrument: instrument.into(),
            timeframe: timeframe.into(),
            instance_id: instance_id.into(),
        };
        validate_component("broker", &identity.broker)?;
        validate_component("instrument", &identity.instrument)?;
        validate_component("timeframe", &identity.timeframe)?;
        validate_component("instance_id", &identity.instance_id)?;
        Ok(identity)
    }

    /// Parses a channel name produced by [`EndpointIdentity::name`].
    pub fn parse(name: &str) -> Result<Self> {
        let mut parts = name.split(NAME_SEPARATOR);
        let mut next = |field: &'static str| -> Result<String> {
            parts
                .next()
                .map(str::to_string)
                .ok_or(IdentityError::EmptyComponent { field })
        };
        let broker = next("broker")?;
        let instrument = next("instrument")?;
        let timeframe = next("timeframe")?;
        // anything after the third separator belongs to the instance id and
        // is rejected by validation
        let instance_id = parts_rest(name, 3);
        Self::new(broker, instrument, timeframe, instance_id.unwrap_or_default())
    }

    pub fn broker(&self) -> &str {
        &self.broker
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Channel name: `{broker}\{instrument}\{timeframe}\{instance_id}`.
    pub fn name(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.broker,
            self.instrument,
            self.timeframe,
            self.instance_id,
            sep = NAME_SEPARATOR
        )
    }

    /// Socket path for this identity inside `dir`.
    pub fn socket_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.name())
    }
}

fn parts_rest(name: &str, skip: usize) -> Option<String> {
    name.splitn(skip + 1, NAME_SEPARATOR)
        .nth(skip)
        .map(str::to_string)
}

impl fmt::Display for EndpointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
