//! Channel name helpers.

/// Extension methods for strings naming a channel.
pub trait ChannelExt {
    /// True when the name already starts with `#`.
    fn is_channel_name(&self) -> bool;

    /// The name with a `#` prepended when it has none.
    ///
    /// Every outbound channel command and all local bookkeeping go through
    /// this so that `test` and `#test` refer to the same channel.
    fn to_channel_name(&self) -> String;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        self.starts_with('#')
    }

    fn to_channel_name(&self) -> String {
        let name = self.trim();
        if name.is_channel_name() {
            name.to_string()
        } else {
            format!("#{}", name)
        }
    }
}
