//! Configuration error types

/// An error raised while building the item registry.
///
/// These only occur at construction time; once a [`crate::gateway::Gateway`]
/// exists its configuration is immutable and the running core never
/// raises them again.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    /// An item was declared with an empty topic base.
    EmptyTopicBase,
    /// An item's topic base does not fit the topic buffer.
    TopicBaseTooLong,
    /// Two items share the same topic base.
    DuplicateTopicBase,
    /// More items were supplied than the table's capacity.
    TooManyItems,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::EmptyTopicBase => defmt::write!(f, "EmptyTopicBase"),
            ConfigError::TopicBaseTooLong => defmt::write!(f, "TopicBaseTooLong"),
            ConfigError::DuplicateTopicBase => defmt::write!(f, "DuplicateTopicBase"),
            ConfigError::TooManyItems => defmt::write!(f, "TooManyItems"),
        }
    }
}
