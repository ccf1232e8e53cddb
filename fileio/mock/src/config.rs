#[derive(Clone, Debug)]
pub struct MockConfig {
    /// First descriptor handed out by `open` and `dup`.
    pub first_fd: i32,
    /// Logical clock start, in seconds since the epoch.
    pub clock_start_secs: i64,
    /// Seconds the logical clock advances on every mutation.
    pub clock_step_secs: i64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            first_fd: 3,
            clock_start_secs: 1_700_000_000,
            clock_step_secs: 1,
        }
    }
}
