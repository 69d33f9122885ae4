#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum StateSyncStatus {
    #[default]
    BeforeInit,
    Dirty,
    Clean,
}
