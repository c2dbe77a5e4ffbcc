pub mod logging;

#[cfg(all(test, unix))]
pub(crate) mod test_bin;
