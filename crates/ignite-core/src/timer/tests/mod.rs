#[cfg(test)]
mod tokio_delay_tests;
