#[cfg(test)]
mod instance_tests;
#[cfg(test)]
mod scanner_tests;
