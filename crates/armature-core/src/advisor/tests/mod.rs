#[cfg(test)]
mod pointcut_tests;
#[cfg(test)]
mod retrieval_tests;
