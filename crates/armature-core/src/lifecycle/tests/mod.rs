#[cfg(test)]
mod registrar_tests;
